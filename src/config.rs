use once_cell::sync::Lazy;
use serde::Deserialize;

/// The static config instance.
pub static INSTANCE: Lazy<Config> = Lazy::new(|| {
    #[cfg(not(test))]
    {
        use std::{fs::File, io::Read};

        return toml::from_str(&{
            let mut string = String::new();
            File::open("./data/config.toml")
                .expect("missing ./data/config.toml")
                .read_to_string(&mut string)
                .unwrap();
            string
        })
        .unwrap();
    }

    #[cfg(test)]
    Config::default()
});

/// Describing the server configuration.
#[derive(Deserialize, Default)]
pub struct Config {
    pub service: Service,
}

/// Connection details of the hosted backend service.
#[derive(Deserialize, Clone)]
pub struct Service {
    pub url: String,
    pub anon_key: String,
    /// Privileged key for the user-listing endpoint. Without it the
    /// membership fallback path cannot enumerate auth users.
    pub service_role_key: Option<String>,
    pub storage_bucket: String,
    /// Where password recovery mails send the user back to.
    pub password_reset_redirect: String,
}

impl Default for Service {
    fn default() -> Self {
        Self {
            url: "http://localhost:54321".to_string(),
            anon_key: String::default(),
            service_role_key: None,
            storage_bucket: "blog-images".to_string(),
            password_reset_redirect: "http://localhost:3000/update-password".to_string(),
        }
    }
}
