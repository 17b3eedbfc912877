pub mod raw;

use parking_lot::RwLock;

pub use tenderdesk_shared::auth::Role;
pub use tenderdesk_shared::membership::{MembershipType, UserRow};

/// Connection context of the admin gateway.
pub struct Context {
    pub(crate) req_client: reqwest::Client,
    pub(crate) url_prefix: String,
    session: RwLock<Option<SessionInfo>>,
}

/// The session this client currently holds.
#[derive(Clone, Debug)]
pub struct SessionInfo {
    pub token: String,
    pub user_id: String,
    pub email: String,
}

impl Context {
    pub fn new(url_prefix: impl Into<String>) -> Self {
        Self {
            req_client: reqwest::Client::new(),
            url_prefix: url_prefix.into(),
            session: RwLock::new(None),
        }
    }

    pub fn session(&self) -> Option<SessionInfo> {
        self.session.read().clone()
    }

    pub(crate) fn token(&self) -> anyhow::Result<String> {
        self.session
            .read()
            .as_ref()
            .map(|session| session.token.clone())
            .ok_or_else(|| anyhow::anyhow!("not logged in"))
    }

    /// Authenticate with email and password and remember the session.
    pub async fn login(&self, email: &str, password: &str) -> anyhow::Result<()> {
        let result = raw::call(
            raw::auth::Login {
                email: email.to_string(),
                password: password.to_string(),
                provider: None,
            },
            self,
        )
        .await?;

        if let (Some(token), Some(user_id)) = (result.token, result.user_id) {
            *self.session.write() = Some(SessionInfo {
                token,
                user_id,
                email: email.to_string(),
            });
        }
        Ok(())
    }

    /// Log out and forget the held session.
    pub async fn logout(&self) -> anyhow::Result<()> {
        let token = self.token()?;
        raw::call(raw::auth::Logout { token }, self).await?;
        *self.session.write() = None;
        Ok(())
    }
}
