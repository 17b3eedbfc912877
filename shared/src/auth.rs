use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize)]
pub struct LoginDescriptor {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    /// Named external identity provider (ex. `"google"`).
    /// When present, password sign-in is skipped.
    #[serde(default)]
    pub provider: Option<String>,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct LoginResult {
    /// Gateway session token. Absent for provider-based sign-in,
    /// where the session is established by the callback instead.
    pub token: Option<String>,
    pub user_id: Option<String>,
    pub redirect_to: String,
    /// Where the browser must navigate for provider-based sign-in.
    pub authorize_url: Option<String>,
}

/// Tokens handed back by the identity provider after its redirect.
#[derive(Serialize, Deserialize)]
pub struct OAuthCallbackDescriptor {
    pub access_token: String,
    pub refresh_token: String,
    /// Access token lifetime in seconds, when the provider reports one.
    #[serde(default)]
    pub expires_in: Option<i64>,
}

#[derive(Serialize, Deserialize)]
pub struct RegisterDescriptor {
    pub email: String,
    pub password: String,
}

#[derive(Serialize, Deserialize)]
pub struct ForgotPasswordDescriptor {
    pub email: String,
}

#[derive(Serialize, Deserialize)]
pub struct UpdatePasswordDescriptor {
    pub password: String,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct CheckResult {
    pub authenticated: bool,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct RedirectResult {
    pub redirect_to: Option<String>,
}

/// Access roles known to the admin panel.
#[derive(Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Debug)]
pub enum Role {
    #[serde(rename = "admin")]
    Admin,
    #[serde(rename = "guest")]
    Guest,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct IdentityResult {
    pub id: String,
    pub email: String,
    /// Display name, defaulted to the email address.
    pub name: String,
    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
}
