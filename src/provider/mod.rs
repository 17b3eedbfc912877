//! Seam to the hosted backend service that owns identity, data and
//! storage for the portal.
//!
//! The gate and the membership updater only ever talk to the
//! [`Provider`] trait; [`Http`] is the wire implementation.

pub mod http;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use tenderdesk_shared::membership::MembershipType;

pub use http::Http;

#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    /// Transport-level failure reaching the service.
    #[error("transport: {0}")]
    Transport(#[from] reqwest::Error),
    /// The service answered with an error status.
    #[error("{message}")]
    Service { status: u16, message: String },
    /// The service answered 2xx with a body we can't make sense of.
    #[error("malformed service response: {0}")]
    Malformed(String),
}

/// A user as known to the identity backend.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct AuthUser {
    pub id: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// A credential bundle issued by the identity backend.
#[derive(Deserialize, Clone, Debug)]
pub struct AuthSession {
    pub access_token: String,
    pub refresh_token: String,
    /// Lifetime of the access token, in seconds.
    pub expires_in: i64,
    /// Absent on some grant responses; the defensive branches in the
    /// gate handle that case explicitly.
    #[serde(default)]
    pub user: Option<AuthUser>,
}

/// Admin status of one user, however it was probed.
#[derive(Deserialize, Clone, Debug, Default)]
pub struct AdminStatus {
    #[serde(default)]
    pub is_admin: bool,
    #[serde(default)]
    pub membership_type: Option<MembershipType>,
    #[serde(default)]
    pub membership_expiry: Option<DateTime<Utc>>,
}

/// One row of the admin records table.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct AdminUserRow {
    pub id: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub is_admin: bool,
    #[serde(default)]
    pub membership_type: Option<MembershipType>,
    #[serde(default)]
    pub membership_expiry: Option<DateTime<Utc>>,
}

/// One row of the joined user + admin status view.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct JoinedUserRow {
    pub id: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub is_admin: bool,
    #[serde(default)]
    pub membership_type: Option<MembershipType>,
    #[serde(default)]
    pub membership_expiry: Option<DateTime<Utc>>,
}

/// An object accepted by the storage backend.
#[derive(Deserialize, Clone, Debug)]
pub struct StoredObject {
    /// Key of the object within its bucket.
    pub path: String,
}

/// Operations this application needs from the hosted service.
#[async_trait]
pub trait Provider: Send + Sync {
    async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<AuthSession, ProviderError>;

    /// Resolve the authorize URL for a named external identity
    /// provider. The browser completes the flow from there.
    async fn sign_in_with_oauth(&self, provider: &str) -> Result<String, ProviderError>;

    async fn sign_up(&self, email: &str, password: &str) -> Result<(), ProviderError>;

    async fn sign_out(&self, access_token: &str) -> Result<(), ProviderError>;

    async fn get_user(&self, access_token: &str) -> Result<AuthUser, ProviderError>;

    async fn refresh_session(&self, refresh_token: &str) -> Result<AuthSession, ProviderError>;

    async fn reset_password_for_email(
        &self,
        email: &str,
        redirect_to: &str,
    ) -> Result<(), ProviderError>;

    async fn update_user_password(
        &self,
        access_token: &str,
        new_password: &str,
    ) -> Result<(), ProviderError>;

    /// Enumerate all identity-backend users. Privileged.
    async fn list_users(&self) -> Result<Vec<AuthUser>, ProviderError>;

    /// Zero-argument "is the current user an admin" procedure.
    async fn is_admin(&self, access_token: &str) -> Result<bool, ProviderError>;

    /// Parameterized "admin status by id" procedure.
    async fn admin_status(
        &self,
        access_token: &str,
        user_id: &str,
    ) -> Result<AdminStatus, ProviderError>;

    /// The joined user + admin status view.
    async fn users_with_admin_status(
        &self,
        access_token: &str,
    ) -> Result<Vec<JoinedUserRow>, ProviderError>;

    async fn update_user_membership(
        &self,
        access_token: &str,
        user_id: &str,
        membership_type: MembershipType,
    ) -> Result<(), ProviderError>;

    /// Single-row read of the admin records table. An absent row is
    /// `None`, not an error.
    async fn admin_user_by_id(
        &self,
        access_token: &str,
        user_id: &str,
    ) -> Result<Option<AdminUserRow>, ProviderError>;

    async fn upload_object(
        &self,
        access_token: &str,
        bucket: &str,
        key: &str,
        content_type: &str,
        bytes: Vec<u8>,
    ) -> Result<StoredObject, ProviderError>;

    /// Public URL of an object. No network involved.
    fn public_url(&self, bucket: &str, key: &str) -> String;
}
