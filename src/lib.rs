use std::sync::Arc;

use axum::extract::FromRequestParts;
use axum::{async_trait, http::StatusCode, response::IntoResponse, routing::post};
use serde::Serialize;

pub mod config;

pub mod auth;
pub mod membership;
pub mod provider;

pub mod resource;

/// Unit tests, only built in dev env.
#[cfg(test)]
mod tests;

use auth::SessionStore;
use membership::InFlight;
use provider::{Provider, ProviderError};

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("invalid credential: {0}")]
    InvalidCredential(String),
    #[error("login failed: invalid email or password")]
    LoginFailed,
    #[error("admin verification failed, please contact the administrator")]
    AdminVerificationFailed,
    #[error("access denied: you do not have permission to access the admin panel")]
    AccessDenied,
    #[error("registration failed: {0}")]
    RegistrationFailed(String),
    #[error("password reset failed: {0}")]
    PasswordResetFailed(String),
    #[error("update password failed: {0}")]
    UpdatePasswordFailed(String),
    #[error("logout failed: {0}")]
    LogoutFailed(String),
    #[error("failed to update membership status: {0}")]
    MembershipUpdateFailed(String),
    #[error("a membership update for user {0} is already in flight")]
    MembershipUpdateInFlight(String),

    #[error("not logged in")]
    NotLoggedIn,
    #[error("non-ascii header value: {0}")]
    HeaderNonAscii(#[from] axum::http::header::ToStrError),

    #[error("backend service errored: {0}")]
    Provider(#[from] ProviderError),
}

impl Error {
    pub fn to_status_code(&self) -> StatusCode {
        match self {
            Error::InvalidCredential(_) | Error::LoginFailed | Error::NotLoggedIn => {
                StatusCode::UNAUTHORIZED
            }
            Error::MembershipUpdateInFlight(_) => StatusCode::CONFLICT,
            Error::HeaderNonAscii(_) => StatusCode::BAD_REQUEST,
            Error::Provider(_) => StatusCode::BAD_GATEWAY,
            _ => StatusCode::FORBIDDEN,
        }
    }

    /// Where the client should navigate after this failure, if anywhere.
    fn redirect_to(&self) -> Option<&'static str> {
        match self {
            Error::NotLoggedIn | Error::AdminVerificationFailed | Error::AccessDenied => {
                Some("/login")
            }
            _ => None,
        }
    }
}

impl IntoResponse for Error {
    #[inline]
    fn into_response(self) -> axum::response::Response {
        #[derive(Serialize)]
        struct ErrorInfo {
            error: String,
            #[serde(skip_serializing_if = "Option::is_none")]
            redirect_to: Option<&'static str>,
        }
        (
            self.to_status_code(),
            axum::Json(ErrorInfo {
                error: self.to_string(),
                redirect_to: self.redirect_to(),
            }),
        )
            .into_response()
    }
}

/// Shared application state injected into every handler.
#[derive(Clone)]
pub struct Global {
    pub provider: Arc<dyn Provider>,
    pub sessions: Arc<SessionStore>,
    pub membership_updates: Arc<InFlight>,
}

impl Global {
    pub fn new(provider: Arc<dyn Provider>) -> Self {
        Self {
            provider,
            sessions: Arc::new(SessionStore::new()),
            membership_updates: Arc::new(InFlight::new()),
        }
    }
}

/// An established gateway session, resolved from the `Token` header.
///
/// Extraction fails closed when the header is missing or unknown, and
/// refreshes the backend session transparently when it has expired.
pub struct Auth {
    pub token: String,
    pub session: auth::Session,
}

#[async_trait]
impl FromRequestParts<Global> for Auth {
    type Rejection = Error;

    async fn from_request_parts(
        parts: &mut axum::http::request::Parts,
        state: &Global,
    ) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get("Token")
            .ok_or(Error::NotLoggedIn)?
            .to_str()?
            .to_owned();

        let session = match state.sessions.get(&token) {
            Some(session) => session,
            None => return Err(Error::NotLoggedIn),
        };
        let session = auth::refresh_if_expired(state, &token, session).await?;

        Ok(Self { token, session })
    }
}

/// A session verified to belong to a recognized administrator.
///
/// Verification runs on every extraction, so revoking the admin flag
/// server-side takes effect on the holder's next request. Any denial
/// clears the gateway session and signs the backend session out.
pub struct Admin {
    pub token: String,
    pub session: auth::Session,
}

#[async_trait]
impl FromRequestParts<Global> for Admin {
    type Rejection = Error;

    async fn from_request_parts(
        parts: &mut axum::http::request::Parts,
        state: &Global,
    ) -> Result<Self, Self::Rejection> {
        let auth = Auth::from_request_parts(parts, state).await?;

        match auth::verify_admin(
            state.provider.as_ref(),
            &auth.session.access_token,
            &auth.session.user_id,
        )
        .await
        {
            Err(err) => {
                auth::force_sign_out(state, &auth.token).await;
                Err(err)
            }
            Ok(status) if !status.is_admin => {
                tracing::info!("{} is not an admin, denying access", auth.session.email);
                auth::force_sign_out(state, &auth.token).await;
                Err(Error::AccessDenied)
            }
            Ok(_) => Ok(Self {
                token: auth.token,
                session: auth.session,
            }),
        }
    }
}

/// Construct the service router.
pub fn router(state: Global) -> axum::Router {
    axum::Router::new()
        // access gate
        .route("/api/auth/login", post(auth::handle::login))
        .route("/api/auth/callback", post(auth::handle::oauth_callback))
        .route("/api/auth/check", post(auth::handle::check))
        .route("/api/auth/logout", post(auth::handle::logout))
        .route("/api/auth/register", post(auth::handle::register))
        .route(
            "/api/auth/forgot-password",
            post(auth::handle::forgot_password),
        )
        .route(
            "/api/auth/update-password",
            post(auth::handle::update_password),
        )
        .route("/api/auth/permissions", post(auth::handle::permissions))
        .route("/api/auth/identity", post(auth::handle::identity))
        // membership
        .route("/api/users/list", post(membership::handle::list_users))
        .route(
            "/api/users/membership",
            post(membership::handle::update_membership),
        )
        // resources
        .route("/api/resource/upload", post(resource::upload))
        .with_state(state)
}
