//! Handlers for the access gate endpoints.

use axum::extract::State;
use axum::http::HeaderMap;
use axum::Json;
use tracing::info;

use tenderdesk_shared::auth::{
    CheckResult, ForgotPasswordDescriptor, IdentityResult, LoginDescriptor, LoginResult,
    OAuthCallbackDescriptor, RedirectResult, RegisterDescriptor, Role, UpdatePasswordDescriptor,
};

use crate::provider::AuthSession;
use crate::{config, Admin, Auth, Error, Global};

use super::{verify_admin, Session};

/// Authenticate an operator, either by password or by handing back an
/// authorize URL for a named external identity provider.
pub async fn login(
    State(state): State<Global>,
    Json(descriptor): Json<LoginDescriptor>,
) -> Result<Json<LoginResult>, Error> {
    if let Some(name) = descriptor.provider.as_deref() {
        let url = state
            .provider
            .sign_in_with_oauth(name)
            .await
            .map_err(|err| Error::InvalidCredential(err.to_string()))?;

        // authorization happens on the session check after the callback lands
        return Ok(Json(LoginResult {
            token: None,
            user_id: None,
            redirect_to: "/".to_string(),
            authorize_url: Some(url),
        }));
    }

    let auth = state
        .provider
        .sign_in_with_password(&descriptor.email, &descriptor.password)
        .await
        .map_err(|err| Error::InvalidCredential(err.to_string()))?;

    let user = match auth.user.clone() {
        Some(user) => user,
        // the backend contract says this cannot happen; keep it an error
        None => return Err(Error::LoginFailed),
    };

    match verify_admin(state.provider.as_ref(), &auth.access_token, &user.id).await {
        Err(err) => {
            sign_out_backend(&state, &auth.access_token).await;
            Err(err)
        }
        Ok(status) if !status.is_admin => {
            info!("{} authenticated but is not an admin", user.email);
            sign_out_backend(&state, &auth.access_token).await;
            Err(Error::AccessDenied)
        }
        Ok(_) => {
            let token = state.sessions.insert(&user, &auth);
            info!("admin access granted to {} ({})", user.email, user.id);
            Ok(Json(LoginResult {
                token: Some(token),
                user_id: Some(user.id),
                redirect_to: "/".to_string(),
                authorize_url: None,
            }))
        }
    }
}

async fn sign_out_backend(state: &Global, access_token: &str) {
    if let Err(err) = state.provider.sign_out(access_token).await {
        tracing::warn!("backend sign-out failed: {err}");
    }
}

/// Establish a gateway session from a provider callback.
///
/// Admin verification is deferred to the next protected request, since
/// provider callbacks land asynchronously.
pub async fn oauth_callback(
    State(state): State<Global>,
    Json(descriptor): Json<OAuthCallbackDescriptor>,
) -> Result<Json<LoginResult>, Error> {
    let user = state
        .provider
        .get_user(&descriptor.access_token)
        .await
        .map_err(|err| Error::InvalidCredential(err.to_string()))?;

    let auth = AuthSession {
        access_token: descriptor.access_token,
        refresh_token: descriptor.refresh_token,
        expires_in: descriptor.expires_in.unwrap_or(3600),
        user: Some(user.clone()),
    };
    let token = state.sessions.insert(&user, &auth);
    info!("session established for {} via provider callback", user.email);

    Ok(Json(LoginResult {
        token: Some(token),
        user_id: Some(user.id),
        redirect_to: "/".to_string(),
        authorize_url: None,
    }))
}

/// Silent session check run when the UI enters a protected route.
pub async fn check(_admin: Admin) -> Json<CheckResult> {
    Json(CheckResult {
        authenticated: true,
    })
}

/// Log out of the backend session and forget the gateway one.
pub async fn logout(
    State(state): State<Global>,
    auth: Auth,
) -> Result<Json<RedirectResult>, Error> {
    state
        .provider
        .sign_out(&auth.session.access_token)
        .await
        .map_err(|err| Error::LogoutFailed(err.to_string()))?;
    state.sessions.remove(&auth.token);

    info!("{} ({}) logged out", auth.session.email, auth.session.user_id);
    Ok(Json(RedirectResult {
        redirect_to: Some("/login".to_string()),
    }))
}

/// Register a new identity-backend user.
pub async fn register(
    State(state): State<Global>,
    Json(descriptor): Json<RegisterDescriptor>,
) -> Result<Json<RedirectResult>, Error> {
    state
        .provider
        .sign_up(&descriptor.email, &descriptor.password)
        .await
        .map_err(|err| Error::RegistrationFailed(err.to_string()))?;

    info!("registered {}", descriptor.email);
    Ok(Json(RedirectResult {
        redirect_to: Some("/".to_string()),
    }))
}

/// Start a password recovery flow for the given address.
pub async fn forgot_password(
    State(state): State<Global>,
    Json(descriptor): Json<ForgotPasswordDescriptor>,
) -> Result<Json<RedirectResult>, Error> {
    state
        .provider
        .reset_password_for_email(
            &descriptor.email,
            &config::INSTANCE.service.password_reset_redirect,
        )
        .await
        .map_err(|err| Error::PasswordResetFailed(err.to_string()))?;

    Ok(Json(RedirectResult { redirect_to: None }))
}

/// Change the password of the currently signed-in user.
pub async fn update_password(
    State(state): State<Global>,
    auth: Auth,
    Json(descriptor): Json<UpdatePasswordDescriptor>,
) -> Result<Json<RedirectResult>, Error> {
    state
        .provider
        .update_user_password(&auth.session.access_token, &descriptor.password)
        .await
        .map_err(|err| Error::UpdatePasswordFailed(err.to_string()))?;

    Ok(Json(RedirectResult {
        redirect_to: Some("/".to_string()),
    }))
}

/// Roles of the current session. Never an error: anything short of a
/// verified admin is a guest.
pub async fn permissions(State(state): State<Global>, headers: HeaderMap) -> Json<Vec<Role>> {
    let session = match session_from_headers(&state, &headers) {
        Some(session) => session,
        None => return Json(vec![Role::Guest]),
    };

    match verify_admin(
        state.provider.as_ref(),
        &session.access_token,
        &session.user_id,
    )
    .await
    {
        Ok(status) if status.is_admin => Json(vec![Role::Admin]),
        _ => Json(vec![Role::Guest]),
    }
}

/// The backend user behind the current session, with the display name
/// defaulted to the email address. `null` without a session.
pub async fn identity(
    State(state): State<Global>,
    headers: HeaderMap,
) -> Json<Option<IdentityResult>> {
    let session = match session_from_headers(&state, &headers) {
        Some(session) => session,
        None => return Json(None),
    };

    match state.provider.get_user(&session.access_token).await {
        Ok(user) => Json(Some(IdentityResult {
            id: user.id,
            name: user.email.clone(),
            email: user.email,
            created_at: user.created_at,
        })),
        Err(err) => {
            tracing::warn!("identity lookup failed: {err}");
            Json(None)
        }
    }
}

fn session_from_headers(state: &Global, headers: &HeaderMap) -> Option<Session> {
    let token = headers.get("Token")?.to_str().ok()?;
    state.sessions.get(token)
}
