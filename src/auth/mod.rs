//! The access gate: session bookkeeping and admin verification.

pub mod handle;

use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use rand::Rng;
use sha256::digest;

use crate::provider::{AdminStatus, AuthSession, AuthUser, Provider, ProviderError};
use crate::{Error, Global};

/// Gateway-side record of one authenticated backend session.
#[derive(Clone, Debug)]
pub struct Session {
    pub user_id: String,
    pub email: String,
    pub access_token: String,
    pub refresh_token: String,
    pub expires_at: DateTime<Utc>,
}

impl Session {
    fn new(user: &AuthUser, auth: &AuthSession) -> Self {
        Self {
            user_id: user.id.clone(),
            email: user.email.clone(),
            access_token: auth.access_token.clone(),
            refresh_token: auth.refresh_token.clone(),
            expires_at: Utc::now() + Duration::seconds(auth.expires_in),
        }
    }
}

/// Sessions currently recognized by the gateway, keyed by minted token.
pub struct SessionStore {
    inner: DashMap<String, Session>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self {
            inner: DashMap::new(),
        }
    }

    /// Mint a token for a fresh session and remember it.
    #[must_use]
    pub fn insert(&self, user: &AuthUser, auth: &AuthSession) -> String {
        let token = digest(format!(
            "{}-{}-{}",
            user.id,
            Utc::now().timestamp_nanos_opt().unwrap_or_default(),
            rand::thread_rng().gen::<u64>()
        ));
        self.inner.insert(token.clone(), Session::new(user, auth));
        token
    }

    pub fn get(&self, token: &str) -> Option<Session> {
        self.inner.get(token).map(|entry| entry.value().clone())
    }

    pub fn replace(&self, token: &str, session: Session) {
        self.inner.insert(token.to_string(), session);
    }

    /// Drop a session, returning it if it existed.
    pub fn remove(&self, token: &str) -> Option<Session> {
        self.inner.remove(token).map(|(_, session)| session)
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new()
    }
}

/// One way of asking the backend whether a user is an administrator.
///
/// Ordering is part of the contract: each probe guards against a
/// different backend failure mode and later probes are more expensive,
/// so the chain advances only when a probe reports a backend error.
#[derive(Clone, Copy, Debug)]
enum AdminProbe {
    /// Zero-argument "is the current user an admin" procedure.
    CurrentUserRpc,
    /// Parameterized "admin status by id" procedure.
    StatusRpc,
    /// Direct single-row read of the admin records table.
    DirectLookup,
}

impl AdminProbe {
    const CHAIN: [AdminProbe; 3] = [
        AdminProbe::CurrentUserRpc,
        AdminProbe::StatusRpc,
        AdminProbe::DirectLookup,
    ];

    async fn run(
        self,
        provider: &dyn Provider,
        access_token: &str,
        user_id: &str,
    ) -> Result<AdminStatus, ProviderError> {
        match self {
            AdminProbe::CurrentUserRpc => provider
                .is_admin(access_token)
                .await
                .map(|is_admin| AdminStatus {
                    is_admin,
                    ..AdminStatus::default()
                }),
            AdminProbe::StatusRpc => provider.admin_status(access_token, user_id).await,
            AdminProbe::DirectLookup => provider
                .admin_user_by_id(access_token, user_id)
                .await
                .map(|row| {
                    // an absent row is an answer: not an admin
                    row.map(|row| AdminStatus {
                        is_admin: row.is_admin,
                        membership_type: row.membership_type,
                        membership_expiry: row.membership_expiry,
                    })
                    .unwrap_or_default()
                }),
        }
    }
}

/// Resolve the admin status of `user_id`, falling through the probe
/// chain on backend errors only.
///
/// # Errors
///
/// Errors if the user id is empty or every probe reported a backend
/// error. Callers must treat that as "not authorized" while surfacing
/// the contact-administrator message rather than a plain denial.
pub async fn verify_admin(
    provider: &dyn Provider,
    access_token: &str,
    user_id: &str,
) -> Result<AdminStatus, Error> {
    if user_id.is_empty() {
        return Err(Error::AdminVerificationFailed);
    }

    for probe in AdminProbe::CHAIN {
        match probe.run(provider, access_token, user_id).await {
            Ok(status) => return Ok(status),
            Err(err) => {
                tracing::error!("admin probe {probe:?} for {user_id} errored: {err}");
            }
        }
    }

    Err(Error::AdminVerificationFailed)
}

/// Clear a denied or stale session on both sides.
///
/// The gateway session goes first; a failed backend sign-out only gets
/// logged, never surfaced.
pub(crate) async fn force_sign_out(state: &Global, token: &str) {
    if let Some(session) = state.sessions.remove(token) {
        match state.provider.sign_out(&session.access_token).await {
            Ok(()) => tracing::info!("forced sign-out of {} ({})", session.email, session.user_id),
            Err(err) => {
                tracing::warn!("backend sign-out for {} failed: {err}", session.user_id)
            }
        }
    }
}

/// Hand back the session, refreshing it through the backend when the
/// access token has expired. A failed refresh clears the session.
pub(crate) async fn refresh_if_expired(
    state: &Global,
    token: &str,
    session: Session,
) -> Result<Session, Error> {
    if Utc::now() < session.expires_at {
        return Ok(session);
    }

    match state.provider.refresh_session(&session.refresh_token).await {
        Ok(fresh) => {
            let user = fresh.user.clone().unwrap_or(AuthUser {
                id: session.user_id.clone(),
                email: session.email.clone(),
                created_at: None,
            });
            let renewed = Session::new(&user, &fresh);
            state.sessions.replace(token, renewed.clone());
            Ok(renewed)
        }
        Err(err) => {
            tracing::warn!("session refresh for {} failed: {err}", session.user_id);
            state.sessions.remove(token);
            Err(Error::NotLoggedIn)
        }
    }
}
