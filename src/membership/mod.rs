//! The membership updater: listing eligible users and assigning tiers.

pub mod handle;

use std::sync::Arc;

use dashmap::DashMap;

use tenderdesk_shared::membership::UserRow;

use crate::provider::{Provider, ProviderError};

/// Membership updates currently in flight, one slot per user id.
///
/// Two concurrent updates to one row would race; distinct rows proceed
/// independently.
pub struct InFlight {
    inner: Arc<DashMap<String, ()>>,
}

impl InFlight {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(DashMap::new()),
        }
    }

    /// Claim the slot for `user_id`, or `None` when an update is
    /// already running for that user.
    pub fn begin(&self, user_id: &str) -> Option<FlightGuard> {
        use dashmap::mapref::entry::Entry;

        match self.inner.entry(user_id.to_string()) {
            Entry::Occupied(_) => None,
            Entry::Vacant(vacant) => {
                vacant.insert(());
                Some(FlightGuard {
                    set: Arc::clone(&self.inner),
                    user_id: user_id.to_string(),
                })
            }
        }
    }
}

impl Default for InFlight {
    fn default() -> Self {
        Self::new()
    }
}

/// Releases the per-user slot when the update resolves, however it
/// resolves.
pub struct FlightGuard {
    set: Arc<DashMap<String, ()>>,
    user_id: String,
}

impl Drop for FlightGuard {
    fn drop(&mut self) {
        self.set.remove(&self.user_id);
    }
}

/// Fetch all non-admin users joined to their membership fields,
/// excluding the operator's own row.
///
/// The joined view procedure is the primary path; when it errors the
/// gateway enumerates auth users and looks each one up individually.
/// That fallback costs one backend call per user and is acceptable
/// only while the user count stays small.
pub async fn list_eligible_users(
    provider: &dyn Provider,
    access_token: &str,
    operator_id: &str,
) -> Result<Vec<UserRow>, ProviderError> {
    match provider.users_with_admin_status(access_token).await {
        Ok(rows) => Ok(rows
            .into_iter()
            .filter(|row| !row.is_admin && row.id != operator_id)
            .map(|row| UserRow {
                id: row.id,
                email: row.email,
                created_at: row.created_at,
                membership_type: row.membership_type,
                membership_expiry: row.membership_expiry,
            })
            .collect()),

        Err(err) => {
            tracing::warn!("joined user view errored, enumerating instead: {err}");

            let mut users = Vec::new();
            for user in provider.list_users().await? {
                if user.id == operator_id {
                    continue;
                }

                // a failed lookup means no membership data, not an error
                let row = provider
                    .admin_user_by_id(access_token, &user.id)
                    .await
                    .ok()
                    .flatten();
                if row.as_ref().map_or(false, |row| row.is_admin) {
                    continue;
                }

                users.push(UserRow {
                    id: user.id,
                    email: user.email,
                    created_at: user.created_at,
                    membership_type: row.as_ref().and_then(|row| row.membership_type),
                    membership_expiry: row.as_ref().and_then(|row| row.membership_expiry),
                });
            }
            Ok(users)
        }
    }
}
