//! Handlers for the operator-facing user list.

use axum::extract::State;
use axum::Json;
use tracing::info;

use tenderdesk_shared::membership::{UpdateMembershipDescriptor, UsersResult};

use crate::{Admin, Error, Global};

use super::list_eligible_users;

/// List all non-admin users with their membership status.
pub async fn list_users(
    State(state): State<Global>,
    admin: Admin,
) -> Result<Json<UsersResult>, Error> {
    let users = list_eligible_users(
        state.provider.as_ref(),
        &admin.session.access_token,
        &admin.session.user_id,
    )
    .await?;

    Ok(Json(UsersResult { users }))
}

/// Assign a membership tier to a user, then hand back the
/// authoritative list.
pub async fn update_membership(
    State(state): State<Global>,
    admin: Admin,
    Json(descriptor): Json<UpdateMembershipDescriptor>,
) -> Result<Json<UsersResult>, Error> {
    let _guard = state
        .membership_updates
        .begin(&descriptor.user_id)
        .ok_or_else(|| Error::MembershipUpdateInFlight(descriptor.user_id.clone()))?;

    state
        .provider
        .update_user_membership(
            &admin.session.access_token,
            &descriptor.user_id,
            descriptor.membership_type,
        )
        .await
        .map_err(|err| Error::MembershipUpdateFailed(err.to_string()))?;

    info!(
        "membership of {} set to {}",
        descriptor.user_id, descriptor.membership_type
    );

    // no optimistic mutation: redisplay whatever the backend now holds
    let users = list_eligible_users(
        state.provider.as_ref(),
        &admin.session.access_token,
        &admin.session.user_id,
    )
    .await?;

    Ok(Json(UsersResult { users }))
}
