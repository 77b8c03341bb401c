use tracing::{info, warn};
use uuid::Uuid;

use super::dto::{ChangePasswordRequest, UpdateProfileRequest};
use crate::{
    auth::dto::PublicUser,
    error::{AppError, AppResult},
    state::AppState,
};

/// The caller's profile. A verified token can outlive its user row.
pub async fn get_profile(state: &AppState, user_id: Uuid) -> AppResult<PublicUser> {
    let user = state
        .users
        .find_by_id(user_id)
        .await?
        .ok_or(AppError::NotFound("user"))?;
    Ok(user.into())
}

pub async fn update_profile(
    state: &AppState,
    user_id: Uuid,
    req: UpdateProfileRequest,
) -> AppResult<PublicUser> {
    let changes = req.into_changes();
    if changes.is_empty() {
        return Err(AppError::NoFieldsProvided);
    }

    let user = state
        .users
        .update_profile(user_id, &changes)
        .await?
        .ok_or(AppError::NotFound("user"))?;

    info!(
        user_id = %user.id,
        name_changed = changes.name.is_some(),
        email_changed = changes.email.is_some(),
        "profile updated"
    );
    Ok(user.into())
}

/// Verify the current password and swap in a new hash.
///
/// The swap only succeeds against the hash that was verified, so of two
/// concurrent changes using the same current password at most one wins.
pub async fn change_password(
    state: &AppState,
    user_id: Uuid,
    req: ChangePasswordRequest,
) -> AppResult<()> {
    let user = state
        .users
        .find_by_id(user_id)
        .await?
        .ok_or(AppError::NotFound("user"))?;

    if !state
        .hasher
        .verify(&req.current_password, &user.password_hash)
        .await?
    {
        warn!(user_id = %user_id, "wrong current password");
        return Err(AppError::WrongCurrentPassword);
    }

    let new_hash = state.hasher.hash(&req.new_password).await?;
    let swapped = state
        .users
        .replace_password_hash(user_id, &user.password_hash, &new_hash)
        .await?;

    if !swapped {
        // Either the row vanished or another change landed first.
        return match state.users.find_by_id(user_id).await? {
            None => Err(AppError::NotFound("user")),
            Some(_) => {
                warn!(user_id = %user_id, "password changed concurrently");
                Err(AppError::WrongCurrentPassword)
            }
        };
    }

    info!(user_id = %user_id, "password changed");
    Ok(())
}
