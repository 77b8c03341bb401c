use axum::{
    extract::State,
    routing::{get, put},
    Json, Router,
};
use tracing::instrument;

use super::{
    dto::{ChangePasswordRequest, StatusMessage, UpdateProfileRequest},
    services,
};
use crate::{
    auth::{dto::PublicUser, AuthUser},
    error::AppResult,
    state::AppState,
    validation::ValidatedJson,
};

pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/me", get(get_me))
        .route("/user", put(update_user))
        .route("/user/password", put(change_password))
}

#[instrument(skip(state))]
pub async fn get_me(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> AppResult<Json<PublicUser>> {
    Ok(Json(services::get_profile(&state, user_id).await?))
}

#[instrument(skip(state, payload))]
pub async fn update_user(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    ValidatedJson(payload): ValidatedJson<UpdateProfileRequest>,
) -> AppResult<Json<PublicUser>> {
    Ok(Json(services::update_profile(&state, user_id, payload).await?))
}

#[instrument(skip(state, payload))]
pub async fn change_password(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    ValidatedJson(payload): ValidatedJson<ChangePasswordRequest>,
) -> AppResult<Json<StatusMessage>> {
    services::change_password(&state, user_id, payload).await?;
    Ok(Json(StatusMessage {
        message: "password changed",
    }))
}
