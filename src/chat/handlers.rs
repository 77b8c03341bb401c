use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use tracing::instrument;

use super::{
    dto::{Exchange, PostMessageRequest},
    services,
};
use crate::{
    auth::AuthUser, error::AppResult, state::AppState, store::types::Message,
    validation::ValidatedJson,
};

pub fn chat_routes() -> Router<AppState> {
    Router::new()
        .route("/messages", get(list_messages))
        .route("/message", post(post_message))
}

#[instrument(skip(state))]
pub async fn list_messages(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> AppResult<Json<Vec<Message>>> {
    Ok(Json(services::list_messages(&state, user_id).await?))
}

#[instrument(skip(state, payload))]
pub async fn post_message(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    ValidatedJson(payload): ValidatedJson<PostMessageRequest>,
) -> AppResult<(StatusCode, Json<Exchange>)> {
    let exchange = services::post_message(&state, user_id, &payload.content).await?;
    Ok((StatusCode::CREATED, Json(exchange)))
}
