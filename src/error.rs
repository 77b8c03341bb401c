use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::json;
use tracing::error;

use crate::{
    store::{types::Message, StoreError},
    validation::FieldError,
};

pub type AppResult<T> = Result<T, AppError>;

/// Error returned by every service and handler; renders as `{kind, message, ...}`.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("invalid request")]
    Validation(Vec<FieldError>),

    #[error("no fields provided")]
    NoFieldsProvided,

    #[error("email already registered")]
    Conflict,

    #[error("missing Authorization header")]
    MissingToken,

    #[error("invalid token")]
    InvalidToken,

    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("current password is incorrect")]
    WrongCurrentPassword,

    #[error("{0} not found")]
    NotFound(&'static str),

    /// The human message was stored but its automated reply was not.
    #[error("reply could not be stored")]
    PartialWriteFailure { persisted: Box<Message> },

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    pub fn kind(&self) -> &'static str {
        match self {
            AppError::Validation(_) => "validation_error",
            AppError::NoFieldsProvided => "no_fields_provided",
            AppError::Conflict => "email_taken",
            AppError::MissingToken => "missing_token",
            AppError::InvalidToken => "invalid_token",
            AppError::InvalidCredentials => "invalid_credentials",
            AppError::WrongCurrentPassword => "wrong_current_password",
            AppError::NotFound(_) => "not_found",
            AppError::PartialWriteFailure { .. } => "partial_write_failure",
            AppError::Internal(_) => "internal_error",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation(_) | AppError::NoFieldsProvided => StatusCode::BAD_REQUEST,
            AppError::Conflict => StatusCode::CONFLICT,
            AppError::MissingToken
            | AppError::InvalidToken
            | AppError::InvalidCredentials
            | AppError::WrongCurrentPassword => StatusCode::UNAUTHORIZED,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::PartialWriteFailure { .. } | AppError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    pub fn validation(field: &'static str, message: impl Into<String>) -> Self {
        AppError::Validation(vec![FieldError::new(field, message)])
    }
}

impl From<StoreError> for AppError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::EmailTaken => AppError::Conflict,
            other => AppError::Internal(anyhow::Error::new(other).context("store operation failed")),
        }
    }
}

#[derive(Debug, Serialize)]
struct ErrorBody<'a> {
    kind: &'static str,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<&'a [FieldError]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    partial: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    persisted: Option<&'a Message>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let kind = self.kind();

        if let AppError::Internal(e) = &self {
            error!(error = ?e, "internal error");
            let body = json!({ "kind": kind, "message": "internal server error" });
            return (status, Json(body)).into_response();
        }

        let body = ErrorBody {
            kind,
            message: self.to_string(),
            details: match &self {
                AppError::Validation(errors) => Some(errors.as_slice()),
                _ => None,
            },
            partial: matches!(self, AppError::PartialWriteFailure { .. }).then_some(true),
            persisted: match &self {
                AppError::PartialWriteFailure { persisted } => Some(persisted.as_ref()),
                _ => None,
            },
        };
        (status, Json(&body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    async fn body_json(err: AppError) -> (StatusCode, serde_json::Value) {
        let res = err.into_response();
        let status = res.status();
        let bytes = to_bytes(res.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn validation_errors_list_every_field() {
        let err = AppError::Validation(vec![
            FieldError::new("name", "too short"),
            FieldError::new("email", "invalid"),
        ]);
        let (status, body) = body_json(err).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["kind"], "validation_error");
        assert_eq!(body["details"].as_array().unwrap().len(), 2);
        assert_eq!(body["details"][1]["field"], "email");
    }

    #[tokio::test]
    async fn internal_errors_do_not_leak_details() {
        let err = AppError::Internal(anyhow::anyhow!("connection refused to db-primary:5432"));
        let (status, body) = body_json(err).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["kind"], "internal_error");
        assert!(!body.to_string().contains("db-primary"));
    }

    #[tokio::test]
    async fn partial_write_failure_carries_persisted_message() {
        let persisted = Message {
            id: uuid::Uuid::new_v4(),
            content: "hello".into(),
            from_automated: false,
            user_id: uuid::Uuid::new_v4(),
            created_at: time::OffsetDateTime::now_utc(),
        };
        let err = AppError::PartialWriteFailure {
            persisted: Box::new(persisted.clone()),
        };
        let (status, body) = body_json(err).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["kind"], "partial_write_failure");
        assert_eq!(body["partial"], true);
        assert_eq!(body["persisted"]["content"], "hello");
        assert_eq!(body["persisted"]["fromAutomated"], false);
        assert_eq!(body["persisted"]["id"], persisted.id.to_string());
    }

    #[test]
    fn store_conflict_maps_to_409() {
        let err: AppError = StoreError::EmailTaken.into();
        assert_eq!(err.status(), StatusCode::CONFLICT);
        assert_eq!(err.kind(), "email_taken");
    }

    #[test]
    fn auth_failures_share_status() {
        for err in [
            AppError::MissingToken,
            AppError::InvalidToken,
            AppError::InvalidCredentials,
            AppError::WrongCurrentPassword,
        ] {
            assert_eq!(err.status(), StatusCode::UNAUTHORIZED);
        }
    }
}
