use axum::{
    async_trait,
    extract::{FromRequest, Request},
    Json,
};
use lazy_static::lazy_static;
use regex::Regex;
use serde::{de::DeserializeOwned, Serialize};

use crate::error::AppError;

pub const MIN_NAME_CHARS: usize = 3;
pub const MIN_PASSWORD_CHARS: usize = 6;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

impl FieldError {
    pub fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

/// Request bodies checked at the boundary, before any store is touched.
pub trait Validate {
    fn validate(&self) -> Result<(), Vec<FieldError>>;
}

/// Collects field errors so a request reports every problem at once.
#[derive(Debug, Default)]
pub struct Checks(Vec<FieldError>);

impl Checks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn name(&mut self, field: &'static str, value: &str) -> &mut Self {
        if value.chars().count() < MIN_NAME_CHARS {
            self.0.push(FieldError::new(
                field,
                format!("must be at least {MIN_NAME_CHARS} characters"),
            ));
        }
        self
    }

    pub fn email(&mut self, field: &'static str, value: &str) -> &mut Self {
        if !is_valid_email(value) {
            self.0.push(FieldError::new(field, "must be a valid email address"));
        }
        self
    }

    pub fn password(&mut self, field: &'static str, value: &str) -> &mut Self {
        if value.chars().count() < MIN_PASSWORD_CHARS {
            self.0.push(FieldError::new(
                field,
                format!("must be at least {MIN_PASSWORD_CHARS} characters"),
            ));
        }
        self
    }

    pub fn not_blank(&mut self, field: &'static str, value: &str) -> &mut Self {
        if value.trim().is_empty() {
            self.0.push(FieldError::new(field, "must not be empty"));
        }
        self
    }

    pub fn check(&mut self, ok: bool, field: &'static str, message: &str) -> &mut Self {
        if !ok {
            self.0.push(FieldError::new(field, message));
        }
        self
    }

    pub fn finish(&mut self) -> Result<(), Vec<FieldError>> {
        if self.0.is_empty() {
            Ok(())
        } else {
            Err(std::mem::take(&mut self.0))
        }
    }
}

pub fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// JSON body that has been decoded and validated.
///
/// Decode failures of any kind surface as `AppError::Validation` (400).
pub struct ValidatedJson<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for ValidatedJson<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Validate,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection| AppError::validation("body", rejection.body_text()))?;
        value.validate().map_err(AppError::Validation)?;
        Ok(Self(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_syntax() {
        assert!(is_valid_email("ana@x.com"));
        assert!(!is_valid_email("ana@x"));
        assert!(!is_valid_email("ana x@x.com"));
        assert!(!is_valid_email(""));
    }

    #[test]
    fn password_boundary_is_six_characters() {
        assert!(Checks::new().password("password", "secret").finish().is_ok());
        let errs = Checks::new().password("password", "short").finish().unwrap_err();
        assert_eq!(errs[0].field, "password");
    }

    #[test]
    fn lengths_count_characters_not_bytes() {
        assert!(Checks::new().name("name", "Zoë").finish().is_ok());
        assert!(Checks::new().password("password", "çãõéíú").finish().is_ok());
    }

    #[test]
    fn checks_collect_every_failure() {
        let errs = Checks::new()
            .name("name", "Al")
            .email("email", "nope")
            .password("password", "123")
            .finish()
            .unwrap_err();
        let fields: Vec<_> = errs.iter().map(|e| e.field).collect();
        assert_eq!(fields, ["name", "email", "password"]);
    }

    #[test]
    fn normalizes_email() {
        assert_eq!(normalize_email("  Ana@X.com "), "ana@x.com");
    }
}
