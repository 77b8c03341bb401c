use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    store::types::User,
    validation::{normalize_email, Checks, FieldError, Validate},
};

/// Request body for user registration.
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
}

impl RegisterRequest {
    pub fn normalized(self) -> Self {
        Self {
            name: self.name.trim().to_string(),
            email: normalize_email(&self.email),
            password: self.password,
        }
    }
}

impl Validate for RegisterRequest {
    fn validate(&self) -> Result<(), Vec<FieldError>> {
        Checks::new()
            .name("name", self.name.trim())
            .email("email", &normalize_email(&self.email))
            .password("password", &self.password)
            .finish()
    }
}

/// Request body for login.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

// Login never reports which field was wrong; bad input is just bad credentials.
impl Validate for LoginRequest {
    fn validate(&self) -> Result<(), Vec<FieldError>> {
        Ok(())
    }
}

#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub token: String,
}

/// Public part of the user returned to the client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PublicUser {
    pub id: Uuid,
    pub name: String,
    pub email: String,
}

impl From<User> for PublicUser {
    fn from(u: User) -> Self {
        Self {
            id: u.id,
            name: u.name,
            email: u.email,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn public_user_has_no_password_field() {
        let user = User {
            id: Uuid::new_v4(),
            name: "Ana Silva".into(),
            email: "ana@x.com".into(),
            password_hash: "$argon2id$v=19$secret".into(),
            created_at: time::OffsetDateTime::now_utc(),
        };
        let json = serde_json::to_value(PublicUser::from(user)).unwrap();
        let keys: Vec<_> = json.as_object().unwrap().keys().cloned().collect();
        assert_eq!(keys.len(), 3);
        assert!(!json.to_string().contains("argon2"));
        assert!(json.get("password").is_none());
        assert!(json.get("password_hash").is_none());
    }

    #[test]
    fn register_validation_uses_normalized_values() {
        let req = RegisterRequest {
            name: "  Ana  ".into(),
            email: "  ANA@X.COM ".into(),
            password: "secret".into(),
        };
        assert!(req.validate().is_ok());
        let req = req.normalized();
        assert_eq!(req.name, "Ana");
        assert_eq!(req.email, "ana@x.com");

        let short = RegisterRequest {
            name: " Al ".into(),
            email: "ana@x.com".into(),
            password: "12345".into(),
        };
        let errs = short.validate().unwrap_err();
        assert_eq!(errs.len(), 2);
    }
}
