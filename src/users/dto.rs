use serde::{Deserialize, Serialize};

use crate::{
    store::types::ProfileChanges,
    validation::{normalize_email, Checks, FieldError, Validate},
};

/// Partial profile update; absent fields are left unchanged.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateProfileRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

impl UpdateProfileRequest {
    pub fn into_changes(self) -> ProfileChanges {
        ProfileChanges {
            name: self.name.map(|n| n.trim().to_string()),
            email: self.email.map(|e| normalize_email(&e)),
        }
    }
}

impl Validate for UpdateProfileRequest {
    fn validate(&self) -> Result<(), Vec<FieldError>> {
        let mut checks = Checks::new();
        if let Some(name) = &self.name {
            checks.name("name", name.trim());
        }
        if let Some(email) = &self.email {
            checks.email("email", &normalize_email(email));
        }
        checks.finish()
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    #[serde(alias = "current_password")]
    pub current_password: String,
    #[serde(alias = "new_password")]
    pub new_password: String,
    #[serde(default, alias = "confirm_password")]
    pub confirm_password: Option<String>,
}

impl Validate for ChangePasswordRequest {
    fn validate(&self) -> Result<(), Vec<FieldError>> {
        let confirmed = self
            .confirm_password
            .as_ref()
            .map_or(true, |c| *c == self.new_password);
        Checks::new()
            .password("newPassword", &self.new_password)
            .check(confirmed, "confirmPassword", "does not match newPassword")
            .finish()
    }
}

#[derive(Debug, Serialize)]
pub struct StatusMessage {
    pub message: &'static str,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_supplied_fields_are_validated() {
        let req = UpdateProfileRequest {
            name: Some("Ana Maria".into()),
            email: None,
        };
        assert!(req.validate().is_ok());

        let req = UpdateProfileRequest {
            name: None,
            email: Some("not-an-email".into()),
        };
        let errs = req.validate().unwrap_err();
        assert_eq!(errs.len(), 1);
        assert_eq!(errs[0].field, "email");
    }

    #[test]
    fn changes_are_normalized() {
        let changes = UpdateProfileRequest {
            name: Some("  Ana ".into()),
            email: Some(" ANA@X.com".into()),
        }
        .into_changes();
        assert_eq!(changes.name.as_deref(), Some("Ana"));
        assert_eq!(changes.email.as_deref(), Some("ana@x.com"));
    }

    #[test]
    fn accepts_camel_and_snake_case() {
        let camel: ChangePasswordRequest =
            serde_json::from_str(r#"{"currentPassword":"secret1","newPassword":"secret2"}"#)
                .unwrap();
        let snake: ChangePasswordRequest =
            serde_json::from_str(r#"{"current_password":"secret1","new_password":"secret2"}"#)
                .unwrap();
        assert_eq!(camel.new_password, snake.new_password);
    }

    #[test]
    fn confirmation_must_match() {
        let req = ChangePasswordRequest {
            current_password: "secret1".into(),
            new_password: "secret2".into(),
            confirm_password: Some("secret3".into()),
        };
        let errs = req.validate().unwrap_err();
        assert_eq!(errs[0].field, "confirmPassword");
    }

    #[test]
    fn new_password_boundary() {
        let mut req = ChangePasswordRequest {
            current_password: "secret1".into(),
            new_password: "abcdef".into(),
            confirm_password: None,
        };
        assert!(req.validate().is_ok());
        req.new_password = "abcde".into();
        assert!(req.validate().is_err());
    }

    #[test]
    fn empty_current_password_is_left_to_verification() {
        let req = ChangePasswordRequest {
            current_password: String::new(),
            new_password: "secret2".into(),
            confirm_password: None,
        };
        assert!(req.validate().is_ok());
    }
}
