use serde::{Deserialize, Serialize};

use crate::{
    store::types::Message,
    validation::{Checks, FieldError, Validate},
};

#[derive(Debug, Deserialize)]
pub struct PostMessageRequest {
    pub content: String,
}

impl Validate for PostMessageRequest {
    fn validate(&self) -> Result<(), Vec<FieldError>> {
        Checks::new().not_blank("content", &self.content).finish()
    }
}

/// The stored human message and the automated reply paired with it.
#[derive(Debug, Clone, Serialize)]
pub struct Exchange {
    pub message: Message,
    pub reply: Message,
}
