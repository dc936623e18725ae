//! Request/response types for the account endpoints.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use utoipa::ToSchema;

/// Fields are optional so missing values surface as field errors instead of
/// a deserialization rejection.
#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct RegisterRequest {
    pub username: Option<String>,
    pub password: Option<String>,
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct RegisterResponse {
    pub message: String,
    pub username: String,
    pub confirmation_code: String,
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct ConfirmRequest {
    pub username: Option<String>,
    pub code: Option<String>,
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct ConfirmResponse {
    pub message: String,
    pub username: String,
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct LoginRequest {
    pub username: Option<String>,
    pub password: Option<String>,
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct LoginResponse {
    pub message: String,
    pub token: String,
    pub user_id: String,
    pub username: String,
}

/// Validation failures, keyed by field name. Cross-field failures use the
/// `non_field_errors` key.
#[derive(ToSchema, Serialize, Deserialize, Debug, Default)]
pub struct FieldErrors(pub BTreeMap<String, Vec<String>>);

pub const NON_FIELD_ERRORS: &str = "non_field_errors";

impl FieldErrors {
    pub fn push(&mut self, field: &str, reason: &str) {
        self.0
            .entry(field.to_string())
            .or_default()
            .push(reason.to_string());
    }

    #[must_use]
    pub fn single(field: &str, reason: &str) -> Self {
        let mut errors = Self::default();
        errors.push(field, reason);
        errors
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Generic failure body for not-found and internal errors.
#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    #[must_use]
    pub fn new(error: &str) -> Self {
        Self {
            error: error.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn field_errors_accumulate_per_field() {
        let mut errors = FieldErrors::default();
        errors.push("username", "This field is required.");
        errors.push("username", "Too long.");
        errors.push("password", "Too short.");

        assert!(!errors.is_empty());
        assert_eq!(errors.0.get("username").map(Vec::len), Some(2));
        assert_eq!(errors.0.get("password").map(Vec::len), Some(1));
    }

    #[test]
    fn field_errors_serialize_as_map() {
        let errors = FieldErrors::single("code", "Code must contain only digits.");
        let json = serde_json::to_value(&errors).expect("serializable");
        assert_eq!(
            json,
            serde_json::json!({"code": ["Code must contain only digits."]})
        );
    }

    #[test]
    fn error_response_serializes() {
        let body = ErrorResponse::new("User not found or already activated");
        let json = serde_json::to_value(&body).expect("serializable");
        assert_eq!(
            json,
            serde_json::json!({"error": "User not found or already activated"})
        );
    }
}
