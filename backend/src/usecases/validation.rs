use std::sync::LazyLock;

use regex::Regex;
use thiserror::Error;
use uuid::Uuid;

pub const MISSING_REQUIRED_FIELDS: &str = "MISSING_REQUIRED_FIELDS";
pub const INVALID_ID_FORMAT: &str = "INVALID_ID_FORMAT";
pub const VALIDATION_ERROR: &str = "VALIDATION_ERROR";

static EMAIL_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern compiles"));

/// A rejected request payload, reported to the client as 400.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{message}")]
pub struct ValidationError {
    pub code: &'static str,
    pub message: String,
    pub field: Option<String>,
    pub missing_fields: Vec<String>,
}

impl ValidationError {
    pub fn invalid(field: &str, message: impl Into<String>) -> Self {
        Self {
            code: VALIDATION_ERROR,
            message: message.into(),
            field: Some(field.to_string()),
            missing_fields: Vec::new(),
        }
    }

    pub fn missing(fields: &[&str]) -> Self {
        let missing_fields: Vec<String> = fields.iter().map(|name| name.to_string()).collect();
        let verb = if missing_fields.len() == 1 { "is" } else { "are" };
        Self {
            code: MISSING_REQUIRED_FIELDS,
            message: format!("{} {} required", missing_fields.join(", "), verb),
            field: None,
            missing_fields,
        }
    }

    pub fn malformed_body(message: impl Into<String>) -> Self {
        Self {
            code: VALIDATION_ERROR,
            message: message.into(),
            field: None,
            missing_fields: Vec::new(),
        }
    }
}

/// Fails with every absent field listed, in the order given.
pub fn require_fields(fields: &[(&str, bool)]) -> Result<(), ValidationError> {
    let missing: Vec<&str> = fields
        .iter()
        .filter(|(_, present)| !present)
        .map(|(name, _)| *name)
        .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        Err(ValidationError::missing(&missing))
    }
}

pub fn present(value: &Option<String>) -> bool {
    value.as_deref().is_some_and(|value| !value.is_empty())
}

/// Parses a record identifier. `label` names it in the message, e.g. "User ID".
pub fn parse_object_id(raw: &str, label: &str, field: &str) -> Result<Uuid, ValidationError> {
    Uuid::parse_str(raw.trim()).map_err(|_| ValidationError {
        code: INVALID_ID_FORMAT,
        message: format!("Invalid {} format", label),
        field: Some(field.to_string()),
        missing_fields: Vec::new(),
    })
}

pub fn is_valid_email(email: &str) -> bool {
    EMAIL_PATTERN.is_match(email)
}
