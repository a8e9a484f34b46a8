// Validation utilities module
// Field-level rules over raw JSON payloads with deterministic, fail-fast errors

use serde_json::{Map, Value};
use thiserror::Error;

/// A single client-fixable validation failure
///
/// Display output is the exact message sent to clients.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Missing field")]
    MissingField { location: &'static str },

    #[error("Incorrect field type: expected {expected}")]
    InvalidType {
        location: &'static str,
        expected: &'static str,
    },

    #[error("Cannot start or end with whitespace")]
    UntrimmedField { location: &'static str },

    #[error("{message}")]
    OutOfRange {
        location: &'static str,
        message: String,
    },

    #[error("{message}")]
    InvalidFormat {
        location: &'static str,
        message: &'static str,
    },

    #[error("{message}")]
    DuplicateField {
        location: &'static str,
        message: &'static str,
    },

    #[error("Book already present in library.")]
    DuplicateEntry,
}

impl ValidationError {
    /// Machine-readable name of the rule that failed
    pub fn kind(&self) -> &'static str {
        match self {
            ValidationError::MissingField { .. } => "MissingField",
            ValidationError::InvalidType { .. } => "InvalidType",
            ValidationError::UntrimmedField { .. } => "UntrimmedField",
            ValidationError::OutOfRange { .. } => "OutOfRange",
            ValidationError::InvalidFormat { .. } => "InvalidFormat",
            ValidationError::DuplicateField { .. } => "DuplicateField",
            ValidationError::DuplicateEntry => "DuplicateEntry",
        }
    }

    /// The offending field, when the failure is tied to one
    pub fn location(&self) -> Option<&'static str> {
        match self {
            ValidationError::MissingField { location }
            | ValidationError::InvalidType { location, .. }
            | ValidationError::UntrimmedField { location }
            | ValidationError::OutOfRange { location, .. }
            | ValidationError::InvalidFormat { location, .. }
            | ValidationError::DuplicateField { location, .. } => Some(location),
            ValidationError::DuplicateEntry => None,
        }
    }

    pub fn too_short(location: &'static str, min: usize) -> Self {
        ValidationError::OutOfRange {
            location,
            message: format!("Must be at least {} characters long", min),
        }
    }

    pub fn too_long(location: &'static str, max: usize) -> Self {
        ValidationError::OutOfRange {
            location,
            message: format!("Must be at most {} characters long", max),
        }
    }
}

/// View a payload as a JSON object; anything else has no fields at all
pub fn as_object(body: &Value) -> Option<&Map<String, Value>> {
    body.as_object()
}

/// First field from `required` (in declared order) absent from the payload
///
/// A key that is present with a `null` value counts as present; its type is
/// checked separately.
pub fn first_missing(body: &Value, required: &[&'static str]) -> Option<&'static str> {
    required.iter().copied().find(|field| match as_object(body) {
        Some(map) => !map.contains_key(*field),
        None => true,
    })
}

/// Fetch a required string field, reporting a type error otherwise
pub fn string_field<'a>(body: &'a Value, field: &'static str) -> Result<&'a str, ValidationError> {
    match body.get(field) {
        None => Err(ValidationError::MissingField { location: field }),
        Some(Value::String(value)) => Ok(value.as_str()),
        Some(_) => Err(ValidationError::InvalidType {
            location: field,
            expected: "string",
        }),
    }
}

/// Fetch an optional string field; `null` and absent both mean "no value"
pub fn optional_string_field<'a>(
    body: &'a Value,
    field: &'static str,
) -> Result<Option<&'a str>, ValidationError> {
    match body.get(field) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(value)) => Ok(Some(value.as_str())),
        Some(_) => Err(ValidationError::InvalidType {
            location: field,
            expected: "string",
        }),
    }
}

/// True when the value has leading or trailing whitespace
pub fn is_untrimmed(value: &str) -> bool {
    value.trim() != value
}

/// Length in characters, not bytes
pub fn char_len(value: &str) -> usize {
    value.chars().count()
}
