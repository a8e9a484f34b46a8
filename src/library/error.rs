use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use std::fmt;

use crate::error::{internal_store_error, ErrorResponse, StoreError};
use crate::validation::ValidationError;

/// Service-level errors for library operations
#[derive(Debug)]
pub enum LibraryError {
    /// Bad payload, including a duplicate (title, author) for the caller
    Validation(ValidationError),

    /// Path id and body id disagree on update
    IdMismatch,

    /// Entry absent, unparseable id, or owned by someone else
    NotFound(String),

    Store(StoreError),
}

impl fmt::Display for LibraryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LibraryError::Validation(err) => write!(f, "Validation error: {}", err),
            LibraryError::IdMismatch => {
                write!(f, "Request path id and request body id values must match")
            }
            LibraryError::NotFound(id) => write!(f, "Library entry {} not found", id),
            LibraryError::Store(e) => write!(f, "Store error: {}", e),
        }
    }
}

impl std::error::Error for LibraryError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            LibraryError::Validation(e) => Some(e),
            LibraryError::Store(e) => Some(e),
            _ => None,
        }
    }
}

impl From<StoreError> for LibraryError {
    fn from(err: StoreError) -> Self {
        LibraryError::Store(err)
    }
}

impl From<ValidationError> for LibraryError {
    fn from(err: ValidationError) -> Self {
        LibraryError::Validation(err)
    }
}

impl From<&LibraryError> for ErrorResponse {
    fn from(err: &LibraryError) -> Self {
        match err {
            LibraryError::Validation(e) => {
                tracing::debug!("Library request rejected: {}", e);
                ErrorResponse::from(e)
            }
            LibraryError::IdMismatch => {
                ErrorResponse::new(StatusCode::BAD_REQUEST, "BadRequest", err.to_string())
            }
            LibraryError::NotFound(id) => {
                tracing::debug!("Library entry {} not found for caller", id);
                ErrorResponse::new(StatusCode::NOT_FOUND, "NotFound", "Library entry not found")
            }
            LibraryError::Store(e) => internal_store_error(e),
        }
    }
}

/// Convert LibraryError to HTTP response
impl IntoResponse for LibraryError {
    fn into_response(self) -> Response {
        ErrorResponse::from(&self).into_response()
    }
}
