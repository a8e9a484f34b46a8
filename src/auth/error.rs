// Authentication error types

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use std::fmt;
use tracing::{debug, error, warn};

use crate::error::{internal_store_error, ErrorResponse, StoreError};
use crate::validation::ValidationError;

/// Outcome of registration, login and token checks
#[derive(Debug)]
pub enum AuthError {
    /// Signup payload broke a field rule (includes duplicate email)
    Validation(ValidationError),
    /// Login body without usable email/password strings
    MissingCredentials,
    /// Unknown email or wrong password
    InvalidCredentials,
    MissingToken,
    /// Bad signature, expired or malformed; callers see one kind
    InvalidToken,
    /// Token verified but its subject no longer exists
    UnknownUser,
    Store(StoreError),
    PasswordHashError(String),
    TokenGenerationError(String),
}

impl fmt::Display for AuthError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthError::Validation(err) => write!(f, "Validation error: {}", err),
            AuthError::MissingCredentials => write!(f, "Missing credentials"),
            AuthError::InvalidCredentials => write!(f, "Incorrect email or password"),
            AuthError::MissingToken => write!(f, "Missing authentication token"),
            AuthError::InvalidToken => write!(f, "Invalid token"),
            AuthError::UnknownUser => write!(f, "Token subject no longer exists"),
            AuthError::Store(err) => write!(f, "Store error: {}", err),
            AuthError::PasswordHashError(msg) => write!(f, "Password hashing error: {}", msg),
            AuthError::TokenGenerationError(msg) => write!(f, "Token generation error: {}", msg),
        }
    }
}

impl std::error::Error for AuthError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AuthError::Validation(err) => Some(err),
            AuthError::Store(err) => Some(err),
            _ => None,
        }
    }
}

impl From<StoreError> for AuthError {
    fn from(err: StoreError) -> Self {
        AuthError::Store(err)
    }
}

impl From<ValidationError> for AuthError {
    fn from(err: ValidationError) -> Self {
        AuthError::Validation(err)
    }
}

impl AuthError {
    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            AuthError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AuthError::MissingCredentials => StatusCode::BAD_REQUEST,
            AuthError::InvalidCredentials
            | AuthError::MissingToken
            | AuthError::InvalidToken
            | AuthError::UnknownUser => StatusCode::UNAUTHORIZED,
            AuthError::Store(_)
            | AuthError::PasswordHashError(_)
            | AuthError::TokenGenerationError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn to_error_response(&self) -> ErrorResponse {
        match self {
            AuthError::Validation(err) => {
                debug!("Registration rejected: {} ({:?})", err, err.location());
                ErrorResponse::from(err)
            }
            AuthError::MissingCredentials => {
                ErrorResponse::new(self.status_code(), "LoginError", "Missing credentials")
            }
            AuthError::InvalidCredentials => {
                warn!("Failed login attempt");
                ErrorResponse::new(self.status_code(), "LoginError", "Incorrect email or password")
            }
            AuthError::MissingToken | AuthError::InvalidToken | AuthError::UnknownUser => {
                warn!("Rejected request to protected route: {}", self);
                ErrorResponse::new(self.status_code(), "AuthenticationError", "Unauthorized")
            }
            AuthError::Store(err) => internal_store_error(err),
            AuthError::PasswordHashError(_) | AuthError::TokenGenerationError(_) => {
                error!("{}", self);
                ErrorResponse::internal()
            }
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        self.to_error_response().into_response()
    }
}
