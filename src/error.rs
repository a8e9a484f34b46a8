// Error handling shared by every module of the library API
// Provides the store error type and the JSON body all failures render to

use axum::{
    async_trait,
    extract::{FromRequest, Request},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use thiserror::Error;
use tracing::{debug, error};
use utoipa::ToSchema;

use crate::validation::ValidationError;

/// Failures raised by the persistence layer
///
/// `Duplicate` is reported when the store's own uniqueness constraint rejects
/// a write, so callers never depend on a prior existence check alone.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("unique constraint violated")]
    Duplicate,

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("store unavailable: {0}")]
    Unavailable(String),
}

impl StoreError {
    /// Map a sqlx error, folding unique-constraint violations into `Duplicate`
    pub fn from_sqlx(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_err) = &err {
            if db_err.is_unique_violation() {
                return StoreError::Duplicate;
            }
        }
        StoreError::Database(err)
    }
}

/// Consistent error body returned for every failed request
///
/// `reason` follows the client's long-standing convention (`ValidationError`,
/// `LoginError`, ...); `kind` names the exact validation rule when there is one.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    #[schema(example = 422)]
    pub code: u16,

    #[schema(example = "ValidationError")]
    pub reason: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(example = "MissingField")]
    pub kind: Option<String>,

    #[schema(example = "Missing field")]
    pub message: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(example = "email")]
    pub location: Option<String>,
}

impl ErrorResponse {
    pub fn new(status: StatusCode, reason: &str, message: impl Into<String>) -> Self {
        Self {
            code: status.as_u16(),
            reason: reason.to_string(),
            kind: None,
            message: message.into(),
            location: None,
        }
    }

    /// Body for the generic 500; internal detail stays in the logs
    pub fn internal() -> Self {
        Self::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            "InternalError",
            "Internal server error",
        )
    }

    pub fn status(&self) -> StatusCode {
        StatusCode::from_u16(self.code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }
}

impl From<&ValidationError> for ErrorResponse {
    fn from(err: &ValidationError) -> Self {
        Self {
            code: StatusCode::UNPROCESSABLE_ENTITY.as_u16(),
            reason: "ValidationError".to_string(),
            kind: Some(err.kind().to_string()),
            message: err.to_string(),
            location: err.location().map(str::to_string),
        }
    }
}

impl IntoResponse for ErrorResponse {
    fn into_response(self) -> Response {
        (self.status(), Json(self)).into_response()
    }
}

/// Log a store failure and produce the generic 500 body
pub fn internal_store_error(err: &StoreError) -> ErrorResponse {
    error!("Store error: {:?}", err);
    ErrorResponse::internal()
}

/// Raw JSON request body
///
/// Wraps axum's `Json` extractor so a missing content type or unparseable
/// body renders as an `ErrorResponse` instead of plain text.
#[derive(Debug)]
pub struct JsonBody(pub Value);

#[async_trait]
impl<S> FromRequest<S> for JsonBody
where
    S: Send + Sync,
{
    type Rejection = ErrorResponse;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<Value>::from_request(req, state).await {
            Ok(Json(value)) => Ok(Self(value)),
            Err(rejection) => {
                debug!("Request body rejected: {}", rejection.body_text());
                Err(ErrorResponse::new(
                    rejection.status(),
                    "BadRequest",
                    rejection.body_text(),
                ))
            }
        }
    }
}

/// Fallback for routes that match nothing
pub async fn not_found_fallback() -> (StatusCode, Json<serde_json::Value>) {
    (
        StatusCode::NOT_FOUND,
        Json(json!({ "status": 404, "message": "Not Found" })),
    )
}
