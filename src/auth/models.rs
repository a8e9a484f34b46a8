// Authentication data models and DTOs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

/// User database model
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub password_hash: String,
    pub cellphone: i64,
}

/// Public user representation (excludes password_hash)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct UserResponse {
    #[schema(example = "t@t.com")]
    pub email: String,
    #[schema(example = 5555555555_i64)]
    pub cellphone: i64,
    pub id: Uuid,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            email: user.email,
            cellphone: user.cellphone,
            id: user.id,
        }
    }
}

/// A signup payload that passed every field rule; password still in clear
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedRegistration {
    pub email: String,
    pub password: String,
    pub cellphone: i64,
}

/// Signup request, documented for the OpenAPI schema
///
/// Handlers receive the raw JSON so presence and type rules can be reported
/// field by field.
#[derive(Debug, Deserialize, ToSchema)]
pub struct RegisterRequest {
    #[schema(example = "t@t.com")]
    pub email: String,
    #[schema(example = "1234567890")]
    pub password: String,
    #[schema(example = 5555555555_i64)]
    pub cellphone: i64,
}

/// Login request DTO
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct LoginRequest {
    #[validate(length(min = 1))]
    pub email: String,
    #[validate(length(min = 1))]
    pub password: String,
}

/// Token issued on login and refresh
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AuthTokenResponse {
    pub auth_token: String,
}

/// Body of the protected probe endpoint
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ProtectedResponse {
    #[schema(example = "this is a supersecret endpoint.")]
    pub data: String,
}
