// HTTP handlers for user and authentication endpoints

use axum::{extract::State, http::StatusCode, Json};
use serde_json::Value;
use std::sync::Arc;
use validator::Validate;

use crate::auth::{
    error::AuthError,
    middleware::AuthenticatedUser,
    models::{AuthTokenResponse, LoginRequest, ProtectedResponse, RegisterRequest, UserResponse},
    service::AuthService,
};
use crate::error::JsonBody;

/// Register a new user
/// POST /api/users
#[utoipa::path(
    post,
    path = "/api/users",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "User created", body = UserResponse),
        (status = 422, description = "Validation failed", body = ErrorResponse)
    ),
    tag = "users"
)]
pub async fn register_handler(
    State(service): State<Arc<AuthService>>,
    JsonBody(body): JsonBody,
) -> Result<(StatusCode, Json<UserResponse>), AuthError> {
    let user = service.register(&body).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

/// Log in with email and password
/// POST /api/auth/login
#[utoipa::path(
    post,
    path = "/api/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Token issued", body = AuthTokenResponse),
        (status = 400, description = "Missing credentials", body = ErrorResponse),
        (status = 401, description = "Incorrect email or password", body = ErrorResponse)
    ),
    tag = "auth"
)]
pub async fn login_handler(
    State(service): State<Arc<AuthService>>,
    JsonBody(body): JsonBody,
) -> Result<Json<AuthTokenResponse>, AuthError> {
    let request = match (body.get("email"), body.get("password")) {
        (Some(Value::String(email)), Some(Value::String(password))) => LoginRequest {
            email: email.clone(),
            password: password.clone(),
        },
        _ => return Err(AuthError::MissingCredentials),
    };
    request.validate().map_err(|_| AuthError::MissingCredentials)?;

    let auth_token = service.login(&request.email, &request.password).await?;
    Ok(Json(AuthTokenResponse { auth_token }))
}

/// Exchange a valid token for a fresh one
/// POST /api/auth/refresh
#[utoipa::path(
    post,
    path = "/api/auth/refresh",
    responses(
        (status = 200, description = "Token issued", body = AuthTokenResponse),
        (status = 401, description = "Unauthenticated", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "auth"
)]
pub async fn refresh_handler(
    State(service): State<Arc<AuthService>>,
    user: AuthenticatedUser,
) -> Result<Json<AuthTokenResponse>, AuthError> {
    let auth_token = service.refresh(user.user_id)?;
    Ok(Json(AuthTokenResponse { auth_token }))
}

/// Protected probe endpoint
/// GET /api/protected
#[utoipa::path(
    get,
    path = "/api/protected",
    responses(
        (status = 200, description = "Caller is authenticated", body = ProtectedResponse),
        (status = 401, description = "Unauthenticated", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "auth"
)]
pub async fn protected_handler(_user: AuthenticatedUser) -> Json<ProtectedResponse> {
    Json(ProtectedResponse {
        data: "this is a supersecret endpoint.".to_string(),
    })
}
