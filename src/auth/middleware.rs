// Authentication gate for protected routes

use axum::{
    async_trait,
    body::Body,
    extract::{FromRef, FromRequestParts, State},
    http::{header, request::Parts, HeaderMap, Request},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::auth::{error::AuthError, service::AuthService};

/// Identity of the caller, resolved from a verified bearer token
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedUser {
    pub user_id: Uuid,
    pub email: String,
}

/// Pull the token out of an `Authorization: Bearer <token>` header
pub fn bearer_token(headers: &HeaderMap) -> Result<&str, AuthError> {
    let auth_header = headers
        .get(header::AUTHORIZATION)
        .ok_or(AuthError::MissingToken)?
        .to_str()
        .map_err(|_| AuthError::InvalidToken)?;

    auth_header
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .ok_or(AuthError::InvalidToken)
}

async fn resolve(headers: &HeaderMap, auth: &AuthService) -> Result<AuthenticatedUser, AuthError> {
    let token = bearer_token(headers)?;
    let user = auth.authenticate(token).await?;
    Ok(AuthenticatedUser {
        user_id: user.id,
        email: user.email,
    })
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthenticatedUser
where
    Arc<AuthService>: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        // Already resolved by `require_auth` on this request
        if let Some(user) = parts.extensions.get::<AuthenticatedUser>() {
            return Ok(user.clone());
        }

        let auth = Arc::<AuthService>::from_ref(state);
        resolve(&parts.headers, &auth).await
    }
}

/// Middleware rejecting any request without a valid token before the
/// handler runs; the resolved identity is stored in request extensions
pub async fn require_auth(
    State(auth): State<Arc<AuthService>>,
    mut request: Request<Body>,
    next: Next,
) -> Result<Response, AuthError> {
    let endpoint = request.uri().path().to_string();

    let user = resolve(request.headers(), &auth).await.map_err(|e| {
        warn!("Authentication failed for {}: {}", endpoint, e);
        e
    })?;

    debug!("Authenticated user_id={} for {}", user.user_id, endpoint);
    request.extensions_mut().insert(user);
    Ok(next.run(request).await)
}
