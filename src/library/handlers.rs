// HTTP handlers for library endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;

use crate::auth::middleware::AuthenticatedUser;
use crate::error::JsonBody;
use crate::library::{models::LibraryEntryResponse, LibraryError, LibraryService};

/// List the caller's library
/// GET /api/library
#[utoipa::path(
    get,
    path = "/api/library",
    responses(
        (status = 200, description = "Entries owned by the caller", body = Vec<LibraryEntryResponse>),
        (status = 401, description = "Unauthenticated", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "library"
)]
pub async fn list_entries_handler(
    State(service): State<Arc<LibraryService>>,
    user: AuthenticatedUser,
) -> Result<Json<Vec<LibraryEntryResponse>>, LibraryError> {
    let entries = service.list(user.user_id).await?;
    Ok(Json(entries.into_iter().map(LibraryEntryResponse::from).collect()))
}

/// Add a book to the caller's library
/// POST /api/library
#[utoipa::path(
    post,
    path = "/api/library",
    request_body = CreateEntryRequest,
    responses(
        (status = 201, description = "Entry created", body = LibraryEntryResponse),
        (status = 401, description = "Unauthenticated", body = ErrorResponse),
        (status = 422, description = "Validation failed or duplicate entry", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "library"
)]
pub async fn add_entry_handler(
    State(service): State<Arc<LibraryService>>,
    user: AuthenticatedUser,
    JsonBody(body): JsonBody,
) -> Result<(StatusCode, Json<LibraryEntryResponse>), LibraryError> {
    let entry = service.add(user.user_id, &body).await?;
    Ok((StatusCode::CREATED, Json(entry.into())))
}

/// Update fields of an owned entry
/// PUT /api/library/{id}
#[utoipa::path(
    put,
    path = "/api/library/{id}",
    params(("id" = String, Path, description = "Library entry id")),
    request_body = UpdateEntryRequest,
    responses(
        (status = 204, description = "Entry updated"),
        (status = 400, description = "Path and body ids differ", body = ErrorResponse),
        (status = 401, description = "Unauthenticated", body = ErrorResponse),
        (status = 404, description = "No such entry for the caller", body = ErrorResponse),
        (status = 422, description = "Validation failed or duplicate entry", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "library"
)]
pub async fn update_entry_handler(
    State(service): State<Arc<LibraryService>>,
    user: AuthenticatedUser,
    Path(id): Path<String>,
    JsonBody(body): JsonBody,
) -> Result<StatusCode, LibraryError> {
    service.update(user.user_id, &id, &body).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Delete an owned entry
/// DELETE /api/library/{id}
#[utoipa::path(
    delete,
    path = "/api/library/{id}",
    params(("id" = String, Path, description = "Library entry id")),
    responses(
        (status = 204, description = "Entry deleted"),
        (status = 401, description = "Unauthenticated", body = ErrorResponse),
        (status = 404, description = "No such entry for the caller", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "library"
)]
pub async fn delete_entry_handler(
    State(service): State<Arc<LibraryService>>,
    user: AuthenticatedUser,
    Path(id): Path<String>,
) -> Result<StatusCode, LibraryError> {
    service.delete(user.user_id, &id).await?;
    Ok(StatusCode::NO_CONTENT)
}
