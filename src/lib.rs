pub mod auth;
pub mod config;
pub mod db;
pub mod demo;
pub mod error;
pub mod library;
pub mod validation;

use axum::{
    extract::FromRef,
    http::{header, Method},
    middleware,
    routing::{get, post, put},
    Router,
};
use std::{sync::Arc, time::Duration};
use tower_http::{
    cors::{Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use utoipa::{
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    Modify, OpenApi,
};
use utoipa_swagger_ui::SwaggerUi;

use auth::{AuthService, TokenService};
use config::Config;
use db::Stores;
use library::LibraryService;

/// OpenAPI documentation structure
#[derive(OpenApi)]
#[openapi(
    paths(
        auth::handlers::register_handler,
        auth::handlers::login_handler,
        auth::handlers::refresh_handler,
        auth::handlers::protected_handler,
        library::handlers::list_entries_handler,
        library::handlers::add_entry_handler,
        library::handlers::update_entry_handler,
        library::handlers::delete_entry_handler,
    ),
    components(
        schemas(
            error::ErrorResponse,
            auth::models::RegisterRequest,
            auth::models::UserResponse,
            auth::models::LoginRequest,
            auth::models::AuthTokenResponse,
            auth::models::ProtectedResponse,
            library::models::LibraryEntryResponse,
            library::models::CreateEntryRequest,
            library::models::UpdateEntryRequest,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "users", description = "Account registration"),
        (name = "auth", description = "Login and token endpoints"),
        (name = "library", description = "The caller's finished books")
    ),
    info(
        title = "My Library API",
        version = "1.0.0",
        description = "Personal book-tracking API"
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub auth_service: Arc<AuthService>,
    pub library_service: Arc<LibraryService>,
}

impl FromRef<AppState> for Arc<AuthService> {
    fn from_ref(state: &AppState) -> Self {
        state.auth_service.clone()
    }
}

impl FromRef<AppState> for Arc<LibraryService> {
    fn from_ref(state: &AppState) -> Self {
        state.library_service.clone()
    }
}

impl AppState {
    pub fn new(config: &Config, stores: Stores) -> Self {
        let tokens = TokenService::new(&config.jwt_secret, config.jwt_expiry);
        Self {
            auth_service: Arc::new(AuthService::new(stores.users, tokens)),
            library_service: Arc::new(LibraryService::new(stores.library)),
        }
    }
}

/// Creates and configures the application router
///
/// Every route except signup and login sits behind `require_auth`.
pub fn create_router(state: AppState, request_timeout: Duration) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
        ])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]);

    let protected = Router::new()
        .route("/api/auth/refresh", post(auth::refresh_handler))
        .route("/api/protected", get(auth::protected_handler))
        .route(
            "/api/library",
            get(library::list_entries_handler).post(library::add_entry_handler),
        )
        .route(
            "/api/library/:id",
            put(library::update_entry_handler).delete(library::delete_entry_handler),
        )
        .route_layer(middleware::from_fn_with_state(
            state.auth_service.clone(),
            auth::require_auth,
        ));

    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .route("/api/users", post(auth::register_handler))
        .route("/api/auth/login", post(auth::login_handler))
        .merge(protected)
        .fallback(error::not_found_fallback)
        .layer(TimeoutLayer::new(request_timeout))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

#[cfg(test)]
mod tests;
