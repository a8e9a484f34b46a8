// Authentication module
// Registration, JWT login and the bearer-token gate for protected routes

pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod password;
pub mod registration;
pub mod repository;
pub mod service;
pub mod token;

// Re-export commonly used types
pub use error::AuthError;
pub use handlers::{login_handler, protected_handler, refresh_handler, register_handler};
pub use middleware::{require_auth, AuthenticatedUser};
pub use models::{AuthTokenResponse, LoginRequest, User, UserResponse};
pub use repository::{MemoryUserStore, PgUserStore, UserStore};
pub use service::AuthService;
pub use token::TokenService;
