// Library module
// Ownership-scoped CRUD over the books a user has finished

pub mod error;
pub mod handlers;
pub mod models;
pub mod repository;
pub mod service;

pub use error::*;
pub use handlers::*;
pub use models::*;
pub use repository::*;
pub use service::*;
