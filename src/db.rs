use sqlx::postgres::{PgPool, PgPoolOptions};
use std::sync::Arc;

use crate::auth::{MemoryUserStore, PgUserStore, UserStore};
use crate::config::Config;
use crate::error::StoreError;
use crate::library::{LibraryStore, MemoryLibraryStore, PgLibraryStore};

/// Type alias for the PostgreSQL connection pool
pub type DbPool = PgPool;

/// `DATABASE_URL` prefix selecting the in-process store
pub const MEMORY_URL_PREFIX: &str = "memory:";

/// The pair of stores the services run against
#[derive(Clone)]
pub struct Stores {
    pub users: Arc<dyn UserStore>,
    pub library: Arc<dyn LibraryStore>,
}

impl Stores {
    /// Fresh, empty in-memory stores
    pub fn in_memory() -> Self {
        Self {
            users: Arc::new(MemoryUserStore::new()),
            library: Arc::new(MemoryLibraryStore::new()),
        }
    }

    pub fn postgres(pool: DbPool) -> Self {
        Self {
            users: Arc::new(PgUserStore::new(pool.clone())),
            library: Arc::new(PgLibraryStore::new(pool)),
        }
    }

    /// Connect to whatever `DATABASE_URL` names, running migrations for
    /// PostgreSQL
    pub async fn connect(config: &Config) -> Result<Self, StoreError> {
        if config.database_url.starts_with(MEMORY_URL_PREFIX) {
            tracing::warn!("Using in-memory store; data is lost on shutdown");
            return Ok(Self::in_memory());
        }

        let pool = create_pool(config).await?;

        tracing::info!("Running database migrations...");
        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .map_err(|e| StoreError::Unavailable(e.to_string()))?;
        tracing::info!("Migrations completed successfully");

        Ok(Self::postgres(pool))
    }
}

/// Creates and configures a PostgreSQL connection pool
///
/// Acquiring a connection is bounded by the configured timeout, so no store
/// call waits on the pool indefinitely.
pub async fn create_pool(config: &Config) -> Result<DbPool, StoreError> {
    tracing::debug!("Creating database connection pool");

    let pool = PgPoolOptions::new()
        .max_connections(config.db_max_connections)
        .acquire_timeout(config.db_acquire_timeout)
        .connect(&config.database_url)
        .await?;

    tracing::info!("Database connection pool created successfully");
    Ok(pool)
}

/// Pool for database-backed tests, with migrations applied
#[cfg(test)]
pub async fn create_test_pool() -> DbPool {
    let database_url = std::env::var("TEST_DATABASE_URL")
        .unwrap_or_else(|_| "postgresql://localhost:5432/my_library_test".to_string());

    let pool = PgPool::connect(&database_url)
        .await
        .expect("Failed to connect to test database");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("Failed to run migrations");

    pool
}
