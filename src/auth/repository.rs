// Credential store: user records behind a trait, with PostgreSQL and
// in-memory implementations

use axum::async_trait;
use sqlx::PgPool;
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::auth::models::User;
use crate::error::StoreError;

/// Persistence operations for user identities
///
/// `insert` must fail with `StoreError::Duplicate` when the email is taken,
/// atomically with the write.
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn insert(&self, user: User) -> Result<User, StoreError>;
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError>;
}

/// User repository backed by PostgreSQL
#[derive(Clone)]
pub struct PgUserStore {
    pool: PgPool,
}

impl PgUserStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn insert(&self, user: User) -> Result<User, StoreError> {
        sqlx::query_as::<_, User>(
            "INSERT INTO users (id, email, password_hash, cellphone) VALUES ($1, $2, $3, $4) \
             RETURNING id, email, password_hash, cellphone",
        )
        .bind(user.id)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(user.cellphone)
        .fetch_one(&self.pool)
        .await
        .map_err(StoreError::from_sqlx)
    }

    // Emails are compared exactly as stored
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, email, password_hash, cellphone FROM users WHERE email = $1",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, email, password_hash, cellphone FROM users WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }
}

/// In-process user store; the write lock makes check-and-insert atomic
#[derive(Default)]
pub struct MemoryUserStore {
    users: RwLock<HashMap<Uuid, User>>,
}

impl MemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn insert(&self, user: User) -> Result<User, StoreError> {
        let mut users = self.users.write().await;
        if users.values().any(|existing| existing.email == user.email) {
            return Err(StoreError::Duplicate);
        }
        users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let users = self.users.read().await;
        Ok(users.values().find(|user| user.email == email).cloned())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        Ok(self.users.read().await.get(&id).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn test_user(email: &str) -> User {
        User {
            id: Uuid::new_v4(),
            email: email.to_string(),
            password_hash: "test_hash".to_string(),
            cellphone: 5555555555,
        }
    }

    #[tokio::test]
    async fn test_memory_store_finds_inserted_user() {
        let store = MemoryUserStore::new();
        let user = store.insert(test_user("t@t.com")).await.unwrap();

        let by_email = store.find_by_email("t@t.com").await.unwrap().unwrap();
        let by_id = store.find_by_id(user.id).await.unwrap().unwrap();

        assert_eq!(by_email.id, user.id);
        assert_eq!(by_id.email, "t@t.com");
        assert!(store.find_by_email("T@t.com").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_memory_store_rejects_duplicate_email() {
        let store = MemoryUserStore::new();
        store.insert(test_user("t@t.com")).await.unwrap();

        let result = store.insert(test_user("t@t.com")).await;
        assert!(matches!(result, Err(StoreError::Duplicate)));
    }

    #[tokio::test]
    async fn test_concurrent_inserts_admit_one_winner() {
        let store = Arc::new(MemoryUserStore::new());

        let handles: Vec<_> = (0..16)
            .map(|_| {
                let store = Arc::clone(&store);
                tokio::spawn(async move { store.insert(test_user("race@test.com")).await })
            })
            .collect();

        let mut created = 0;
        for handle in handles {
            if handle.await.unwrap().is_ok() {
                created += 1;
            }
        }
        assert_eq!(created, 1);
    }

    #[tokio::test]
    #[ignore = "requires TEST_DATABASE_URL pointing at PostgreSQL"]
    async fn test_pg_store_rejects_duplicate_email() {
        let pool = crate::db::create_test_pool().await;
        let store = PgUserStore::new(pool);
        let email = format!("{}@example.com", Uuid::new_v4());

        store.insert(test_user(&email)).await.unwrap();
        let result = store.insert(test_user(&email)).await;

        assert!(matches!(result, Err(StoreError::Duplicate)));
    }
}
