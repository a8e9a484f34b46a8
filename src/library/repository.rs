use axum::async_trait;
use sqlx::PgPool;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::StoreError;
use crate::library::LibraryEntry;

/// Persistence operations for library entries
///
/// Writes that would create a second (user_id, title, author) triple fail with
/// `StoreError::Duplicate`. Update and delete are scoped by owner: an entry
/// belonging to another user behaves as if it did not exist.
#[async_trait]
pub trait LibraryStore: Send + Sync {
    async fn find_by_user(&self, user_id: Uuid) -> Result<Vec<LibraryEntry>, StoreError>;
    async fn find_owned(&self, id: Uuid, user_id: Uuid) -> Result<Option<LibraryEntry>, StoreError>;
    async fn exists(&self, user_id: Uuid, title: &str, author: &str) -> Result<bool, StoreError>;
    async fn count_for_user(&self, user_id: Uuid) -> Result<i64, StoreError>;
    async fn insert(&self, entry: LibraryEntry) -> Result<LibraryEntry, StoreError>;
    async fn update(&self, entry: LibraryEntry) -> Result<Option<LibraryEntry>, StoreError>;
    async fn delete(&self, id: Uuid, user_id: Uuid) -> Result<bool, StoreError>;
}

/// Repository for library entries backed by PostgreSQL
#[derive(Clone)]
pub struct PgLibraryStore {
    pool: PgPool,
}

impl PgLibraryStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl LibraryStore for PgLibraryStore {
    async fn find_by_user(&self, user_id: Uuid) -> Result<Vec<LibraryEntry>, StoreError> {
        let entries = sqlx::query_as::<_, LibraryEntry>(
            r#"
            SELECT id, user_id, title, author, date_finished, comments
            FROM library_entries
            WHERE user_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(entries)
    }

    async fn find_owned(&self, id: Uuid, user_id: Uuid) -> Result<Option<LibraryEntry>, StoreError> {
        let entry = sqlx::query_as::<_, LibraryEntry>(
            r#"
            SELECT id, user_id, title, author, date_finished, comments
            FROM library_entries
            WHERE id = $1 AND user_id = $2
            "#,
        )
        .bind(id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(entry)
    }

    async fn exists(&self, user_id: Uuid, title: &str, author: &str) -> Result<bool, StoreError> {
        let exists: Option<bool> = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM library_entries WHERE user_id = $1 AND title = $2 AND author = $3)",
        )
        .bind(user_id)
        .bind(title)
        .bind(author)
        .fetch_one(&self.pool)
        .await?;

        Ok(exists.unwrap_or(false))
    }

    async fn count_for_user(&self, user_id: Uuid) -> Result<i64, StoreError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM library_entries WHERE user_id = $1")
            .bind(user_id)
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }

    async fn insert(&self, entry: LibraryEntry) -> Result<LibraryEntry, StoreError> {
        sqlx::query_as::<_, LibraryEntry>(
            r#"
            INSERT INTO library_entries (id, user_id, title, author, date_finished, comments)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, user_id, title, author, date_finished, comments
            "#,
        )
        .bind(entry.id)
        .bind(entry.user_id)
        .bind(&entry.title)
        .bind(&entry.author)
        .bind(entry.date_finished)
        .bind(&entry.comments)
        .fetch_one(&self.pool)
        .await
        .map_err(StoreError::from_sqlx)
    }

    async fn update(&self, entry: LibraryEntry) -> Result<Option<LibraryEntry>, StoreError> {
        sqlx::query_as::<_, LibraryEntry>(
            r#"
            UPDATE library_entries
            SET title = $1, author = $2, date_finished = $3, comments = $4
            WHERE id = $5 AND user_id = $6
            RETURNING id, user_id, title, author, date_finished, comments
            "#,
        )
        .bind(&entry.title)
        .bind(&entry.author)
        .bind(entry.date_finished)
        .bind(&entry.comments)
        .bind(entry.id)
        .bind(entry.user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(StoreError::from_sqlx)
    }

    async fn delete(&self, id: Uuid, user_id: Uuid) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM library_entries WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

/// In-process library store; entries are kept in insertion order
#[derive(Default)]
pub struct MemoryLibraryStore {
    entries: RwLock<Vec<LibraryEntry>>,
}

impl MemoryLibraryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn same_book(entry: &LibraryEntry, user_id: Uuid, title: &str, author: &str) -> bool {
    entry.user_id == user_id && entry.title == title && entry.author == author
}

#[async_trait]
impl LibraryStore for MemoryLibraryStore {
    async fn find_by_user(&self, user_id: Uuid) -> Result<Vec<LibraryEntry>, StoreError> {
        let entries = self.entries.read().await;
        Ok(entries.iter().filter(|e| e.user_id == user_id).cloned().collect())
    }

    async fn find_owned(&self, id: Uuid, user_id: Uuid) -> Result<Option<LibraryEntry>, StoreError> {
        let entries = self.entries.read().await;
        Ok(entries
            .iter()
            .find(|e| e.id == id && e.user_id == user_id)
            .cloned())
    }

    async fn exists(&self, user_id: Uuid, title: &str, author: &str) -> Result<bool, StoreError> {
        let entries = self.entries.read().await;
        Ok(entries.iter().any(|e| same_book(e, user_id, title, author)))
    }

    async fn count_for_user(&self, user_id: Uuid) -> Result<i64, StoreError> {
        let entries = self.entries.read().await;
        let count = entries.iter().filter(|e| e.user_id == user_id).count();
        Ok(i64::try_from(count).unwrap_or(i64::MAX))
    }

    async fn insert(&self, entry: LibraryEntry) -> Result<LibraryEntry, StoreError> {
        let mut entries = self.entries.write().await;
        if entries
            .iter()
            .any(|e| same_book(e, entry.user_id, &entry.title, &entry.author))
        {
            return Err(StoreError::Duplicate);
        }
        entries.push(entry.clone());
        Ok(entry)
    }

    async fn update(&self, entry: LibraryEntry) -> Result<Option<LibraryEntry>, StoreError> {
        let mut entries = self.entries.write().await;
        if entries
            .iter()
            .any(|e| e.id != entry.id && same_book(e, entry.user_id, &entry.title, &entry.author))
        {
            return Err(StoreError::Duplicate);
        }

        match entries
            .iter_mut()
            .find(|e| e.id == entry.id && e.user_id == entry.user_id)
        {
            Some(slot) => {
                *slot = entry.clone();
                Ok(Some(entry))
            }
            None => Ok(None),
        }
    }

    async fn delete(&self, id: Uuid, user_id: Uuid) -> Result<bool, StoreError> {
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|e| !(e.id == id && e.user_id == user_id));
        Ok(entries.len() < before)
    }
}
