use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::error::StoreError;
use crate::library::{EntryChanges, LibraryEntry, LibraryError, LibraryStore, NewEntry};
use crate::validation::ValidationError;

/// Service layer for library business logic
///
/// Every operation takes the caller's user id from the authentication gate;
/// nothing here trusts an owner supplied by the client.
#[derive(Clone)]
pub struct LibraryService {
    store: Arc<dyn LibraryStore>,
}

fn duplicate_or_store(err: StoreError) -> LibraryError {
    match err {
        StoreError::Duplicate => LibraryError::Validation(ValidationError::DuplicateEntry),
        other => LibraryError::Store(other),
    }
}

fn parse_entry_id(raw: &str) -> Result<Uuid, LibraryError> {
    Uuid::parse_str(raw).map_err(|_| LibraryError::NotFound(raw.to_string()))
}

impl LibraryService {
    pub fn new(store: Arc<dyn LibraryStore>) -> Self {
        Self { store }
    }

    /// All entries owned by the caller, in store order
    pub async fn list(&self, user_id: Uuid) -> Result<Vec<LibraryEntry>, LibraryError> {
        let entries = self.store.find_by_user(user_id).await?;
        debug!("Listed {} entries for user {}", entries.len(), user_id);
        Ok(entries)
    }

    /// Add an entry from a raw payload
    ///
    /// 1. Presence and type rules
    /// 2. Duplicate (title, author) pre-check for the caller
    /// 3. Insert; the store's unique constraint is the final arbiter
    pub async fn add(&self, user_id: Uuid, body: &Value) -> Result<LibraryEntry, LibraryError> {
        let new_entry = NewEntry::from_json(body)?;
        self.add_entry(user_id, new_entry).await
    }

    pub async fn add_entry(
        &self,
        user_id: Uuid,
        new_entry: NewEntry,
    ) -> Result<LibraryEntry, LibraryError> {
        if self
            .store
            .exists(user_id, &new_entry.title, &new_entry.author)
            .await?
        {
            warn!("Duplicate library entry for user {}", user_id);
            return Err(ValidationError::DuplicateEntry.into());
        }

        let entry = LibraryEntry {
            id: Uuid::new_v4(),
            user_id,
            title: new_entry.title,
            author: new_entry.author,
            date_finished: new_entry.date_finished,
            comments: new_entry.comments,
        };

        let created = self.store.insert(entry).await.map_err(duplicate_or_store)?;
        info!("Created library entry {} for user {}", created.id, user_id);
        Ok(created)
    }

    /// Apply a partial update to an entry the caller owns
    ///
    /// The body must repeat the path id. Only title, author, dateFinished and
    /// comments are read from it; the owner never changes.
    pub async fn update(
        &self,
        user_id: Uuid,
        path_id: &str,
        body: &Value,
    ) -> Result<LibraryEntry, LibraryError> {
        match body.get("id").and_then(Value::as_str) {
            Some(body_id) if body_id == path_id => {}
            _ => {
                debug!("Update rejected: body id does not match path id {}", path_id);
                return Err(LibraryError::IdMismatch);
            }
        }

        let id = parse_entry_id(path_id)?;
        let changes = EntryChanges::from_json(body)?;

        let existing = self
            .store
            .find_owned(id, user_id)
            .await?
            .ok_or_else(|| LibraryError::NotFound(path_id.to_string()))?;

        if changes.is_empty() {
            return Ok(existing);
        }

        let updated = self
            .store
            .update(changes.apply_to(existing))
            .await
            .map_err(duplicate_or_store)?
            .ok_or_else(|| LibraryError::NotFound(path_id.to_string()))?;

        info!("Updated library entry {} for user {}", id, user_id);
        Ok(updated)
    }

    /// Delete an entry the caller owns
    pub async fn delete(&self, user_id: Uuid, path_id: &str) -> Result<(), LibraryError> {
        let id = parse_entry_id(path_id)?;

        if !self.store.delete(id, user_id).await? {
            return Err(LibraryError::NotFound(path_id.to_string()));
        }

        info!("Deleted library entry {} for user {}", id, user_id);
        Ok(())
    }

    pub fn store(&self) -> &Arc<dyn LibraryStore> {
        &self.store
    }
}
