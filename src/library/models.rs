use chrono::{DateTime, NaiveDate};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::validation::{first_missing, optional_string_field, string_field, ValidationError};

pub const REQUIRED_FIELDS: [&str; 3] = ["title", "author", "dateFinished"];

/// Domain model representing a library entry in the database
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct LibraryEntry {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub author: String,
    pub date_finished: NaiveDate,
    pub comments: Option<String>,
}

/// Public serialization of an entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LibraryEntryResponse {
    pub id: Uuid,
    pub user_id: Uuid,
    #[schema(example = "Dune")]
    pub title: String,
    #[schema(example = "Frank Herbert")]
    pub author: String,
    #[schema(value_type = String, format = Date, example = "2020-01-01")]
    pub date_finished: NaiveDate,
    pub comments: Option<String>,
}

impl From<LibraryEntry> for LibraryEntryResponse {
    fn from(entry: LibraryEntry) -> Self {
        Self {
            id: entry.id,
            user_id: entry.user_id,
            title: entry.title,
            author: entry.author,
            date_finished: entry.date_finished,
            comments: entry.comments,
        }
    }
}

/// Request body for adding an entry (OpenAPI schema; `userId` is ignored)
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateEntryRequest {
    #[schema(example = "Dune")]
    pub title: String,
    #[schema(example = "Frank Herbert")]
    pub author: String,
    #[schema(value_type = String, format = Date, example = "2020-01-01")]
    pub date_finished: NaiveDate,
    pub comments: Option<String>,
}

/// Request body for a partial update (OpenAPI schema)
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateEntryRequest {
    pub id: Uuid,
    pub title: Option<String>,
    pub author: Option<String>,
    #[schema(value_type = Option<String>, format = Date, example = "2020-01-01")]
    pub date_finished: Option<NaiveDate>,
    pub comments: Option<String>,
}

/// A validated add payload; the owner comes from the caller's identity
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewEntry {
    pub title: String,
    pub author: String,
    pub date_finished: NaiveDate,
    pub comments: Option<String>,
}

impl NewEntry {
    /// Validate a raw add payload: presence first, then types
    pub fn from_json(body: &Value) -> Result<Self, ValidationError> {
        if let Some(location) = first_missing(body, &REQUIRED_FIELDS) {
            return Err(ValidationError::MissingField { location });
        }

        Ok(Self {
            title: required_text(body, "title")?,
            author: required_text(body, "author")?,
            date_finished: date_field(body, "dateFinished")?,
            comments: optional_string_field(body, "comments")?.map(str::to_string),
        })
    }
}

/// Fields supplied in an update; `None` leaves the stored value alone
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EntryChanges {
    pub title: Option<String>,
    pub author: Option<String>,
    pub date_finished: Option<NaiveDate>,
    /// `Some(None)` clears the comments
    pub comments: Option<Option<String>>,
}

impl EntryChanges {
    /// Read the updatable fields from a raw update payload
    ///
    /// Anything else in the body (including `userId`) is ignored.
    pub fn from_json(body: &Value) -> Result<Self, ValidationError> {
        let present = |field: &str| body.get(field).is_some();

        Ok(Self {
            title: present("title")
                .then(|| required_text(body, "title"))
                .transpose()?,
            author: present("author")
                .then(|| required_text(body, "author"))
                .transpose()?,
            date_finished: present("dateFinished")
                .then(|| date_field(body, "dateFinished"))
                .transpose()?,
            comments: present("comments")
                .then(|| optional_string_field(body, "comments"))
                .transpose()?
                .map(|comments| comments.map(str::to_string)),
        })
    }

    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.author.is_none()
            && self.date_finished.is_none()
            && self.comments.is_none()
    }

    /// Produce the entry as it looks after the changes; id and owner never move
    pub fn apply_to(self, entry: LibraryEntry) -> LibraryEntry {
        LibraryEntry {
            id: entry.id,
            user_id: entry.user_id,
            title: self.title.unwrap_or(entry.title),
            author: self.author.unwrap_or(entry.author),
            date_finished: self.date_finished.unwrap_or(entry.date_finished),
            comments: self.comments.unwrap_or(entry.comments),
        }
    }
}

/// A string that must carry something other than whitespace
fn required_text(body: &Value, field: &'static str) -> Result<String, ValidationError> {
    let value = string_field(body, field)?;
    if value.trim().is_empty() {
        return Err(ValidationError::MissingField { location: field });
    }
    Ok(value.to_string())
}

/// Accept `YYYY-MM-DD` or an RFC 3339 timestamp, keeping the date part
fn date_field(body: &Value, field: &'static str) -> Result<NaiveDate, ValidationError> {
    let invalid = ValidationError::InvalidType {
        location: field,
        expected: "date",
    };
    let raw = match body.get(field) {
        Some(Value::String(raw)) => raw.trim(),
        _ => return Err(invalid),
    };

    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .or_else(|| DateTime::parse_from_rfc3339(raw).ok().map(|dt| dt.date_naive()))
        .ok_or(invalid)
}
