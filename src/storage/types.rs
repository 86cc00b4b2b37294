use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;

// ============================================================================
// Error Types
// ============================================================================

/// Storage errors surfaced to callers
#[derive(Debug, Error)]
pub enum StorageError {
    /// Schema creation failed at open time
    #[error("Database migration failed: {0}")]
    Migration(String),

    /// Generic database error (I/O, lock timeout, corrupt file)
    #[error("Database error: {0}")]
    Other(#[from] sqlx::Error),
}

// ============================================================================
// Data Structures
// ============================================================================

/// A normalized entry that has not been persisted yet.
///
/// `id` and `ingested_at` are assigned by the store on insert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewEntry {
    pub title: String,
    pub link: String,
    pub description: String,
    pub image: Option<String>,
}

/// A persisted entry as returned by snapshot reads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Entry {
    pub id: i64,
    pub title: String,
    pub link: String,
    pub description: String,
    pub image: Option<String>,
    /// Insertion time, millisecond precision
    pub ingested_at: DateTime<Utc>,
}

/// Internal row type for entry queries (used by sqlx FromRow)
#[derive(Debug, sqlx::FromRow)]
pub(crate) struct EntryDbRow {
    pub id: i64,
    pub title: String,
    pub link: String,
    pub description: String,
    pub image: Option<String>,
    pub ingested_at: i64,
}

impl EntryDbRow {
    pub(crate) fn into_entry(self) -> Entry {
        Entry {
            id: self.id,
            title: self.title,
            link: self.link,
            description: self.description,
            image: self.image,
            ingested_at: DateTime::from_timestamp_millis(self.ingested_at).unwrap_or_default(),
        }
    }
}
