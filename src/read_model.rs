//! Read-only query side handed to the presentation layer.

use crate::storage::{Database, Entry, StorageError};

/// Snapshot reader over the entry store.
///
/// Holds no cache: every call reflects all entries persisted so far.
#[derive(Clone)]
pub struct ReadModel {
    db: Database,
}

impl ReadModel {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// All persisted entries, newest first.
    pub async fn snapshot(&self) -> Result<Vec<Entry>, StorageError> {
        self.db.list_all_ordered_by_recency().await
    }
}
