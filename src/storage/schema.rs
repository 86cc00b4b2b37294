use sqlx::{
    sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions},
    SqlitePool,
};
use std::str::FromStr;
use std::time::Duration;

use super::types::StorageError;

// ============================================================================
// Database
// ============================================================================

/// Handle to the entry store. Cheap to clone; all clones share one pool.
#[derive(Clone)]
pub struct Database {
    pub(crate) pool: SqlitePool,
}

impl Database {
    /// Open (creating if absent) the database and ensure the schema exists.
    ///
    /// `":memory:"` gives a private in-memory store shared by the pool's
    /// connections, which is what the tests use.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Other` if the file cannot be opened and
    /// `StorageError::Migration` if schema creation fails.
    pub async fn open(path: &str) -> Result<Self, StorageError> {
        let url = format!("sqlite:{}?mode=rwc", path);

        // busy_timeout=5000: writers wait up to 5 seconds for the lock instead of
        // failing with SQLITE_BUSY while a snapshot read is in flight.
        let mut options = SqliteConnectOptions::from_str(&url)?.pragma("busy_timeout", "5000");
        if path != ":memory:" {
            // WAL lets snapshot readers proceed while the ingestion cycle writes
            options = options.journal_mode(SqliteJournalMode::Wal);
        }

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .acquire_timeout(Duration::from_secs(10))
            .connect_with(options)
            .await?;
        let db = Self { pool };
        db.migrate()
            .await
            .map_err(|e| StorageError::Migration(e.to_string()))?;
        tracing::debug!(path = %path, "Entry store ready");
        Ok(db)
    }

    /// Idempotent "create if absent" schema setup, run inside one transaction.
    async fn migrate(&self) -> Result<(), sqlx::Error> {
        let mut tx = self.pool.begin().await?;

        // AUTOINCREMENT keeps ids strictly increasing; UNIQUE(title, link) makes
        // the dedup identity hold even if two writers race.
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS feed_entries (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                title TEXT NOT NULL,
                link TEXT NOT NULL,
                description TEXT NOT NULL,
                image TEXT,
                ingested_at INTEGER NOT NULL,
                UNIQUE(title, link)
            )
        "#,
        )
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_feed_entries_recent ON feed_entries(ingested_at DESC, id DESC)",
        )
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(())
    }
}
