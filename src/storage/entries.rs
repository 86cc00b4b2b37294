use super::schema::Database;
use super::types::{Entry, EntryDbRow, NewEntry, StorageError};

impl Database {
    // ========================================================================
    // Dedup
    // ========================================================================

    /// Whether an entry with exactly this `(title, link)` identity was ever stored.
    pub async fn exists(&self, title: &str, link: &str) -> Result<bool, StorageError> {
        let row: Option<(i64,)> =
            sqlx::query_as("SELECT 1 FROM feed_entries WHERE title = ? AND link = ? LIMIT 1")
                .bind(title)
                .bind(link)
                .fetch_optional(&self.pool)
                .await?;

        Ok(row.is_some())
    }

    // ========================================================================
    // Append
    // ========================================================================

    /// Append an entry, stamping its id and insertion time.
    ///
    /// Returns `Some(id)` for a new row and `None` when the `(title, link)`
    /// identity is already present. Existing rows are never overwritten.
    /// The insert is a single statement, so readers see the whole row or
    /// nothing.
    pub async fn insert(&self, entry: &NewEntry) -> Result<Option<i64>, StorageError> {
        let now = chrono::Utc::now().timestamp_millis();

        let row: Option<(i64,)> = sqlx::query_as(
            r#"
            INSERT OR IGNORE INTO feed_entries (title, link, description, image, ingested_at)
            VALUES (?, ?, ?, ?, ?)
            RETURNING id
        "#,
        )
        .bind(&entry.title)
        .bind(&entry.link)
        .bind(&entry.description)
        .bind(&entry.image)
        .bind(now)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|(id,)| id))
    }

    // ========================================================================
    // Snapshot
    // ========================================================================

    /// Every stored entry, newest first; ties on timestamp go to the higher id.
    pub async fn list_all_ordered_by_recency(&self) -> Result<Vec<Entry>, StorageError> {
        let rows = sqlx::query_as::<_, EntryDbRow>(
            r#"
            SELECT id, title, link, description, image, ingested_at
            FROM feed_entries
            ORDER BY ingested_at DESC, id DESC
        "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(EntryDbRow::into_entry).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    async fn test_db() -> Database {
        Database::open(":memory:").await.unwrap()
    }

    fn new_entry(title: &str, link: &str) -> NewEntry {
        NewEntry {
            title: title.to_string(),
            link: link.to_string(),
            description: format!("About {title}"),
            image: None,
        }
    }

    #[tokio::test]
    async fn test_insert_then_exists() {
        let db = test_db().await;
        assert!(!db.exists("A", "L1").await.unwrap());

        let id = db.insert(&new_entry("A", "L1")).await.unwrap();
        assert!(id.is_some());
        assert!(db.exists("A", "L1").await.unwrap());
    }

    #[tokio::test]
    async fn test_exists_matches_full_identity() {
        let db = test_db().await;
        db.insert(&new_entry("A", "L1")).await.unwrap();

        assert!(!db.exists("A", "L2").await.unwrap());
        assert!(!db.exists("B", "L1").await.unwrap());
        assert!(!db.exists("a", "L1").await.unwrap());
    }

    #[tokio::test]
    async fn test_duplicate_insert_is_ignored() {
        let db = test_db().await;
        let first = db.insert(&new_entry("A", "L1")).await.unwrap();

        let mut changed = new_entry("A", "L1");
        changed.description = "Different body".to_string();
        changed.image = Some("https://example.com/new.jpg".to_string());
        let second = db.insert(&changed).await.unwrap();

        assert!(first.is_some());
        assert_eq!(second, None);

        let entries = db.list_all_ordered_by_recency().await.unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].description, "About A");
        assert_eq!(entries[0].image, None);
    }

    #[tokio::test]
    async fn test_ids_increase() {
        let db = test_db().await;
        let a = db.insert(&new_entry("A", "L1")).await.unwrap().unwrap();
        let b = db.insert(&new_entry("B", "L2")).await.unwrap().unwrap();
        let c = db.insert(&new_entry("C", "L3")).await.unwrap().unwrap();
        assert!(a < b && b < c);
    }

    #[tokio::test]
    async fn test_list_newest_first_with_id_tiebreak() {
        let db = test_db().await;
        for i in 0..5 {
            db.insert(&new_entry(&format!("T{i}"), &format!("L{i}")))
                .await
                .unwrap();
        }

        let entries = db.list_all_ordered_by_recency().await.unwrap();
        assert_eq!(entries.len(), 5);
        for pair in entries.windows(2) {
            assert!(pair[0].ingested_at >= pair[1].ingested_at);
            if pair[0].ingested_at == pair[1].ingested_at {
                assert!(pair[0].id > pair[1].id);
            }
        }
        assert_eq!(entries[0].title, "T4");
        assert_eq!(entries[4].title, "T0");
    }

    #[tokio::test]
    async fn test_fields_round_trip() {
        let db = test_db().await;
        let entry = NewEntry {
            title: "Title".to_string(),
            link: "https://example.com/a".to_string(),
            description: "<p>Body</p>".to_string(),
            image: Some("https://example.com/a.jpg".to_string()),
        };
        let id = db.insert(&entry).await.unwrap().unwrap();

        let stored = db.list_all_ordered_by_recency().await.unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].id, id);
        assert_eq!(stored[0].title, entry.title);
        assert_eq!(stored[0].link, entry.link);
        assert_eq!(stored[0].description, entry.description);
        assert_eq!(stored[0].image, entry.image);
    }

    #[tokio::test]
    async fn test_empty_store_lists_nothing() {
        let db = test_db().await;
        assert!(db.list_all_ordered_by_recency().await.unwrap().is_empty());
    }
}
