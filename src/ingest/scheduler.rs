use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::config::Config;
use crate::feed::{extract_image, fetch_and_parse, normalize, FetchError, FetchLimits, RawEntry};
use crate::storage::{Database, NewEntry};

/// Counters for one pass over the configured feed sources.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CycleReport {
    /// Feed sources attempted (always every configured source)
    pub feeds_attempted: usize,
    /// Feed sources whose fetch or parse failed
    pub feeds_failed: usize,
    /// Raw entries returned by successful sources
    pub entries_seen: usize,
    /// New rows written to the store
    pub inserted: usize,
    /// Candidates discarded because their identity was already stored
    pub duplicates: usize,
    /// Candidates skipped because the store returned an error
    pub storage_errors: usize,
}

/// Turn one raw feed item into a storable candidate.
pub fn prepare_entry(raw: &RawEntry) -> NewEntry {
    normalize(raw, extract_image(raw))
}

/// Drives recurring ingestion cycles over a fixed list of feed sources.
///
/// The next cycle is scheduled only after the current one has finished, so a
/// slow feed stretches the period instead of stacking cycles on top of each
/// other.
pub struct Scheduler {
    db: Database,
    client: reqwest::Client,
    feeds: Vec<String>,
    interval: Duration,
    limits: FetchLimits,
}

impl Scheduler {
    pub fn new(
        db: Database,
        client: reqwest::Client,
        feeds: Vec<String>,
        interval: Duration,
        limits: FetchLimits,
    ) -> Self {
        Self {
            db,
            client,
            feeds,
            interval,
            limits,
        }
    }

    pub fn from_config(db: Database, client: reqwest::Client, config: &Config) -> Self {
        Self::new(
            db,
            client,
            config.feed_urls(),
            config.poll_interval(),
            config.fetch_limits(),
        )
    }

    /// Run one full cycle: every feed source is attempted once, in order.
    ///
    /// Never fails. A source that cannot be fetched or parsed is logged and
    /// counted; the cycle moves on to the next source.
    pub async fn run_cycle(&self) -> CycleReport {
        let mut report = CycleReport::default();
        tracing::info!(feeds = self.feeds.len(), "Starting ingestion cycle");

        for url in &self.feeds {
            report.feeds_attempted += 1;
            if let Err(e) = self.ingest_feed(url, &mut report).await {
                report.feeds_failed += 1;
                tracing::warn!(feed = %url, error = %e, "Feed fetch failed, skipping until next cycle");
            }
        }

        tracing::info!(
            attempted = report.feeds_attempted,
            failed = report.feeds_failed,
            seen = report.entries_seen,
            inserted = report.inserted,
            duplicates = report.duplicates,
            storage_errors = report.storage_errors,
            "Ingestion cycle complete"
        );
        report
    }

    async fn ingest_feed(&self, url: &str, report: &mut CycleReport) -> Result<(), FetchError> {
        let raw_entries = fetch_and_parse(&self.client, url, &self.limits).await?;
        tracing::debug!(feed = %url, entries = raw_entries.len(), "Fetched feed");
        report.entries_seen += raw_entries.len();

        for raw in &raw_entries {
            self.store_candidate(prepare_entry(raw), report).await;
        }
        Ok(())
    }

    /// Check-then-insert for one candidate. Storage errors skip the entry only.
    async fn store_candidate(&self, entry: NewEntry, report: &mut CycleReport) {
        match self.db.exists(&entry.title, &entry.link).await {
            Ok(true) => report.duplicates += 1,
            Ok(false) => match self.db.insert(&entry).await {
                Ok(Some(id)) => {
                    report.inserted += 1;
                    tracing::trace!(id = id, title = %entry.title, "Stored entry");
                }
                // Lost a race with another writer; the unique constraint kept one row
                Ok(None) => report.duplicates += 1,
                Err(e) => {
                    report.storage_errors += 1;
                    tracing::warn!(link = %entry.link, error = %e, "Failed to store entry, skipping");
                }
            },
            Err(e) => {
                report.storage_errors += 1;
                tracing::warn!(link = %entry.link, error = %e, "Dedup check failed, skipping entry");
            }
        }
    }

    /// Cycle until `shutdown` carries `true`. The first cycle starts at once.
    ///
    /// If every sender is dropped the loop keeps running for the life of the
    /// process.
    pub async fn run(self, mut shutdown: watch::Receiver<bool>) {
        tracing::info!(
            feeds = self.feeds.len(),
            interval_secs = self.interval.as_secs_f64(),
            "Ingestion scheduler started"
        );

        loop {
            if *shutdown.borrow_and_update() {
                break;
            }
            self.run_cycle().await;
            if self.idle(&mut shutdown).await {
                break;
            }
        }

        tracing::info!("Ingestion scheduler stopped");
    }

    /// Wait out the interval after a cycle. Returns `true` if asked to stop.
    async fn idle(&self, shutdown: &mut watch::Receiver<bool>) -> bool {
        let sleep = tokio::time::sleep(self.interval);
        tokio::pin!(sleep);

        loop {
            tokio::select! {
                () = &mut sleep => return false,
                changed = shutdown.changed() => match changed {
                    Ok(()) if *shutdown.borrow_and_update() => return true,
                    Ok(()) => continue,
                    Err(_) => {
                        // Handle dropped: nobody can ask us to stop any more
                        (&mut sleep).await;
                        return false;
                    }
                },
            }
        }
    }

    /// Start the scheduler as a background task.
    pub fn spawn(self) -> IngestHandle {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let task = tokio::spawn(self.run(shutdown_rx));
        IngestHandle { shutdown_tx, task }
    }
}

/// Handle to a spawned [`Scheduler`].
///
/// Dropping the handle detaches the task, which then runs until the process
/// exits.
pub struct IngestHandle {
    shutdown_tx: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl IngestHandle {
    /// Stop after the in-flight cycle (if any) and wait for the task to end.
    pub async fn shutdown(self) {
        let _ = self.shutdown_tx.send(true);
        if let Err(e) = self.task.await {
            tracing::warn!(error = %e, "Ingestion task ended abnormally");
        }
    }
}
