//! Recurring ingestion: fetch every configured feed, normalize, dedup, store.
//!
//! One background task owns the cycle; snapshot readers go straight to the
//! store and never share in-memory state with it.

mod scheduler;

pub use scheduler::{prepare_entry, CycleReport, IngestHandle, Scheduler};
