//! Scheduled RSS/Atom ingestion into a deduplicated SQLite entry store.
//!
//! - [`feed`] - fetch, parse, image extraction, normalization
//! - [`storage`] - append-only entry table keyed on `(title, link)`
//! - [`ingest`] - the self-rescheduling poll loop
//! - [`read_model`] - recency-ordered snapshots for the presentation layer
//! - [`config`] - optional TOML configuration

pub mod config;
pub mod feed;
pub mod ingest;
pub mod read_model;
pub mod storage;
