//! Feed ingestion leaves: fetching, parsing, image resolution, normalization.
//!
//! - [`fetcher`] - HTTP retrieval with a timeout and size cap, then parsing
//! - [`parser`] - `feed-rs` adapter producing [`RawEntry`] records
//! - [`image`] - best-effort image URL for an entry
//! - [`normalize`] - defaults for missing fields
//!
//! The poll scheduler chains them per entry:
//!
//! ```ignore
//! let raw_entries = fetch_and_parse(&client, url, &limits).await?;
//! for raw in &raw_entries {
//!     let entry = normalize(raw, extract_image(raw));
//! }
//! ```

mod fetcher;
mod image;
mod normalize;
mod parser;

pub use fetcher::{build_client, fetch_and_parse, FetchError, FetchLimits};
pub use image::extract_image;
pub use normalize::{normalize, DEFAULT_DESCRIPTION, DEFAULT_LINK, DEFAULT_TITLE};
pub use parser::{parse_feed, RawEntry};
