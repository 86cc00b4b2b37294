use crate::storage::NewEntry;

use super::parser::RawEntry;

pub const DEFAULT_TITLE: &str = "No title available";
pub const DEFAULT_LINK: &str = "#";
pub const DEFAULT_DESCRIPTION: &str = "No description available";

/// Map a raw entry and its resolved image into the storable shape.
///
/// Missing fields get sentinel values; present fields pass through untouched
/// (no trimming, no truncation, no HTML sanitizing).
pub fn normalize(raw: &RawEntry, image: Option<String>) -> NewEntry {
    NewEntry {
        title: raw.title.clone().unwrap_or_else(|| DEFAULT_TITLE.to_string()),
        link: raw.link.clone().unwrap_or_else(|| DEFAULT_LINK.to_string()),
        description: raw
            .description
            .clone()
            .unwrap_or_else(|| DEFAULT_DESCRIPTION.to_string()),
        image,
    }
}
