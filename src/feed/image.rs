//! Best-effort image resolution for a feed entry.
//!
//! Structured Media RSS fields are trusted over scraping the description
//! markup. Scanning never fails: unparsable HTML just means "no image".

use std::sync::LazyLock;

use scraper::{Html, Selector};

use super::parser::RawEntry;

static IMG_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("img").expect("valid img selector"));

/// Resolve a single image URL for `entry`.
///
/// Order, first match wins:
/// 1. first `media:content` URL
/// 2. first `media:thumbnail` URL
/// 3. `src` of the first `<img>` element in the description markup
pub fn extract_image(entry: &RawEntry) -> Option<String> {
    if let Some(url) = entry.media_content.first() {
        return Some(url.clone());
    }
    if let Some(url) = entry.media_thumbnail.first() {
        return Some(url.clone());
    }

    first_img_src(entry.description.as_deref().unwrap_or(""))
}

/// Returns the `src` of the first `<img>` element. An `<img>` without `src`
/// ends the search; later elements are not consulted.
fn first_img_src(html: &str) -> Option<String> {
    if html.is_empty() {
        return None;
    }
    let fragment = Html::parse_fragment(html);
    let img = fragment.select(&IMG_SELECTOR).next()?;
    img.value().attr("src").map(str::to_string)
}
