use anyhow::Result;
use feed_rs::model::{Entry, Link, MediaContent};
use feed_rs::parser;

/// A feed item as the source published it, before defaults are applied.
///
/// Every field is optional: feeds in the wild omit titles, links and
/// descriptions freely. Media URLs are kept in document order so the image
/// extractor can take the first one.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawEntry {
    pub title: Option<String>,
    pub link: Option<String>,
    pub description: Option<String>,
    /// URLs from `media:content`. Enclosures typed as audio or documents are
    /// left out, so a podcast episode never stands in for a picture.
    pub media_content: Vec<String>,
    /// URLs from `media:thumbnail`
    pub media_thumbnail: Vec<String>,
}

/// Parse RSS/Atom/JSON feed bytes into raw entries.
///
/// An empty channel yields an empty `Vec`, not an error.
pub fn parse_feed(bytes: &[u8]) -> Result<Vec<RawEntry>> {
    let feed = parser::parse(bytes)?;
    Ok(feed.entries.into_iter().map(into_raw_entry).collect())
}

fn into_raw_entry(entry: Entry) -> RawEntry {
    let link = preferred_link(&entry.links).map(|l| l.href.clone());

    let description = entry
        .summary
        .map(|s| s.content)
        .or_else(|| entry.content.and_then(|c| c.body));

    let mut media_content = Vec::new();
    let mut media_thumbnail = Vec::new();
    for media in entry.media {
        media_content.extend(
            media
                .content
                .into_iter()
                .filter(is_visual_media)
                .filter_map(|c| c.url)
                .map(|u| u.to_string()),
        );
        media_thumbnail.extend(media.thumbnails.into_iter().map(|t| t.image.uri));
    }

    RawEntry {
        title: entry.title.map(|t| t.content),
        link,
        description,
        media_content,
        media_thumbnail,
    }
}

/// Untyped media is kept; typed media must be an image or a video.
fn is_visual_media(content: &MediaContent) -> bool {
    content.content_type.as_ref().is_none_or(|mime| {
        let top_level = mime.as_str().split('/').next().unwrap_or_default();
        top_level.eq_ignore_ascii_case("image") || top_level.eq_ignore_ascii_case("video")
    })
}

/// Atom entries can carry several links; the `alternate` one is the article.
fn preferred_link(links: &[Link]) -> Option<&Link> {
    links
        .iter()
        .find(|l| l.rel.as_deref() == Some("alternate"))
        .or_else(|| links.first())
}
