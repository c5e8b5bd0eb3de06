use chrono::{DateTime, Utc};
use feed_rs::model::Entry;
use feed_rs::parser;
use tracing::debug;

use crate::types::{FeedItem, NotifierError, Result};

/// Turns raw RSS/Atom documents into normalized [`FeedItem`]s.
pub struct FeedParser;

impl FeedParser {
    pub fn new() -> Self {
        Self
    }

    pub fn parse(&self, content: &[u8]) -> Result<Vec<FeedItem>> {
        let feed = parser::parse(content)
            .map_err(|e| NotifierError::Parse(format!("failed to parse feed: {}", e)))?;

        let mut items = Vec::with_capacity(feed.entries.len());
        for entry in feed.entries {
            if let Some(item) = self.parse_entry(entry) {
                items.push(item);
            }
        }
        Ok(items)
    }

    fn parse_entry(&self, entry: Entry) -> Option<FeedItem> {
        // An entry without any timestamp cannot be compared against the
        // watermark, so it never reaches subscribers.
        let published = match entry_timestamp(&entry) {
            Some(t) => t,
            None => {
                debug!("Skipping entry without timestamp: {}", entry.id);
                return None;
            }
        };

        let media = extract_media(&entry);
        let title = entry.title.map(|t| t.content);
        let link = entry.links.first().map(|l| l.href.clone());

        Some(FeedItem {
            published,
            title,
            link,
            media,
        })
    }
}

impl Default for FeedParser {
    fn default() -> Self {
        Self::new()
    }
}

// The update timestamp takes precedence: an edited entry counts as newer
// than its original publication.
fn entry_timestamp(entry: &Entry) -> Option<DateTime<Utc>> {
    entry.updated.or(entry.published)
}

fn extract_media(entry: &Entry) -> Option<String> {
    for media in &entry.media {
        if let Some(url) = media.content.iter().find_map(|c| c.url.as_ref()) {
            return Some(url.to_string());
        }
        if let Some(thumbnail) = media.thumbnails.first() {
            return Some(thumbnail.image.uri.clone());
        }
    }
    None
}
