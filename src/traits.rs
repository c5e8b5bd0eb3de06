use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::types::{FeedItem, Result};

/// Trait for fetching the current batch of items from a remote feed.
///
/// Each call is independent; an error means "no data this cycle", never
/// corrupted state.
#[async_trait]
pub trait FetchItems: Send + Sync {
    /// Stable identifier for this source, used as the watermark key.
    fn source_id(&self) -> &str;

    /// Fetch the current batch of items from the source.
    async fn fetch(&self) -> Result<Vec<FeedItem>>;
}

/// Persistent per-feed watermarks: the publish timestamp of the last item
/// ever delivered for a feed. Safe for concurrent use across distinct
/// feed identifiers.
#[async_trait]
pub trait WatermarkStore: Send + Sync {
    /// Last delivered timestamp for the feed, `None` if never observed.
    async fn last_update(&self, feed: &str) -> Result<Option<DateTime<Utc>>>;

    async fn save_last_update(&self, feed: &str, t: DateTime<Utc>) -> Result<()>;
}

/// Trait for notifying clients about new items.
#[async_trait]
pub trait Notify: Send + Sync {
    async fn notify(&self, item: &FeedItem) -> Result<()>;
}

/// Outbound message transport for a single recipient.
///
/// This is the seam where the real wire protocol (Telegram, email, ...)
/// plugs in; the crate itself only needs "deliver item to recipient".
#[async_trait]
pub trait Transport: Send + Sync {
    async fn deliver(&self, recipient: &str, item: &FeedItem) -> Result<()>;
}

/// Persistent subscriber list for multi-recipient sinks.
#[async_trait]
pub trait SubscriberStore: Send + Sync {
    async fn subscribers(&self) -> Result<Vec<String>>;

    async fn save_subscribers(&self, ids: &[String]) -> Result<()>;
}
