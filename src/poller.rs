use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::sync::mpsc;
use tokio::time::{self, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::traits::{FetchItems, WatermarkStore};
use crate::types::FeedItem;

/// Owns one feed's timed fetch-filter-advance cycle.
///
/// Each poller is the only task that reads or writes its feed's
/// watermark, so the read-filter-save sequence never races another
/// writer. Fetch, watermark-read, and watermark-write failures are all
/// logged and retried on the next tick; none of them stops the loop.
pub struct Poller {
    feed_id: String,
    source: Arc<dyn FetchItems>,
    store: Arc<dyn WatermarkStore>,
    interval: Duration,
}

impl Poller {
    pub fn new(
        source: Arc<dyn FetchItems>,
        store: Arc<dyn WatermarkStore>,
        interval: Duration,
    ) -> Self {
        Self {
            feed_id: source.source_id().to_string(),
            source,
            store,
            interval,
        }
    }

    pub fn feed_id(&self) -> &str {
        &self.feed_id
    }

    /// Runs the poll loop until cancelled.
    ///
    /// The first fetch happens immediately; after that the loop wakes on
    /// a fixed interval. Cancellation is checked between cycles, so an
    /// in-flight cycle always completes before the loop exits and the
    /// output channel closes.
    pub async fn run(self, out: mpsc::UnboundedSender<FeedItem>, cancel: CancellationToken) {
        let mut ticker = time::interval(self.interval);
        // A slow fetch must not be followed by a burst of catch-up ticks.
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                _ = ticker.tick() => self.poll_once(&out).await,
                _ = cancel.cancelled() => {
                    debug!("Poller for {} stopping", self.feed_id);
                    return;
                }
            }
        }
    }

    async fn poll_once(&self, out: &mpsc::UnboundedSender<FeedItem>) {
        let last = match self.store.last_update(&self.feed_id).await {
            Ok(last) => last,
            Err(e) => {
                warn!("Failed to get last update time for {}: {}", self.feed_id, e);
                return;
            }
        };

        // First observation of this feed: stamp the watermark and emit
        // nothing, so subscribers are not flooded with the feed's entire
        // history. The fetch is skipped; a failed save leaves the feed
        // unobserved and this cycle repeats on the next tick.
        let Some(last) = last else {
            if let Err(e) = self.store.save_last_update(&self.feed_id, Utc::now()).await {
                warn!("Failed to save last update time for {}: {}", self.feed_id, e);
            }
            return;
        };

        let items = match self.source.fetch().await {
            Ok(items) => items,
            Err(e) => {
                warn!("Failed to fetch items [{}]: {}", self.feed_id, e);
                return;
            }
        };

        // The batch carries no ordering guarantee, so every item is
        // checked against the watermark. Strictly after: an item stamped
        // exactly at the watermark has already been delivered.
        let fresh: Vec<FeedItem> = items
            .into_iter()
            .filter(|item| item.published > last)
            .collect();

        let Some(newest) = fresh.iter().map(|item| item.published).max() else {
            return;
        };

        info!("Got {} new items from {}", fresh.len(), self.feed_id);
        for item in fresh {
            if out.send(item).is_err() {
                // Downstream is gone; the pipeline is shutting down.
                return;
            }
        }

        // Advance to the newest delivered timestamp, not "now": the next
        // cycle must re-see anything published between this fetch and the
        // save. The strict-after filter already guarantees newest > last,
        // so the watermark never moves backward.
        if let Err(e) = self.store.save_last_update(&self.feed_id, newest).await {
            warn!("Failed to save last update time for {}: {}", self.feed_id, e);
        }
    }
}
