use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::traits::Notify;
use crate::types::FeedItem;

/// Consumes the merged item stream and hands each item to the sink.
///
/// Items are processed one at a time; a failed notification is logged
/// and the next item proceeds. The loop ends when the merged channel
/// closes, i.e. when every poller has finished.
pub struct Dispatcher {
    sink: Arc<dyn Notify>,
}

impl Dispatcher {
    pub fn new(sink: Arc<dyn Notify>) -> Self {
        Self { sink }
    }

    pub async fn run(self, mut items: mpsc::UnboundedReceiver<FeedItem>) {
        while let Some(item) = items.recv().await {
            debug!("Dispatching item: {}", item);
            if let Err(e) = self.sink.notify(&item).await {
                warn!("Failed to send notification: {}", e);
            }
        }
    }
}
