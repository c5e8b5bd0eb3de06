use std::collections::BTreeSet;
use std::sync::Arc;

use async_trait::async_trait;
use futures::future::join_all;
use tokio::sync::{RwLock, Semaphore};
use tracing::{info, warn};

use crate::traits::{Notify, SubscriberStore, Transport};
use crate::types::{FeedItem, Result};

/// Maximum number of concurrent outbound deliveries per item.
const CONCURRENCY_LEVEL: usize = 10;

/// Prints every incoming item. A sink for debugging and dry runs.
pub struct LogNotifier;

impl LogNotifier {
    pub fn new() -> Self {
        Self
    }
}

impl Default for LogNotifier {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Notify for LogNotifier {
    async fn notify(&self, item: &FeedItem) -> Result<()> {
        info!("New item: {}", item);
        Ok(())
    }
}

/// Delivers each item to every subscriber over a [`Transport`].
///
/// The subscriber set is owned by the sink: the dispatcher reads a
/// snapshot of it during fan-out while `subscribe`/`unsubscribe` (the
/// hook for a separate command-handling surface) mutate it. Deliveries
/// for one item run concurrently, capped at [`CONCURRENCY_LEVEL`], and
/// the sink waits for every attempt before reporting the item done. A
/// failed delivery to one recipient is logged and never blocks the
/// others.
pub struct BroadcastNotifier<T: Transport> {
    transport: Arc<T>,
    subscribers: RwLock<BTreeSet<String>>,
    store: Arc<dyn SubscriberStore>,
    permits: Arc<Semaphore>,
}

impl<T: Transport + 'static> BroadcastNotifier<T> {
    /// Creates the sink, restoring the subscriber set from the store.
    pub async fn new(transport: Arc<T>, store: Arc<dyn SubscriberStore>) -> Result<Self> {
        let subscribers: BTreeSet<String> = store.subscribers().await?.into_iter().collect();
        info!("Currently connected subscribers: {}", subscribers.len());
        Ok(Self {
            transport,
            subscribers: RwLock::new(subscribers),
            store,
            permits: Arc::new(Semaphore::new(CONCURRENCY_LEVEL)),
        })
    }

    /// Adds a subscriber and persists the set. Returns false if it was
    /// already present.
    pub async fn subscribe(&self, id: &str) -> Result<bool> {
        let mut subscribers = self.subscribers.write().await;
        if !subscribers.insert(id.to_string()) {
            return Ok(false);
        }
        let snapshot: Vec<String> = subscribers.iter().cloned().collect();
        self.store.save_subscribers(&snapshot).await?;
        info!("Subscribed: {}", id);
        Ok(true)
    }

    /// Removes a subscriber and persists the set. Returns false if it
    /// was not present.
    pub async fn unsubscribe(&self, id: &str) -> Result<bool> {
        let mut subscribers = self.subscribers.write().await;
        if !subscribers.remove(id) {
            return Ok(false);
        }
        let snapshot: Vec<String> = subscribers.iter().cloned().collect();
        self.store.save_subscribers(&snapshot).await?;
        info!("Unsubscribed: {}", id);
        Ok(true)
    }

    pub async fn subscriber_count(&self) -> usize {
        self.subscribers.read().await.len()
    }
}

#[async_trait]
impl<T: Transport + 'static> Notify for BroadcastNotifier<T> {
    async fn notify(&self, item: &FeedItem) -> Result<()> {
        let recipients: Vec<String> = self.subscribers.read().await.iter().cloned().collect();

        let mut deliveries = Vec::with_capacity(recipients.len());
        for recipient in recipients {
            // Acquiring before spawning caps the number of outstanding
            // transport calls at CONCURRENCY_LEVEL.
            let permit = match self.permits.clone().acquire_owned().await {
                Ok(permit) => permit,
                Err(_) => break, // semaphore closed, shutting down
            };
            let transport = Arc::clone(&self.transport);
            let item = item.clone();
            deliveries.push(tokio::spawn(async move {
                let _permit = permit;
                if let Err(e) = transport.deliver(&recipient, &item).await {
                    warn!("Failed to deliver to {}: {}", recipient, e);
                }
            }));
        }

        // Every recipient gets its attempt before the item counts as
        // handled; individual failures were already logged above.
        join_all(deliveries).await;
        Ok(())
    }
}
