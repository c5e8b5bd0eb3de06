use std::sync::Arc;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::dispatcher::Dispatcher;
use crate::merger::merge;
use crate::poller::Poller;
use crate::traits::Notify;

/// Wires pollers, merger, and dispatcher together and owns the
/// lifecycle of the whole run.
pub struct NotificationPipeline {
    pollers: Vec<Poller>,
    sink: Arc<dyn Notify>,
}

impl NotificationPipeline {
    pub fn new(sink: Arc<dyn Notify>) -> Self {
        Self {
            pollers: Vec::new(),
            sink,
        }
    }

    pub fn add_poller(&mut self, poller: Poller) {
        debug!("Adding poller for feed: {}", poller.feed_id());
        self.pollers.push(poller);
    }

    /// Runs until the cancellation token fires and the pipeline drains.
    ///
    /// One task per poller, a merge of their outputs, and the dispatcher
    /// loop on the merged stream. On cancellation each poller stops
    /// after its in-flight cycle, its channel closes, the merged stream
    /// closes once all inputs are drained, and the dispatcher exits
    /// after delivering everything still in flight. No new fetch starts
    /// after the signal; no item observed before it is dropped.
    pub async fn run(self, cancel: CancellationToken) {
        info!("Starting pipeline with {} feeds", self.pollers.len());

        let mut handles = Vec::with_capacity(self.pollers.len());
        let mut outputs = Vec::with_capacity(self.pollers.len());
        for poller in self.pollers {
            let (tx, rx) = mpsc::unbounded_channel();
            outputs.push(rx);
            handles.push(tokio::spawn(poller.run(tx, cancel.clone())));
        }

        let merged = merge(outputs);
        Dispatcher::new(self.sink).run(merged).await;

        // The dispatcher only returns once the merged stream closed, so
        // every poller is already on its way out.
        for handle in handles {
            let _ = handle.await;
        }
        info!("Pipeline drained");
    }
}
