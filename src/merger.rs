use futures::stream::StreamExt;
use tokio::sync::mpsc;
use tokio_stream::wrappers::UnboundedReceiverStream;

use crate::types::FeedItem;

/// Combines every poller's output stream into a single stream.
///
/// One relay task per input forwards items onto a shared channel. Each
/// relay holds a clone of the shared sender, so the merged channel
/// closes exactly when every input stream has closed and been drained —
/// nothing is lost or duplicated in the transition, and no input's
/// relay waits on another's backlog.
pub fn merge(inputs: Vec<mpsc::UnboundedReceiver<FeedItem>>) -> mpsc::UnboundedReceiver<FeedItem> {
    let (tx, rx) = mpsc::unbounded_channel();

    for input in inputs {
        let tx = tx.clone();
        tokio::spawn(async move {
            let mut input = UnboundedReceiverStream::new(input);
            while let Some(item) = input.next().await {
                if tx.send(item).is_err() {
                    // Receiver dropped; no one is listening anymore.
                    break;
                }
            }
        });
    }

    rx
}
