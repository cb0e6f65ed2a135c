//! Change listener — tails the message feed and spawns one task per
//! addition.
//!
//! Tasks run independently: no cross-message ordering, no mutual
//! exclusion, no backpressure. The processor's own error boundary keeps a
//! failing task from touching anything but its own message.

use std::sync::Arc;
use std::time::Duration;

use futures::StreamExt;
use tracing::info;

use crate::pipeline::processor::MessageProcessor;
use crate::store::traits::MessageStore;
use crate::store::watcher::{ChangeEvent, MessageWatcher};

/// Consumes the change feed for the lifetime of the process.
pub struct ChangeListener {
    watcher: MessageWatcher,
    processor: Arc<MessageProcessor>,
}

impl ChangeListener {
    pub fn new(
        store: Arc<dyn MessageStore>,
        processor: Arc<MessageProcessor>,
        poll_interval: Duration,
    ) -> Self {
        Self {
            watcher: MessageWatcher::new(store, poll_interval),
            processor,
        }
    }

    /// Run until the feed closes.
    pub async fn run(&self) {
        let mut feed = self.watcher.start();
        info!("Listening for new messages");

        while let Some(ChangeEvent::Added(message)) = feed.next().await {
            let processor = Arc::clone(&self.processor);
            tokio::spawn(async move {
                processor.handle(&message).await;
            });
        }

        info!("Change feed closed; listener exiting");
    }
}

// ── Tests ───────────────────────────────────────────────────────────
