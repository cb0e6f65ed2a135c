//! Change feed — surfaces message additions as an ordered event stream.
//!
//! The watcher polls the store by `seq` cursor and pushes every new row
//! through an unbounded channel. The cursor starts at zero, so a fresh
//! subscription first replays every existing document as an addition; the
//! orchestrator's `processed` flag is what prevents re-handling after a
//! restart. Dropping the stream ends the subscription.

use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use futures::Stream;
use tokio_stream::wrappers::UnboundedReceiverStream;
use tracing::{debug, info, warn};

use crate::store::traits::{Message, MessageStore};

/// An event observed on the message collection.
///
/// Only additions exist today; the store never deletes and the one
/// mutation (the processed flag) is applied by the consumer itself.
#[derive(Debug, Clone)]
pub enum ChangeEvent {
    Added(Message),
}

/// Stream of change events, ordered by insert position.
pub type ChangeStream = Pin<Box<dyn Stream<Item = ChangeEvent> + Send>>;

/// Poll-based subscription over the message collection.
pub struct MessageWatcher {
    store: Arc<dyn MessageStore>,
    poll_interval: Duration,
}

impl MessageWatcher {
    pub fn new(store: Arc<dyn MessageStore>, poll_interval: Duration) -> Self {
        Self {
            store,
            poll_interval,
        }
    }

    /// Open the subscription and return its event stream.
    ///
    /// The backing task exits when the stream is dropped.
    pub fn start(&self) -> ChangeStream {
        let (tx, rx) = tokio::sync::mpsc::unbounded_channel();
        let store = Arc::clone(&self.store);
        let interval = self.poll_interval;

        tokio::spawn(async move {
            let mut cursor: i64 = 0;
            info!("Change feed opened");

            loop {
                match store.added_after(cursor).await {
                    Ok(entries) => {
                        if entries.is_empty() {
                            tokio::time::sleep(interval).await;
                            continue;
                        }
                        for entry in entries {
                            cursor = entry.seq;
                            if tx.send(ChangeEvent::Added(entry.message)).is_err() {
                                debug!("Change feed subscriber dropped; closing");
                                return;
                            }
                        }
                    }
                    Err(e) => {
                        warn!(error = %e, "Change feed poll failed");
                        tokio::time::sleep(interval).await;
                    }
                }
            }
        });

        Box::pin(UnboundedReceiverStream::new(rx))
    }
}

// ── Tests ───────────────────────────────────────────────────────────
