//! Message store contract — the document collection the assistant watches.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::StoreError;

/// A chat message document.
///
/// Created by the user-facing front end (user messages) or by this process
/// (bot replies). The orchestrator mutates a message exactly once, to set
/// `processed` after handling. Messages are never deleted here.
#[derive(Debug, Clone)]
pub struct Message {
    pub id: String,
    /// Free-form author tag. The front end writes "user"; this process
    /// writes "bot". Anything else is skipped by the orchestrator.
    pub sender: String,
    pub text: String,
    pub created_at: DateTime<Utc>,
    pub processed: bool,
}

impl Message {
    pub const SENDER_USER: &'static str = "user";
    pub const SENDER_BOT: &'static str = "bot";

    pub fn is_from_user(&self) -> bool {
        self.sender == Self::SENDER_USER
    }
}

/// One entry in the store's ordered change feed.
///
/// `seq` is a monotonically increasing position assigned at insert time;
/// the watcher uses it as its cursor.
#[derive(Debug, Clone)]
pub struct ChangeEntry {
    pub seq: i64,
    pub message: Message,
}

/// Backend-agnostic store for the "messages" collection.
#[async_trait]
pub trait MessageStore: Send + Sync {
    /// Append a new message. Returns the generated document id.
    async fn append(&self, sender: &str, text: &str) -> Result<String, StoreError>;

    /// Fetch a message by id.
    async fn get(&self, id: &str) -> Result<Option<Message>, StoreError>;

    /// Flip the processed flag on a message.
    async fn mark_processed(&self, id: &str) -> Result<(), StoreError>;

    /// Messages inserted after feed position `seq`, oldest first.
    /// `added_after(0)` returns the whole collection in insertion order.
    async fn added_after(&self, seq: i64) -> Result<Vec<ChangeEntry>, StoreError>;
}
