//! Persistence layer — the message collection and its change feed.

pub mod libsql_backend;
pub mod migrations;
pub mod traits;
pub mod watcher;

pub use libsql_backend::LibSqlStore;
pub use traits::{ChangeEntry, Message, MessageStore};
pub use watcher::{ChangeEvent, ChangeStream, MessageWatcher};
