//! Orchestration — the change listener and per-message pipeline.

pub mod listener;
pub mod processor;
pub mod types;

pub use listener::ChangeListener;
pub use processor::MessageProcessor;
pub use types::{BillingRequest, IntentDefaults};
