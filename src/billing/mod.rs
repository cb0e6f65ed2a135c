//! Billing gateway integration — login plus read/pay operations.

pub mod client;
pub mod types;

pub use client::{BillingGateway, HttpBillingClient};
pub use types::{BillPage, BillQuery, BillSummary, DetailedBill, SessionToken, UsageDetail};
