//! Structured intents parsed from the classifier's output.

use serde::Deserialize;

/// Billing action named by the classifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent {
    QueryBill,
    QueryBillDetailed,
    PayBill,
    /// Anything the classifier could not map to a billing action. Not an
    /// error — it dispatches to a fixed reply.
    Unknown,
}

impl Intent {
    /// Map the wire label to an intent; unrecognized labels are `Unknown`.
    pub fn from_label(label: &str) -> Self {
        match label {
            "query_bill" => Self::QueryBill,
            "query_bill_detailed" => Self::QueryBillDetailed,
            "pay_bill" => Self::PayBill,
            _ => Self::Unknown,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::QueryBill => "query_bill",
            Self::QueryBillDetailed => "query_bill_detailed",
            Self::PayBill => "pay_bill",
            Self::Unknown => "unknown",
        }
    }
}

/// Raw classifier output, before defaults are applied.
///
/// Field names mirror the JSON contract the model is instructed to
/// produce; every field is optional and unknown fields are ignored.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawIntent {
    pub intent: Option<String>,
    pub subscriber_no: Option<String>,
    pub month: Option<u32>,
    /// Not required to be four digits.
    pub year: Option<i32>,
    /// Carried on the wire but unused downstream.
    pub usage: Option<serde_json::Value>,
    pub page: Option<u32>,
    pub page_size: Option<u32>,
}

impl RawIntent {
    /// The degenerate output used when the model's text is not valid JSON.
    pub fn unknown() -> Self {
        Self::default()
    }

    /// The resolved intent; a missing label is `Unknown`.
    pub fn intent(&self) -> Intent {
        self.intent
            .as_deref()
            .map(Intent::from_label)
            .unwrap_or(Intent::Unknown)
    }
}
