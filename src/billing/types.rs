//! Wire types for the billing gateway.

use serde::Deserialize;

/// A bearer credential for one processing attempt. Obtained fresh per
/// pipeline run and never cached across messages.
#[derive(Debug, Clone)]
pub struct SessionToken(String);

impl SessionToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Identifies a bill: subscriber plus billing period.
#[derive(Debug, Clone)]
pub struct BillQuery {
    pub subscriber_no: String,
    pub month: u32,
    pub year: i32,
}

/// Pagination for detailed bills.
#[derive(Debug, Clone, Copy)]
pub struct BillPage {
    pub page: u32,
    pub page_size: u32,
}

/// Summary returned by `QueryBill`. Numeric fields may be absent.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BillSummary {
    pub total_remaining: Option<f64>,
    pub is_paid: bool,
}

/// Paginated detail returned by `QueryBillDetailed`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DetailedBill {
    pub total: Option<f64>,
    pub remaining: Option<f64>,
    pub is_paid: bool,
    pub phone_amount: Option<f64>,
    pub internet_amount: Option<f64>,
    pub details: Vec<UsageDetail>,
}

/// One usage line item on a detailed bill.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UsageDetail {
    pub usage_type: String,
    pub amount: Option<f64>,
}
