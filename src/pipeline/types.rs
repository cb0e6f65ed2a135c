//! Pipeline data types — classifier output resolved against defaults.

use chrono::{DateTime, Datelike, Utc};

use crate::billing::types::{BillPage, BillQuery};
use crate::classifier::intent::{Intent, RawIntent};

/// Defaults merged over the classifier's raw output when it omits a field.
/// Month and year default separately, to the current calendar values.
#[derive(Debug, Clone)]
pub struct IntentDefaults {
    /// Fallback subscriber when the classifier does not extract one.
    pub subscriber_no: String,
    /// First results page.
    pub page: u32,
    /// Page size for detailed bills.
    pub page_size: u32,
}

impl Default for IntentDefaults {
    fn default() -> Self {
        Self {
            subscriber_no: "000000".to_string(),
            page: 1,
            page_size: 10,
        }
    }
}

/// A fully-resolved billing request: intent plus every parameter the
/// gateway operations need, with defaults already applied.
#[derive(Debug, Clone)]
pub struct BillingRequest {
    pub intent: Intent,
    pub subscriber_no: String,
    pub month: u32,
    pub year: i32,
    pub page: u32,
    pub page_size: u32,
}

impl BillingRequest {
    /// Resolve raw classifier output against defaults, using the current
    /// calendar month and year for omitted periods.
    pub fn resolve(raw: RawIntent, defaults: &IntentDefaults) -> Self {
        Self::resolve_at(raw, defaults, Utc::now())
    }

    /// Resolution against an explicit "now" — the testable core.
    pub fn resolve_at(raw: RawIntent, defaults: &IntentDefaults, now: DateTime<Utc>) -> Self {
        Self {
            intent: raw.intent(),
            subscriber_no: raw
                .subscriber_no
                .unwrap_or_else(|| defaults.subscriber_no.clone()),
            month: raw.month.unwrap_or_else(|| now.month()),
            year: raw.year.unwrap_or_else(|| now.year()),
            page: raw.page.unwrap_or(defaults.page),
            page_size: raw.page_size.unwrap_or(defaults.page_size),
        }
    }

    pub fn query(&self) -> BillQuery {
        BillQuery {
            subscriber_no: self.subscriber_no.clone(),
            month: self.month,
            year: self.year,
        }
    }

    pub fn paging(&self) -> BillPage {
        BillPage {
            page: self.page,
            page_size: self.page_size,
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn fixed_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 8, 15, 12, 0, 0).unwrap()
    }

    #[test]
    fn empty_raw_intent_takes_all_defaults() {
        let request =
            BillingRequest::resolve_at(RawIntent::unknown(), &IntentDefaults::default(), fixed_now());
        assert_eq!(request.intent, Intent::Unknown);
        assert_eq!(request.subscriber_no, "000000");
        assert_eq!(request.month, 8);
        assert_eq!(request.year, 2025);
        assert_eq!(request.page, 1);
        assert_eq!(request.page_size, 10);
    }

    #[test]
    fn classifier_values_win_over_defaults() {
        let raw: RawIntent = serde_json::from_str(
            r#"{"intent":"query_bill_detailed","subscriberNo":"12345","month":3,"year":2025,"page":4,"pageSize":50}"#,
        )
        .unwrap();
        let request = BillingRequest::resolve_at(raw, &IntentDefaults::default(), fixed_now());
        assert_eq!(request.intent, Intent::QueryBillDetailed);
        assert_eq!(request.subscriber_no, "12345");
        assert_eq!(request.month, 3);
        assert_eq!(request.year, 2025);
        assert_eq!(request.page, 4);
        assert_eq!(request.page_size, 50);
    }

    #[test]
    fn omitted_period_resolves_to_current_month_and_year() {
        let raw: RawIntent =
            serde_json::from_str(r#"{"intent":"query_bill","subscriberNo":"9"}"#).unwrap();
        let request = BillingRequest::resolve_at(raw, &IntentDefaults::default(), fixed_now());
        assert_eq!(request.month, 8);
        assert_eq!(request.year, 2025);
        assert_eq!(request.subscriber_no, "9");
    }

    #[test]
    fn query_and_paging_views() {
        let raw: RawIntent = serde_json::from_str(
            r#"{"intent":"query_bill_detailed","subscriberNo":"7","month":1,"year":2,"page":3,"pageSize":4}"#,
        )
        .unwrap();
        let request = BillingRequest::resolve_at(raw, &IntentDefaults::default(), fixed_now());

        let query = request.query();
        assert_eq!(query.subscriber_no, "7");
        assert_eq!(query.month, 1);
        assert_eq!(query.year, 2);

        let paging = request.paging();
        assert_eq!(paging.page, 3);
        assert_eq!(paging.page_size, 4);
    }
}
