//! Reply formatting — pure rendering of billing results into display text.

use crate::billing::types::{BillSummary, DetailedBill};

/// Fixed reply for messages the classifier could not map to a billing
/// action.
pub const UNKNOWN_INTENT_REPLY: &str = "I couldn't understand your request.";

const MONTH_NAMES: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

/// Full month name for a 1-based month number; out of range renders
/// "Unknown".
pub fn month_name(month: u32) -> &'static str {
    MONTH_NAMES
        .get(month.wrapping_sub(1) as usize)
        .copied()
        .unwrap_or("Unknown")
}

/// Render a bill summary reply.
pub fn bill_summary(subscriber_no: &str, month: u32, year: i32, bill: &BillSummary) -> String {
    format!(
        "Bill Summary for {} {}:\n\n\
         Subscriber No: {}\n\
         Remaining Balance: ${}\n\
         Status: {}\n\n\
         Would you like to see the detailed usage or make a payment?",
        month_name(month),
        year,
        subscriber_no,
        amount(bill.total_remaining),
        paid_status(bill.is_paid),
    )
}

/// Render a detailed bill reply: totals plus one line per usage item.
pub fn detailed_bill(subscriber_no: &str, month: u32, year: i32, bill: &DetailedBill) -> String {
    let mut out = format!(
        "Detailed Bill for {} {}:\n\n\
         Subscriber No: {}\n\
         Total Due: ${}\n\
         Remaining: ${}\n\
         Status: {}\n\
         Phone Usage: ${}\n\
         Internet Usage: ${}\n\n",
        month_name(month),
        year,
        subscriber_no,
        amount(bill.total),
        amount(bill.remaining),
        paid_status(bill.is_paid),
        amount(bill.phone_amount),
        amount(bill.internet_amount),
    );

    for item in &bill.details {
        out.push_str(&format!("{}: {}\n", item.usage_type, amount(item.amount)));
    }

    out
}

/// Unit label for a usage type. Not part of the rendered detail line
/// today; the line shows only the type and amount.
pub fn usage_unit(usage_type: &str) -> &'static str {
    match usage_type {
        "PHONE" => "minutes",
        "INTERNET" => "MB",
        _ => "units",
    }
}

/// Missing amounts render as 0.00.
fn amount(value: Option<f64>) -> String {
    format!("{:.2}", value.unwrap_or(0.0))
}

fn paid_status(is_paid: bool) -> &'static str {
    if is_paid { "Paid" } else { "Not Paid" }
}

// ── Tests ───────────────────────────────────────────────────────────
