use chrono::{Datelike, Days, NaiveDate};
use serde_json::Value;

use crate::config::{TIMESHEET_STATUS_DRAFT, TIMESHEET_STATUS_SUBMITTED};

pub const STATUS_APPROVED: &str = "Approved";
pub const STATUS_REJECTED: &str = "Rejected";

/// Monday and Sunday of the week containing `date`, or `None` at the edge
/// of the calendar.
pub fn week_bounds(date: NaiveDate) -> Option<(NaiveDate, NaiveDate)> {
    let monday =
        date.checked_sub_days(Days::new(u64::from(date.weekday().num_days_from_monday())))?;
    let sunday = monday.checked_add_days(Days::new(6))?;
    Some((monday, sunday))
}

/// Sum of `hours` over validated entries, rounded to 2 decimals.
pub fn total_hours(entries: &[Value]) -> f64 {
    let total: f64 = entries
        .iter()
        .filter_map(|entry| entry.get("hours").and_then(Value::as_f64))
        .sum();
    (total * 100.0).round() / 100.0
}

/// Drafts and rejected sheets may be (re)submitted.
pub fn can_submit(status: &str) -> bool {
    status == TIMESHEET_STATUS_DRAFT || status == STATUS_REJECTED
}

/// Only submitted sheets are decided.
pub fn can_decide(status: &str) -> bool {
    status == TIMESHEET_STATUS_SUBMITTED
}
