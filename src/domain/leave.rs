//! Leave accounting rules.

use chrono::{Datelike, NaiveDate, Weekday};
use serde::Serialize;

use crate::config::{LEAVE_ENTITLEMENTS, LEAVE_STATUS_PENDING, LEAVE_TYPES};

pub const STATUS_APPROVED: &str = "Approved";
pub const STATUS_REJECTED: &str = "Rejected";
pub const STATUS_CANCELLED: &str = "Cancelled";

/// Working days (Mon-Fri) in `start..=end`; a half day always counts 0.5.
pub fn leave_days(start: NaiveDate, end: NaiveDate, half_day: bool) -> f64 {
    if half_day {
        return 0.5;
    }
    start
        .iter_days()
        .take_while(|d| *d <= end)
        .filter(|d| !matches!(d.weekday(), Weekday::Sat | Weekday::Sun))
        .count() as f64
}

/// Yearly entitlement, `None` when the type is unlimited.
pub fn entitlement(leave_type: &str) -> Option<f64> {
    LEAVE_ENTITLEMENTS
        .iter()
        .find(|(name, _)| *name == leave_type)
        .map(|(_, days)| *days)
}

pub fn overlaps(a: (NaiveDate, NaiveDate), b: (NaiveDate, NaiveDate)) -> bool {
    a.0 <= b.1 && b.0 <= a.1
}

/// Pending and approved requests hold days against the balance.
pub fn is_active(status: &str) -> bool {
    status == LEAVE_STATUS_PENDING || status == STATUS_APPROVED
}

/// Allowed status moves for a single request.
pub fn check_transition(current: &str, next: &str) -> Result<(), String> {
    let allowed = match current {
        LEAVE_STATUS_PENDING => matches!(next, STATUS_APPROVED | STATUS_REJECTED | STATUS_CANCELLED),
        STATUS_APPROVED => next == STATUS_CANCELLED,
        _ => false,
    };
    if allowed {
        Ok(())
    } else {
        Err(format!(
            "Cannot change a {} leave request to {}",
            current.to_lowercase(),
            next
        ))
    }
}

/// One request as far as balances care.
#[derive(Debug, Clone, PartialEq)]
pub struct LeaveUsage<'a> {
    pub leave_type: &'a str,
    pub status: &'a str,
    pub days: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaveBalance {
    pub leave_type: String,
    pub entitled: Option<f64>,
    pub used: f64,
    pub pending: f64,
    pub remaining: Option<f64>,
}

/// Balance per leave type from a year's worth of requests.
pub fn balances<'a>(usages: impl IntoIterator<Item = LeaveUsage<'a>>) -> Vec<LeaveBalance> {
    let mut out: Vec<LeaveBalance> = LEAVE_TYPES
        .iter()
        .map(|leave_type| LeaveBalance {
            leave_type: leave_type.to_string(),
            entitled: entitlement(leave_type),
            used: 0.0,
            pending: 0.0,
            remaining: entitlement(leave_type),
        })
        .collect();

    for usage in usages {
        let Some(balance) = out.iter_mut().find(|b| b.leave_type == usage.leave_type) else {
            continue;
        };
        match usage.status {
            STATUS_APPROVED => balance.used += usage.days,
            LEAVE_STATUS_PENDING => balance.pending += usage.days,
            _ => continue,
        }
        balance.remaining = balance
            .entitled
            .map(|days| days - balance.used - balance.pending);
    }
    out
}
