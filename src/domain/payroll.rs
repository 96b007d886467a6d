//! Payslip arithmetic over an employee's salary structure.
//!
//! Amounts in the salary structure are per pay period; they are scaled to
//! a monthly figure before anything else happens.

use chrono::{Datelike, NaiveDate};
use serde::Serialize;
use serde_json::{Map, Value};

/// Pay periods per month for a pay frequency.
pub fn monthly_factor(pay_frequency: &str) -> f64 {
    match pay_frequency {
        "Weekly" => 52.0 / 12.0,
        "Bi-weekly" => 26.0 / 12.0,
        _ => 1.0,
    }
}

pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// First and last day of a pay period.
pub fn period_bounds(year: i32, month: u32) -> Option<(NaiveDate, NaiveDate)> {
    let start = NaiveDate::from_ymd_opt(year, month, 1)?;
    let next = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)?
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)?
    };
    Some((start, next.pred_opt()?))
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Breakdown {
    pub days_in_period: u32,
    pub lop_days: f64,
    pub earnings: Map<String, Value>,
    pub deductions: Map<String, Value>,
    pub gross_earnings: f64,
    pub total_deductions: f64,
    pub net_pay: f64,
}

/// Inputs that are not part of the salary structure.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PayPeriod {
    pub year: i32,
    pub month: u32,
    pub lop_days: f64,
    pub bonus: f64,
}

/// Compute a payslip from a validated salary structure.
///
/// Loss of pay is `(basic + allowances) / days_in_period * lop_days`, capped
/// at the fixed pay. Net pay never goes below zero.
pub fn compute(salary: &Map<String, Value>, period: PayPeriod) -> Option<Breakdown> {
    let (start, end) = period_bounds(period.year, period.month)?;
    let days_in_period = end.day() - start.day() + 1;

    let factor = monthly_factor(
        salary
            .get("payFrequency")
            .and_then(Value::as_str)
            .unwrap_or_default(),
    );
    let basic = round2(salary.get("basicSalary").and_then(Value::as_f64)? * factor);

    let mut earnings = Map::new();
    earnings.insert("basicSalary".into(), number(basic));
    let mut allowances_total = 0.0;
    for (name, amount) in amounts(salary, "allowances") {
        let monthly = round2(amount * factor);
        allowances_total += monthly;
        earnings.insert(name.clone(), number(monthly));
    }
    let bonus = round2(period.bonus);
    earnings.insert("bonus".into(), number(bonus));

    let fixed = basic + allowances_total;
    let lop = round2((fixed / f64::from(days_in_period) * period.lop_days).min(fixed));

    let mut deductions = Map::new();
    let mut deductions_total = 0.0;
    for (name, amount) in amounts(salary, "deductions") {
        let monthly = round2(amount * factor);
        deductions_total += monthly;
        deductions.insert(name.clone(), number(monthly));
    }
    deductions.insert("lossOfPay".into(), number(lop));

    let gross = round2(fixed + bonus);
    let total_deductions = round2(deductions_total + lop);

    Some(Breakdown {
        days_in_period,
        lop_days: period.lop_days,
        earnings,
        deductions,
        gross_earnings: gross,
        total_deductions,
        net_pay: round2((gross - total_deductions).max(0.0)),
    })
}

fn amounts<'a>(
    salary: &'a Map<String, Value>,
    key: &str,
) -> impl Iterator<Item = (&'a String, f64)> + 'a {
    salary
        .get(key)
        .and_then(Value::as_object)
        .into_iter()
        .flat_map(|section| section.iter())
        .filter_map(|(name, value)| value.as_f64().map(|amount| (name, amount)))
}

fn number(value: f64) -> Value {
    serde_json::Number::from_f64(value)
        .map(Value::Number)
        .unwrap_or(Value::Null)
}
