use chrono::Datelike;
use serde_json::{Map, Value};

use super::common::{int_between, money, number_between, number_of};
use crate::config::MAX_LOP_DAYS;
use crate::validation::error::ErrorCode;
use crate::validation::registry::SchemaName;
use crate::validation::rules::{Context, CrossRule, Field, Kind, Schema};

pub fn schemas() -> Vec<(SchemaName, Schema)> {
    vec![(SchemaName::GeneratePayslip, generate_payslip())]
}

fn generate_payslip() -> Schema {
    Schema::new(vec![
        Field::required("employeeId", Kind::Uuid),
        Field::required("month", int_between(1, 12)),
        Field::required("year", int_between(2000, 2100)),
        Field::with_default("lopDays", number_between(0.0, MAX_LOP_DAYS), 0),
        Field::with_default("bonus", money(), 0),
    ])
    .with_rules(vec![CrossRule {
        field: "month",
        requires: &["month", "year"],
        code: ErrorCode::DateMax,
        check: period_not_in_future,
    }])
}

fn period_not_in_future(value: &Map<String, Value>, ctx: &Context) -> Result<(), String> {
    let (Some(month), Some(year)) = (number_of(value, "month"), number_of(value, "year")) else {
        return Ok(());
    };
    let today = ctx.today();
    let requested = (year as i32, month as u32);

    if requested > (today.year(), today.month()) {
        Err("Cannot generate a payslip for a future pay period".to_string())
    } else {
        Ok(())
    }
}
