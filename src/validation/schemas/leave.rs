use serde_json::{Map, Value};

use super::common::{
    date, end_not_before_start, int_between, one_of, one_of_any_case, page_fields, phone,
    rejection_has_comment, span_days, text, text_between, uuid_list,
};
use crate::config::{
    BULK_LEAVE_DECISIONS, HALF_DAY_PERIODS, LEAVE_DECISIONS, LEAVE_STATUSES, LEAVE_TYPES, MAX_BULK_APPROVAL,
    MAX_CALENDAR_SPAN_DAYS, MAX_LEAVE_SPAN_DAYS,
};
use crate::validation::error::ErrorCode;
use crate::validation::registry::SchemaName;
use crate::validation::rules::{Context, CrossRule, Field, Kind, Schema};

pub fn schemas() -> Vec<(SchemaName, Schema)> {
    vec![
        (SchemaName::CreateLeaveRequest, create_leave_request()),
        (SchemaName::UpdateLeaveStatus, update_leave_status()),
        (SchemaName::LeaveQuery, leave_query()),
        (SchemaName::LeaveBalance, leave_balance()),
        (SchemaName::BulkLeaveApproval, bulk_leave_approval()),
        (SchemaName::LeaveCalendar, leave_calendar()),
    ]
}

const DATE_ORDER: CrossRule = CrossRule {
    field: "endDate",
    requires: &["startDate", "endDate"],
    code: ErrorCode::DateMin,
    check: end_not_before_start,
};

fn create_leave_request() -> Schema {
    Schema::new(vec![
        Field::optional("employeeId", Kind::Uuid),
        Field::required("leaveType", one_of_any_case(LEAVE_TYPES)),
        Field::required("startDate", date()),
        Field::required("endDate", date()),
        Field::with_default("isHalfDay", Kind::Boolean, false),
        Field::optional("halfDayPeriod", one_of(HALF_DAY_PERIODS)),
        Field::required("reason", text_between(10, 500)),
        Field::optional("contactNumber", phone()),
        Field::optional("handoverNotes", text(1000)),
    ])
    .with_rules(vec![
        DATE_ORDER,
        CrossRule {
            field: "endDate",
            requires: &["startDate", "endDate"],
            code: ErrorCode::DateMax,
            check: request_span_within_limit,
        },
        CrossRule {
            field: "endDate",
            requires: &["startDate", "endDate", "isHalfDay"],
            code: ErrorCode::Custom,
            check: half_day_is_single_day,
        },
    ])
}

fn update_leave_status() -> Schema {
    Schema::new(vec![
        Field::required("status", one_of(LEAVE_DECISIONS)),
        Field::optional("approverComments", text(500)),
    ])
    .with_rules(vec![CrossRule {
        field: "approverComments",
        requires: &["status"],
        code: ErrorCode::Required,
        check: |value, _| rejection_has_comment(value, "approverComments"),
    }])
}

fn leave_query() -> Schema {
    let mut fields = page_fields();
    fields.extend([
        Field::optional("employeeId", Kind::Uuid),
        Field::optional("status", one_of(LEAVE_STATUSES)),
        Field::optional("leaveType", one_of_any_case(LEAVE_TYPES)),
        Field::optional("startDate", date()),
        Field::optional("endDate", date()),
    ]);
    Schema::new(fields).with_rules(vec![DATE_ORDER])
}

fn leave_balance() -> Schema {
    Schema::new(vec![
        Field::optional("employeeId", Kind::Uuid),
        Field::optional("year", int_between(2000, 2100)),
    ])
}

fn bulk_leave_approval() -> Schema {
    Schema::new(vec![
        Field::required("leaveIds", uuid_list(MAX_BULK_APPROVAL)),
        Field::required("status", one_of(BULK_LEAVE_DECISIONS)),
        Field::optional("comments", text(500)),
    ])
    .with_rules(vec![CrossRule {
        field: "comments",
        requires: &["status"],
        code: ErrorCode::Required,
        check: |value, _| rejection_has_comment(value, "comments"),
    }])
}

fn leave_calendar() -> Schema {
    Schema::new(vec![
        Field::required("startDate", date()),
        Field::required("endDate", date()),
        Field::optional("departmentId", Kind::Uuid),
    ])
    .with_rules(vec![
        DATE_ORDER,
        CrossRule {
            field: "endDate",
            requires: &["startDate", "endDate"],
            code: ErrorCode::DateMax,
            check: calendar_span_within_limit,
        },
    ])
}

fn request_span_within_limit(value: &Map<String, Value>, _: &Context) -> Result<(), String> {
    span_within(value, MAX_LEAVE_SPAN_DAYS, "Leave request cannot exceed")
}

fn calendar_span_within_limit(value: &Map<String, Value>, _: &Context) -> Result<(), String> {
    span_within(value, MAX_CALENDAR_SPAN_DAYS, "Calendar range cannot exceed")
}

fn span_within(value: &Map<String, Value>, max: i64, prefix: &str) -> Result<(), String> {
    match span_days(value) {
        Some(days) if days > max => Err(format!("{} {} days", prefix, max)),
        _ => Ok(()),
    }
}

fn half_day_is_single_day(value: &Map<String, Value>, _: &Context) -> Result<(), String> {
    let half_day = value.get("isHalfDay").and_then(Value::as_bool).unwrap_or(false);
    if half_day && span_days(value) != Some(0) {
        Err("Half-day leave must start and end on the same date".to_string())
    } else {
        Ok(())
    }
}
