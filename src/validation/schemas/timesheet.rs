use chrono::{Days, Weekday};
use serde_json::{Map, Value};

use super::common::{
    date, date_of, end_not_before_start, number_between, number_of, one_of, page_fields,
    past_date, rejection_has_comment, text, uuid_list,
};
use crate::config::{
    MAX_BULK_SUBMIT, MAX_ENTRY_HOURS, MAX_TIMESHEET_ENTRIES, MAX_WEEK_HOURS, TIMESHEET_DECISIONS,
    TIMESHEET_STATUSES,
};
use crate::validation::error::ErrorCode;
use crate::validation::registry::SchemaName;
use crate::validation::rules::{ArrayRule, Context, CrossRule, DateRule, Field, Kind, Schema};

pub fn schemas() -> Vec<(SchemaName, Schema)> {
    vec![
        (SchemaName::TimesheetEntry, timesheet_entry()),
        (SchemaName::CreateTimesheet, create_timesheet()),
        (SchemaName::BulkSubmitTimesheets, bulk_submit()),
        (SchemaName::UpdateTimesheetStatus, update_status()),
        (SchemaName::TimesheetQuery, timesheet_query()),
    ]
}

fn timesheet_entry() -> Schema {
    Schema::new(vec![
        Field::required("date", past_date()),
        Field::required("hours", number_between(0.0, MAX_ENTRY_HOURS)),
        Field::optional("project", text(100)),
        Field::optional("task", text(200)),
        Field::optional("description", text(500)),
    ])
}

fn create_timesheet() -> Schema {
    Schema::new(vec![
        Field::optional("employeeId", Kind::Uuid),
        Field::required(
            "weekStartDate",
            Kind::Date(DateRule {
                weekday: Some(Weekday::Mon),
                ..Default::default()
            }),
        ),
        Field::optional(
            "weekEndDate",
            Kind::Date(DateRule {
                weekday: Some(Weekday::Sun),
                ..Default::default()
            }),
        ),
        Field::required(
            "entries",
            Kind::Array(ArrayRule {
                item: Box::new(Kind::Object(timesheet_entry())),
                min_items: Some(1),
                max_items: Some(MAX_TIMESHEET_ENTRIES),
            }),
        ),
        Field::optional("notes", text(500)),
    ])
    .with_rules(vec![
        CrossRule {
            field: "weekEndDate",
            requires: &["weekStartDate", "weekEndDate"],
            code: ErrorCode::Custom,
            check: week_end_closes_week,
        },
        CrossRule {
            field: "entries",
            requires: &["weekStartDate", "entries"],
            code: ErrorCode::Custom,
            check: entries_within_week,
        },
        CrossRule {
            field: "entries",
            requires: &["entries"],
            code: ErrorCode::Custom,
            check: week_total_within_limit,
        },
    ])
}

fn bulk_submit() -> Schema {
    Schema::new(vec![Field::required("timesheetIds", uuid_list(MAX_BULK_SUBMIT))])
}

fn update_status() -> Schema {
    Schema::new(vec![
        Field::required("status", one_of(TIMESHEET_DECISIONS)),
        Field::optional("approverComments", text(500)),
    ])
    .with_rules(vec![CrossRule {
        field: "approverComments",
        requires: &["status"],
        code: ErrorCode::Required,
        check: |value, _| rejection_has_comment(value, "approverComments"),
    }])
}

fn timesheet_query() -> Schema {
    let mut fields = page_fields();
    fields.extend([
        Field::optional("employeeId", Kind::Uuid),
        Field::optional("status", one_of(TIMESHEET_STATUSES)),
        Field::optional("startDate", date()),
        Field::optional("endDate", date()),
    ]);
    Schema::new(fields).with_rules(vec![CrossRule {
        field: "endDate",
        requires: &["startDate", "endDate"],
        code: ErrorCode::DateMin,
        check: end_not_before_start,
    }])
}

fn week_end_closes_week(value: &Map<String, Value>, _: &Context) -> Result<(), String> {
    match (date_of(value, "weekStartDate"), date_of(value, "weekEndDate")) {
        (Some(start), Some(end)) if start.checked_add_days(Days::new(6)) != Some(end) => {
            Err("\"weekEndDate\" must be the Sunday of the same week".to_string())
        }
        _ => Ok(()),
    }
}

fn entries_within_week(value: &Map<String, Value>, _: &Context) -> Result<(), String> {
    let Some(start) = date_of(value, "weekStartDate") else {
        return Ok(());
    };
    let Some(end) = start.checked_add_days(Days::new(6)) else {
        return Err("\"weekStartDate\" must begin a complete week".to_string());
    };

    let outside = entries(value)
        .filter_map(|entry| date_of(entry, "date"))
        .any(|day| day < start || day > end);

    if outside {
        Err("All entries must fall within the timesheet week".to_string())
    } else {
        Ok(())
    }
}

fn week_total_within_limit(value: &Map<String, Value>, _: &Context) -> Result<(), String> {
    let total: f64 = entries(value).filter_map(|entry| number_of(entry, "hours")).sum();

    if total > MAX_WEEK_HOURS {
        Err(format!("Total hours cannot exceed {} per week", MAX_WEEK_HOURS))
    } else {
        Ok(())
    }
}

fn entries(value: &Map<String, Value>) -> impl Iterator<Item = &Map<String, Value>> {
    value
        .get("entries")
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
        .filter_map(Value::as_object)
}
