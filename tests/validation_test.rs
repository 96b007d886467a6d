//! Integration tests for the validation layer.
//!
//! Exercises the schema registry through the public entry points only, the
//! same way the request extractors do.

use chrono::{DateTime, TimeZone, Utc};
use serde_json::{json, Value};

use hrm_api::validation::{
    registry, validate, validate_at, validate_named, ErrorCode, SchemaName,
};

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 15, 6, 0, 0).unwrap()
}

fn employee() -> Value {
    json!({
        "employeeId": "EMP1001",
        "firstName": "Priya",
        "lastName": "Sharma",
        "email": "priya.sharma@example.com",
        "departmentId": "6f1c1f0e-4a39-4f1e-9c39-0d8b5f6b8a11",
        "positionId": "0e5d6b2a-8e3a-4c55-a7f1-2b6f3f9e4c22",
        "hireDate": "2023-04-01"
    })
}

fn leave(start: &str, end: &str) -> Value {
    json!({
        "leaveType": "Sick",
        "startDate": start,
        "endDate": end,
        "reason": "Recovering from the flu"
    })
}

// =============================================================================
// Registry
// =============================================================================

#[test]
fn test_every_schema_is_registered() {
    for name in SchemaName::ALL {
        assert!(registry().get(name).is_ok(), "{} missing", name.as_str());
        assert_eq!(name.as_str().parse::<SchemaName>().unwrap(), name);
    }
    assert_eq!(registry().len(), SchemaName::ALL.len());
}

#[test]
fn test_unknown_schema_is_not_a_validation_failure() {
    let err = validate_named("payrollExport", &json!({})).unwrap_err();

    assert!(err.to_string().contains("payrollExport"));
}

// =============================================================================
// Outcome shape
// =============================================================================

#[test]
fn test_missing_required_fields_are_each_reported() {
    let outcome = validate(SchemaName::CreateDepartment, &json!({})).unwrap();
    let errors = outcome.errors().unwrap();

    assert!(outcome.value().is_none());
    assert_eq!(errors.get("name").unwrap().code, ErrorCode::Required);
    assert_eq!(errors.get("code").unwrap().code, ErrorCode::Required);
    assert_eq!(errors.get("name").unwrap().message, "\"name\" is required");
}

#[test]
fn test_login_scenario() {
    let outcome = validate(SchemaName::Login, &json!({ "email": "BAD", "password": "x" })).unwrap();
    let errors = outcome.errors().unwrap();

    assert_eq!(errors.len(), 2);
    assert_eq!(errors.get("email").unwrap().code, ErrorCode::Email);
    assert_eq!(errors.get("password").unwrap().code, ErrorCode::MinLength);
}

#[test]
fn test_login_email_is_lowercased_and_unknown_keys_dropped() {
    let outcome = validate(
        SchemaName::Login,
        &json!({ "email": "  Admin@Example.COM ", "password": "secret1", "remember": true }),
    )
    .unwrap();
    let value = outcome.value().unwrap();

    assert_eq!(value["email"], json!("admin@example.com"));
    assert!(!value.contains_key("remember"));
}

#[test]
fn test_normalized_output_validates_to_itself() {
    let first = validate_at(SchemaName::CreateEmployee, &employee(), now())
        .unwrap()
        .into_result()
        .unwrap();
    let second = validate_at(SchemaName::CreateEmployee, &Value::Object(first.clone()), now())
        .unwrap()
        .into_result()
        .unwrap();

    assert_eq!(first, second);
}

#[test]
fn test_department_code_is_uppercased() {
    let outcome = validate(
        SchemaName::CreateDepartment,
        &json!({ "name": "Engineering", "code": "eng" }),
    )
    .unwrap();
    let value = outcome.value().unwrap();

    assert_eq!(value["code"], json!("ENG"));
    assert_eq!(value["isActive"], json!(true));
}

// =============================================================================
// Employees
// =============================================================================

#[test]
fn test_age_boundary_is_eighteen_years() {
    let mut adult = employee();
    adult["dateOfBirth"] = json!("2006-06-15");
    assert!(validate_at(SchemaName::CreateEmployee, &adult, now()).unwrap().is_valid());

    let mut minor = employee();
    minor["dateOfBirth"] = json!("2006-06-16");
    let outcome = validate_at(SchemaName::CreateEmployee, &minor, now()).unwrap();
    let error = outcome.errors().unwrap().get("dateOfBirth").unwrap();

    assert_eq!(error.code, ErrorCode::Custom);
    assert!(error.message.contains("age below 18"));
}

#[test]
fn test_negative_basic_salary_reports_one_error() {
    let mut payload = employee();
    payload["salary"] = json!({ "basicSalary": -5 });
    let outcome = validate_at(SchemaName::CreateEmployee, &payload, now()).unwrap();
    let errors = outcome.errors().unwrap();

    assert_eq!(errors.len(), 1);
    assert_eq!(errors.get("salary.basicSalary").unwrap().code, ErrorCode::NumberMin);
}

// =============================================================================
// Leave
// =============================================================================

#[test]
fn test_leave_end_before_start() {
    let outcome = validate(SchemaName::CreateLeaveRequest, &leave("2024-03-10", "2024-03-09")).unwrap();

    assert_eq!(outcome.errors().unwrap().get("endDate").unwrap().code, ErrorCode::DateMin);
}

#[test]
fn test_leave_span_limit() {
    let within = validate(SchemaName::CreateLeaveRequest, &leave("2024-01-01", "2024-03-31")).unwrap();
    assert!(within.is_valid());

    let beyond = validate(SchemaName::CreateLeaveRequest, &leave("2024-01-01", "2024-04-01")).unwrap();
    assert_eq!(beyond.errors().unwrap().get("endDate").unwrap().code, ErrorCode::DateMax);
}

#[test]
fn test_rejection_requires_comments() {
    let bare = validate(SchemaName::UpdateLeaveStatus, &json!({ "status": "Rejected" })).unwrap();
    assert!(bare.errors().unwrap().contains("approverComments"));

    let explained = validate(
        SchemaName::UpdateLeaveStatus,
        &json!({ "status": "Rejected", "approverComments": "Peak release week" }),
    )
    .unwrap();
    assert!(explained.is_valid());

    let approved = validate(SchemaName::UpdateLeaveStatus, &json!({ "status": "Approved" })).unwrap();
    assert!(approved.is_valid());
}

// =============================================================================
// Timesheets and payroll
// =============================================================================

#[test]
fn test_week_must_start_on_monday() {
    let outcome = validate(
        SchemaName::CreateTimesheet,
        &json!({
            "weekStartDate": "2024-01-02",
            "entries": [{ "date": "2024-01-02", "hours": 8 }]
        }),
    )
    .unwrap();
    let error = outcome.errors().unwrap().get("weekStartDate").unwrap();

    assert_eq!(error.code, ErrorCode::DateWeekday);
    assert!(error.message.ends_with("must be a Monday"));
}

#[test]
fn test_payslip_defaults() {
    let outcome = validate_at(
        SchemaName::GeneratePayslip,
        &json!({
            "employeeId": "6f1c1f0e-4a39-4f1e-9c39-0d8b5f6b8a11",
            "month": "5",
            "year": 2024
        }),
        now(),
    )
    .unwrap();
    let value = outcome.value().unwrap();

    assert_eq!(value["month"], json!(5));
    assert_eq!(value["lopDays"], json!(0));
    assert_eq!(value["bonus"], json!(0));
}
