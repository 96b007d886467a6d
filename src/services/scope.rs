//! Who may see or act on whose records.

use uuid::Uuid;

use crate::domain::{Actor, Record, Resource};
use crate::errors::{AppError, AppResult, OptionExt};
use crate::infra::{RecordFilter, RecordRepository};
use crate::validation::ErrorCode;

/// The employee a request is about.
///
/// Without an explicit id this is the caller's own employee record; naming
/// someone else requires an approver role.
pub async fn resolve_employee(
    records: &dyn RecordRepository,
    actor: &Actor,
    requested: Option<&str>,
) -> AppResult<Record> {
    let own = records
        .find_by_key(Resource::Employee, &actor.employee_code)
        .await?;

    let Some(raw) = requested else {
        return own.ok_or_missing("Employee");
    };
    let id = Uuid::parse_str(raw).map_err(|_| {
        AppError::field("employeeId", ErrorCode::Guid, "\"employeeId\" must be a valid GUID")
    })?;

    match own {
        Some(employee) if employee.id == id => Ok(employee),
        _ if !actor.can_approve() => Err(AppError::Forbidden),
        _ => records
            .find_by_id(Resource::Employee, id)
            .await?
            .ok_or_missing("Employee"),
    }
}

/// Employees only see records filed under their own employee code.
pub fn ensure_visible(actor: &Actor, record: &Record) -> AppResult<()> {
    if actor.can_approve() || record.text("employeeCode") == Some(actor.employee_code.as_str()) {
        Ok(())
    } else {
        Err(AppError::Forbidden)
    }
}

/// Narrow a list to the caller's own records unless they approve others'.
pub fn scoped_filter(
    actor: &Actor,
    filter: RecordFilter,
    query: &serde_json::Map<String, serde_json::Value>,
) -> RecordFilter {
    if actor.can_approve() {
        filter.eq_from(query, &["employeeId"])
    } else {
        filter.eq("employeeCode", actor.employee_code.clone())
    }
}
