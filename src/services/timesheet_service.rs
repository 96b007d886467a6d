//! Weekly timesheets.

use async_trait::async_trait;
use chrono::Utc;
use serde_json::{json, Map, Value};
use std::sync::Arc;
use uuid::Uuid;

use super::scope::{ensure_visible, resolve_employee, scoped_filter};
use crate::config::{TIMESHEET_STATUS_DRAFT, TIMESHEET_STATUS_SUBMITTED};
use crate::domain::record::full_name;
use crate::domain::timesheet::{self, week_bounds};
use crate::domain::{Actor, Record, Resource};
use crate::errors::{AppError, AppResult, OptionExt};
use crate::infra::{RecordFilter, UnitOfWork};
use crate::types::{Paginated, PaginationParams};
use crate::validation::{format_date, parse_date, ErrorCode};
use crate::with_transaction;

#[async_trait]
pub trait TimesheetService: Send + Sync {
    async fn create(&self, actor: &Actor, input: Map<String, Value>) -> AppResult<Value>;

    async fn list(&self, actor: &Actor, query: Map<String, Value>) -> AppResult<Paginated<Value>>;

    async fn get(&self, actor: &Actor, id: Uuid) -> AppResult<Value>;

    /// Submit drafts for approval; all or nothing
    async fn submit(&self, actor: &Actor, ids: Vec<Uuid>) -> AppResult<Value>;

    async fn update_status(
        &self,
        actor: &Actor,
        id: Uuid,
        status: String,
        comments: Option<String>,
    ) -> AppResult<Value>;
}

fn submit_one(record: &mut Record, actor: &Actor) -> AppResult<()> {
    ensure_visible(actor, record)?;
    let status = record.text("status").unwrap_or(TIMESHEET_STATUS_DRAFT).to_string();
    if !timesheet::can_submit(&status) {
        return Err(AppError::invalid_state(format!(
            "Timesheet {} is {} and cannot be submitted",
            record.id,
            status.to_lowercase()
        )));
    }
    record.set("status", TIMESHEET_STATUS_SUBMITTED);
    record.set("submittedAt", Utc::now().to_rfc3339());
    Ok(())
}

pub struct TimesheetManager<U: UnitOfWork> {
    uow: Arc<U>,
}

impl<U: UnitOfWork> TimesheetManager<U> {
    pub fn new(uow: Arc<U>) -> Self {
        Self { uow }
    }

    async fn find(&self, id: Uuid) -> AppResult<Record> {
        self.uow
            .records()
            .find_by_id(Resource::Timesheet, id)
            .await?
            .ok_or_missing(Resource::Timesheet.label())
    }
}

#[async_trait]
impl<U: UnitOfWork> TimesheetService for TimesheetManager<U> {
    async fn create(&self, actor: &Actor, mut input: Map<String, Value>) -> AppResult<Value> {
        let records = self.uow.records();
        let requested = input.remove("employeeId");
        let employee =
            resolve_employee(records.as_ref(), actor, requested.as_ref().and_then(Value::as_str))
                .await?;

        let start = input
            .get("weekStartDate")
            .and_then(Value::as_str)
            .and_then(parse_date)
            .ok_or_else(|| {
                AppError::field("weekStartDate", ErrorCode::Required, "\"weekStartDate\" is required")
            })?;
        let (_, sunday) = week_bounds(start).ok_or_else(|| {
            AppError::field(
                "weekStartDate",
                ErrorCode::DateBase,
                "\"weekStartDate\" must be a valid date",
            )
        })?;
        input
            .entry("weekEndDate")
            .or_insert_with(|| json!(format_date(sunday)));

        let total = input
            .get("entries")
            .and_then(Value::as_array)
            .map(|entries| timesheet::total_hours(entries))
            .unwrap_or_default();

        input.insert("employeeId".into(), json!(employee.id.to_string()));
        input.insert("employeeCode".into(), json!(employee.text("employeeId")));
        input.insert("employeeName".into(), json!(full_name(&employee)));
        input.insert("totalHours".into(), json!(total));
        input.insert("status".into(), json!(TIMESHEET_STATUS_DRAFT));

        let record = Record::new(Resource::Timesheet, input);
        if let Some(key) = record.natural_key.as_deref() {
            if records.find_by_key(Resource::Timesheet, key).await?.is_some() {
                return Err(AppError::conflict(Resource::Timesheet.key_label()));
            }
        }

        let record = records.insert(record).await?;
        tracing::info!(timesheet_id = %record.id, week = %format_date(start), "timesheet created");
        Ok(record.to_json())
    }

    async fn list(&self, actor: &Actor, query: Map<String, Value>) -> AppResult<Paginated<Value>> {
        let page = PaginationParams::from_query(&query);
        let mut filter = scoped_filter(actor, RecordFilter::new(), &query).eq_from(&query, &["status"]);
        if let Some(from) = query.get("startDate").and_then(Value::as_str) {
            filter = filter.gte("weekStartDate", from);
        }
        if let Some(to) = query.get("endDate").and_then(Value::as_str) {
            filter = filter.lte("weekStartDate", to);
        }

        let (records, total) = self
            .uow
            .records()
            .list(Resource::Timesheet, &filter, page)
            .await?;
        Ok(Paginated::new(
            records.into_iter().map(Value::from).collect(),
            page,
            total,
        ))
    }

    async fn get(&self, actor: &Actor, id: Uuid) -> AppResult<Value> {
        let record = self.find(id).await?;
        ensure_visible(actor, &record)?;
        Ok(record.to_json())
    }

    async fn submit(&self, actor: &Actor, ids: Vec<Uuid>) -> AppResult<Value> {
        let actor = actor.clone();
        let count = ids.len();

        let items = with_transaction!(self.uow, |ctx| {
            let repo = ctx.records();
            let mut items = Vec::with_capacity(ids.len());
            for id in ids {
                let mut record = repo
                    .find_by_id(Resource::Timesheet, id)
                    .await?
                    .ok_or_else(|| AppError::NotFoundEntity(format!("Timesheet {}", id)))?;
                submit_one(&mut record, &actor)?;
                items.push(repo.update(record).await?.to_json());
            }
            Ok(items)
        })?;

        tracing::info!(count, "timesheets submitted");
        Ok(json!({ "count": count, "items": items }))
    }

    async fn update_status(
        &self,
        actor: &Actor,
        id: Uuid,
        status: String,
        comments: Option<String>,
    ) -> AppResult<Value> {
        let mut record = self.find(id).await?;
        let current = record.text("status").unwrap_or_default().to_string();
        if !timesheet::can_decide(&current) {
            return Err(AppError::invalid_state(format!(
                "Only submitted timesheets can be {}",
                status.to_lowercase()
            )));
        }
        if record.text("employeeCode") == Some(actor.employee_code.as_str()) {
            return Err(AppError::not_permitted(
                "You cannot decide on your own timesheet",
            ));
        }

        record.set("status", status.clone());
        if let Some(comments) = comments {
            record.set("approverComments", comments);
        }
        record.set("approvedBy", actor.user_id.to_string());
        record.set("decidedAt", Utc::now().to_rfc3339());

        let record = self.uow.records().update(record).await?;
        tracing::info!(timesheet_id = %id, status = %status, "timesheet decided");
        Ok(record.to_json())
    }
}

#[cfg(test)]
mod tests {
    use mockall::predicate::eq;

    use super::*;
    use crate::domain::UserRole;
    use crate::infra::MockRecordRepository;
    use crate::services::testing::{actor, employee, object, record, TestUnitOfWork};

    fn manager(records: MockRecordRepository) -> TimesheetManager<TestUnitOfWork> {
        TimesheetManager::new(Arc::new(TestUnitOfWork::with_records(records)))
    }

    fn sheet_input() -> Map<String, Value> {
        object(json!({
            "weekStartDate": "2024-01-01",
            "entries": [
                { "date": "2024-01-01", "hours": 8, "project": "HRM" },
                { "date": "2024-01-02", "hours": 7.5, "project": "HRM" }
            ]
        }))
    }

    #[tokio::test]
    async fn test_create_fills_week_end_and_total() {
        let me = employee("EMP007");
        let mut records = MockRecordRepository::new();
        records
            .expect_find_by_key()
            .with(eq(Resource::Employee), eq("EMP007"))
            .returning(move |_, _| Ok(Some(me.clone())));
        records
            .expect_find_by_key()
            .with(eq(Resource::Timesheet), mockall::predicate::always())
            .returning(|_, _| Ok(None));
        records.expect_insert().returning(Ok);

        let created = manager(records)
            .create(&actor(UserRole::Employee, "EMP007"), sheet_input())
            .await
            .unwrap();

        assert_eq!(created["weekEndDate"], json!("2024-01-07"));
        assert_eq!(created["totalHours"], json!(15.5));
        assert_eq!(created["status"], json!("Draft"));
    }

    #[tokio::test]
    async fn test_second_sheet_for_same_week_conflicts() {
        let me = employee("EMP007");
        let mut records = MockRecordRepository::new();
        records
            .expect_find_by_key()
            .with(eq(Resource::Employee), eq("EMP007"))
            .returning(move |_, _| Ok(Some(me.clone())));
        records
            .expect_find_by_key()
            .with(eq(Resource::Timesheet), mockall::predicate::always())
            .returning(|_, _| Ok(Some(record(Resource::Timesheet, json!({})))));
        records.expect_insert().never();

        let result = manager(records)
            .create(&actor(UserRole::Employee, "EMP007"), sheet_input())
            .await;

        assert_eq!(
            result.unwrap_err().to_string(),
            "Timesheet for this week already exists"
        );
    }

    #[tokio::test]
    async fn test_only_submitted_sheets_are_decided() {
        let draft = record(
            Resource::Timesheet,
            json!({ "status": "Draft", "employeeCode": "EMP007" }),
        );
        let id = draft.id;
        let mut records = MockRecordRepository::new();
        records
            .expect_find_by_id()
            .returning(move |_, _| Ok(Some(draft.clone())));
        records.expect_update().never();

        let result = manager(records)
            .update_status(&actor(UserRole::Manager, "EMP100"), id, "Approved".into(), None)
            .await;

        assert!(matches!(result, Err(AppError::InvalidState(_))));
    }

    #[tokio::test]
    async fn test_approve_submitted_sheet() {
        let submitted = record(
            Resource::Timesheet,
            json!({ "status": "Submitted", "employeeCode": "EMP007" }),
        );
        let id = submitted.id;
        let mut records = MockRecordRepository::new();
        records
            .expect_find_by_id()
            .returning(move |_, _| Ok(Some(submitted.clone())));
        records.expect_update().returning(Ok);

        let updated = manager(records)
            .update_status(&actor(UserRole::Manager, "EMP100"), id, "Approved".into(), None)
            .await
            .unwrap();

        assert_eq!(updated["status"], json!("Approved"));
    }

    #[test]
    fn test_submit_one_checks_owner_and_state() {
        let mut sheet = record(
            Resource::Timesheet,
            json!({ "status": "Draft", "employeeCode": "EMP007" }),
        );
        assert!(matches!(
            submit_one(&mut sheet, &actor(UserRole::Employee, "EMP008")),
            Err(AppError::Forbidden)
        ));

        submit_one(&mut sheet, &actor(UserRole::Employee, "EMP007")).unwrap();
        assert_eq!(sheet.text("status"), Some("Submitted"));

        assert!(matches!(
            submit_one(&mut sheet, &actor(UserRole::Employee, "EMP007")),
            Err(AppError::InvalidState(_))
        ));
    }
}
