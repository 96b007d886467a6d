//! Leave requests: filing, decisions, balances and the team calendar.

use async_trait::async_trait;
use chrono::{Datelike, NaiveDate, Utc};
use serde_json::{json, Map, Value};
use std::sync::Arc;
use uuid::Uuid;

use super::scope::{ensure_visible, resolve_employee, scoped_filter};
use crate::config::LEAVE_STATUS_PENDING;
use crate::domain::leave::{self, LeaveUsage, STATUS_APPROVED};
use crate::domain::record::full_name;
use crate::domain::{Actor, Record, Resource};
use crate::errors::{AppError, AppResult, OptionExt};
use crate::infra::{RecordFilter, UnitOfWork};
use crate::types::{Paginated, PaginationParams};
use crate::validation::{format_date, parse_date, ErrorCode};
use crate::with_transaction;

const ACTIVE_STATUSES: &[&str] = &[LEAVE_STATUS_PENDING, STATUS_APPROVED];

/// An approver's verdict on one or more requests.
#[derive(Debug, Clone, PartialEq)]
pub struct LeaveDecision {
    pub status: String,
    pub comments: Option<String>,
}

#[async_trait]
pub trait LeaveService: Send + Sync {
    async fn create(&self, actor: &Actor, input: Map<String, Value>) -> AppResult<Value>;

    async fn list(&self, actor: &Actor, query: Map<String, Value>) -> AppResult<Paginated<Value>>;

    async fn get(&self, actor: &Actor, id: Uuid) -> AppResult<Value>;

    async fn update_status(
        &self,
        actor: &Actor,
        id: Uuid,
        decision: LeaveDecision,
    ) -> AppResult<Value>;

    /// All-or-nothing decision over several requests
    async fn bulk_update(
        &self,
        actor: &Actor,
        ids: Vec<Uuid>,
        decision: LeaveDecision,
    ) -> AppResult<Value>;

    async fn balance(&self, actor: &Actor, query: Map<String, Value>) -> AppResult<Value>;

    async fn calendar(&self, actor: &Actor, query: Map<String, Value>) -> AppResult<Value>;
}

fn date_field(input: &Map<String, Value>, key: &str) -> AppResult<NaiveDate> {
    input
        .get(key)
        .and_then(Value::as_str)
        .and_then(parse_date)
        .ok_or_else(|| AppError::field(key, ErrorCode::Required, format!("\"{}\" is required", key)))
}

fn span_of(record: &Record) -> Option<(NaiveDate, NaiveDate)> {
    Some((record.date("startDate")?, record.date("endDate")?))
}

/// Move one request to the decided status, stamping who decided it.
pub(crate) fn apply_decision(
    record: &mut Record,
    actor: &Actor,
    decision: &LeaveDecision,
) -> AppResult<()> {
    let current = record.text("status").unwrap_or(LEAVE_STATUS_PENDING).to_string();
    leave::check_transition(&current, &decision.status).map_err(AppError::invalid_state)?;

    if decision.status == STATUS_APPROVED
        && record.text("employeeCode") == Some(actor.employee_code.as_str())
    {
        return Err(AppError::not_permitted(
            "You cannot approve your own leave request",
        ));
    }

    record.set("status", decision.status.clone());
    if let Some(comments) = &decision.comments {
        record.set("approverComments", comments.clone());
    }
    record.set("approvedBy", actor.user_id.to_string());
    record.set("decidedAt", Utc::now().to_rfc3339());
    Ok(())
}

pub struct LeaveManager<U: UnitOfWork> {
    uow: Arc<U>,
}

impl<U: UnitOfWork> LeaveManager<U> {
    pub fn new(uow: Arc<U>) -> Self {
        Self { uow }
    }

    async fn find(&self, id: Uuid) -> AppResult<Record> {
        self.uow
            .records()
            .find_by_id(Resource::LeaveRequest, id)
            .await?
            .ok_or_missing(Resource::LeaveRequest.label())
    }

    async fn ensure_no_overlap(
        &self,
        employee: &Record,
        span: (NaiveDate, NaiveDate),
    ) -> AppResult<()> {
        let filter = RecordFilter::new()
            .eq("employeeId", employee.id.to_string())
            .one_of("status", ACTIVE_STATUSES)
            .lte("startDate", format_date(span.1))
            .gte("endDate", format_date(span.0));
        let existing = self
            .uow
            .records()
            .find_all(Resource::LeaveRequest, &filter)
            .await?;

        let clash = existing.iter().any(|other| {
            leave::is_active(other.text("status").unwrap_or_default())
                && span_of(other).is_some_and(|theirs| leave::overlaps(span, theirs))
        });
        if clash {
            return Err(AppError::invalid_state(
                "Leave request overlaps an existing pending or approved request",
            ));
        }
        Ok(())
    }

    async fn ensure_balance(
        &self,
        employee: &Record,
        leave_type: &str,
        year: i32,
        days: f64,
    ) -> AppResult<()> {
        let Some(entitled) = leave::entitlement(leave_type) else {
            return Ok(());
        };
        let filter = RecordFilter::new()
            .eq("employeeId", employee.id.to_string())
            .eq("leaveType", leave_type)
            .one_of("status", ACTIVE_STATUSES)
            .gte("startDate", format!("{}-01-01", year))
            .lte("startDate", format!("{}-12-31", year));
        let taken: f64 = self
            .uow
            .records()
            .find_all(Resource::LeaveRequest, &filter)
            .await?
            .iter()
            .filter(|r| leave::is_active(r.text("status").unwrap_or_default()))
            .filter_map(|r| r.number("days"))
            .sum();

        let remaining = entitled - taken;
        if days > remaining {
            return Err(AppError::field(
                "leaveType",
                ErrorCode::Custom,
                format!(
                    "Insufficient {} leave balance: {} day(s) remaining",
                    leave_type,
                    remaining.max(0.0)
                ),
            ));
        }
        Ok(())
    }
}

#[async_trait]
impl<U: UnitOfWork> LeaveService for LeaveManager<U> {
    async fn create(&self, actor: &Actor, mut input: Map<String, Value>) -> AppResult<Value> {
        let records = self.uow.records();
        let requested = input.remove("employeeId");
        let employee =
            resolve_employee(records.as_ref(), actor, requested.as_ref().and_then(Value::as_str))
                .await?;

        let start = date_field(&input, "startDate")?;
        let end = date_field(&input, "endDate")?;
        let half_day = input.get("isHalfDay").and_then(Value::as_bool).unwrap_or(false);
        let leave_type = input
            .get("leaveType")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();

        let days = leave::leave_days(start, end, half_day);
        if days == 0.0 {
            return Err(AppError::field(
                "startDate",
                ErrorCode::Custom,
                "Leave request must include at least one working day",
            ));
        }

        self.ensure_no_overlap(&employee, (start, end)).await?;
        self.ensure_balance(&employee, &leave_type, start.year(), days).await?;

        input.insert("employeeId".into(), json!(employee.id.to_string()));
        input.insert("employeeCode".into(), json!(employee.text("employeeId")));
        input.insert("employeeName".into(), json!(full_name(&employee)));
        if let Some(department) = employee.data.get("departmentId") {
            input.insert("departmentId".into(), department.clone());
        }
        input.insert("days".into(), json!(days));
        input.insert("status".into(), json!(LEAVE_STATUS_PENDING));
        input.insert("appliedAt".into(), json!(Utc::now().to_rfc3339()));

        let record = records.insert(Record::new(Resource::LeaveRequest, input)).await?;
        tracing::info!(leave_id = %record.id, employee = %employee.id, days, "leave requested");
        Ok(record.to_json())
    }

    async fn list(&self, actor: &Actor, query: Map<String, Value>) -> AppResult<Paginated<Value>> {
        let page = PaginationParams::from_query(&query);
        let mut filter = scoped_filter(actor, RecordFilter::new(), &query)
            .eq_from(&query, &["status", "leaveType"]);
        if let Some(from) = query.get("startDate").and_then(Value::as_str) {
            filter = filter.gte("startDate", from);
        }
        if let Some(to) = query.get("endDate").and_then(Value::as_str) {
            filter = filter.lte("endDate", to);
        }

        let (records, total) = self
            .uow
            .records()
            .list(Resource::LeaveRequest, &filter, page)
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

    async fn update_status(
        &self,
        actor: &Actor,
        id: Uuid,
        decision: LeaveDecision,
    ) -> AppResult<Value> {
        let mut record = self.find(id).await?;
        apply_decision(&mut record, actor, &decision)?;

        let record = self.uow.records().update(record).await?;
        tracing::info!(leave_id = %id, status = %decision.status, "leave decided");
        Ok(record.to_json())
    }

    async fn bulk_update(
        &self,
        actor: &Actor,
        ids: Vec<Uuid>,
        decision: LeaveDecision,
    ) -> AppResult<Value> {
        let actor = actor.clone();
        let status = decision.status.clone();
        let count = ids.len();

        let updated = with_transaction!(self.uow, |ctx| {
            let repo = ctx.records();
            let mut updated = Vec::with_capacity(ids.len());
            for id in ids {
                let mut record = repo
                    .find_by_id(Resource::LeaveRequest, id)
                    .await?
                    .ok_or_else(|| AppError::NotFoundEntity(format!("Leave request {}", id)))?;
                apply_decision(&mut record, &actor, &decision)?;
                updated.push(repo.update(record).await?.to_json());
            }
            Ok(updated)
        })?;

        tracing::info!(count, status = %status, "leave requests decided in bulk");
        Ok(json!({ "status": status, "count": count, "items": updated }))
    }

    async fn balance(&self, actor: &Actor, query: Map<String, Value>) -> AppResult<Value> {
        let records = self.uow.records();
        let employee = resolve_employee(
            records.as_ref(),
            actor,
            query.get("employeeId").and_then(Value::as_str),
        )
        .await?;
        let year = query
            .get("year")
            .and_then(Value::as_i64)
            .unwrap_or_else(|| i64::from(Utc::now().year()));

        let filter = RecordFilter::new()
            .eq("employeeId", employee.id.to_string())
            .gte("startDate", format!("{}-01-01", year))
            .lte("startDate", format!("{}-12-31", year));
        let requests = records.find_all(Resource::LeaveRequest, &filter).await?;

        let usages = requests.iter().map(|r| LeaveUsage {
            leave_type: r.text("leaveType").unwrap_or_default(),
            status: r.text("status").unwrap_or_default(),
            days: r.number("days").unwrap_or_default(),
        });

        Ok(json!({
            "employeeId": employee.id.to_string(),
            "employeeName": full_name(&employee),
            "year": year,
            "balances": leave::balances(usages),
        }))
    }

    async fn calendar(&self, actor: &Actor, query: Map<String, Value>) -> AppResult<Value> {
        let from = date_field(&query, "startDate")?;
        let to = date_field(&query, "endDate")?;

        let filter = RecordFilter::new()
            .one_of("status", ACTIVE_STATUSES)
            .lte("startDate", format_date(to))
            .gte("endDate", format_date(from))
            .eq_from(&query, &["departmentId"]);
        let filter = scoped_filter(actor, filter, &query);
        let records = self
            .uow
            .records()
            .find_all(Resource::LeaveRequest, &filter)
            .await?;

        let entries: Vec<Value> = records
            .iter()
            .filter(|r| span_of(r).is_some_and(|span| leave::overlaps(span, (from, to))))
            .map(|r| {
                json!({
                    "id": r.id.to_string(),
                    "employeeId": r.text("employeeId"),
                    "employeeName": r.text("employeeName"),
                    "leaveType": r.text("leaveType"),
                    "startDate": r.text("startDate"),
                    "endDate": r.text("endDate"),
                    "isHalfDay": r.data.get("isHalfDay").cloned().unwrap_or(Value::Bool(false)),
                    "status": r.text("status"),
                })
            })
            .collect();

        Ok(json!({
            "startDate": format_date(from),
            "endDate": format_date(to),
            "entries": entries,
        }))
    }
}

#[cfg(test)]
mod tests {
    use mockall::predicate::{always, eq};

    use super::*;
    use crate::domain::UserRole;
    use crate::infra::MockRecordRepository;
    use crate::services::testing::{actor, employee, object, record, TestUnitOfWork};

    fn manager(records: MockRecordRepository) -> LeaveManager<TestUnitOfWork> {
        LeaveManager::new(Arc::new(TestUnitOfWork::with_records(records)))
    }

    fn request(start: &str, end: &str) -> Map<String, Value> {
        object(json!({
            "leaveType": "Annual",
            "startDate": start,
            "endDate": end,
            "isHalfDay": false,
            "reason": "Family trip planned months ago"
        }))
    }

    fn pending(code: &str) -> Record {
        record(
            Resource::LeaveRequest,
            json!({ "employeeCode": code, "status": "Pending", "leaveType": "Annual" }),
        )
    }

    #[tokio::test]
    async fn test_create_counts_working_days() {
        let me = employee("EMP007");
        let mut records = MockRecordRepository::new();
        records
            .expect_find_by_key()
            .returning(move |_, _| Ok(Some(me.clone())));
        records
            .expect_find_all()
            .with(eq(Resource::LeaveRequest), always())
            .returning(|_, _| Ok(vec![]));
        records.expect_insert().returning(Ok);

        let created = manager(records)
            .create(
                &actor(UserRole::Employee, "EMP007"),
                request("2024-01-05", "2024-01-09"),
            )
            .await
            .unwrap();

        assert_eq!(created["days"], json!(3.0));
        assert_eq!(created["status"], json!("Pending"));
        assert_eq!(created["employeeCode"], json!("EMP007"));
        assert_eq!(created["employeeName"], json!("Jane Doe"));
    }

    #[tokio::test]
    async fn test_create_rejects_overlap() {
        let me = employee("EMP007");
        let mut records = MockRecordRepository::new();
        records
            .expect_find_by_key()
            .returning(move |_, _| Ok(Some(me.clone())));
        records.expect_find_all().returning(|_, _| {
            Ok(vec![record(
                Resource::LeaveRequest,
                json!({ "status": "Approved", "startDate": "2024-01-08", "endDate": "2024-01-10" }),
            )])
        });
        records.expect_insert().never();

        let result = manager(records)
            .create(
                &actor(UserRole::Employee, "EMP007"),
                request("2024-01-05", "2024-01-09"),
            )
            .await;

        assert!(matches!(result, Err(AppError::InvalidState(_))));
    }

    #[tokio::test]
    async fn test_create_rejects_insufficient_balance() {
        let me = employee("EMP007");
        let mut records = MockRecordRepository::new();
        records
            .expect_find_by_key()
            .returning(move |_, _| Ok(Some(me.clone())));
        let mut calls = 0;
        records.expect_find_all().returning(move |_, _| {
            calls += 1;
            if calls == 1 {
                // overlap probe
                Ok(vec![])
            } else {
                Ok(vec![record(
                    Resource::LeaveRequest,
                    json!({ "status": "Approved", "days": 19.0, "leaveType": "Annual" }),
                )])
            }
        });
        records.expect_insert().never();

        let result = manager(records)
            .create(
                &actor(UserRole::Employee, "EMP007"),
                request("2024-03-04", "2024-03-05"),
            )
            .await;

        match result {
            Err(AppError::Validation { errors, message }) => {
                assert!(errors.contains("leaveType"));
                assert_eq!(message, "Insufficient Annual leave balance: 1 day(s) remaining");
            }
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_weekend_only_request_is_rejected() {
        let me = employee("EMP007");
        let mut records = MockRecordRepository::new();
        records
            .expect_find_by_key()
            .returning(move |_, _| Ok(Some(me.clone())));

        let result = manager(records)
            .create(
                &actor(UserRole::Employee, "EMP007"),
                request("2024-01-06", "2024-01-07"),
            )
            .await;

        assert!(matches!(result, Err(AppError::Validation { .. })));
    }

    #[test]
    fn test_apply_decision_stamps_approver() {
        let mut leave = pending("EMP007");
        let approver = actor(UserRole::Manager, "EMP100");
        let decision = LeaveDecision {
            status: "Rejected".into(),
            comments: Some("Release week".into()),
        };

        apply_decision(&mut leave, &approver, &decision).unwrap();

        assert_eq!(leave.text("status"), Some("Rejected"));
        assert_eq!(leave.text("approverComments"), Some("Release week"));
        assert_eq!(leave.text("approvedBy"), Some(approver.user_id.to_string().as_str()));
    }

    #[test]
    fn test_cannot_approve_own_request() {
        let mut leave = pending("EMP100");
        let decision = LeaveDecision {
            status: "Approved".into(),
            comments: None,
        };

        let result = apply_decision(&mut leave, &actor(UserRole::Manager, "EMP100"), &decision);

        assert!(matches!(result, Err(AppError::NotPermitted(_))));
    }

    #[test]
    fn test_decided_request_is_final() {
        let mut leave = pending("EMP007");
        leave.set("status", "Rejected");
        let decision = LeaveDecision {
            status: "Approved".into(),
            comments: None,
        };

        let result = apply_decision(&mut leave, &actor(UserRole::Hr, "EMP100"), &decision);

        assert!(matches!(result, Err(AppError::InvalidState(_))));
    }

    #[tokio::test]
    async fn test_employee_cannot_read_someone_elses_request() {
        let leave = pending("EMP008");
        let id = leave.id;
        let mut records = MockRecordRepository::new();
        records
            .expect_find_by_id()
            .with(eq(Resource::LeaveRequest), eq(id))
            .returning(move |_, _| Ok(Some(leave.clone())));

        let result = manager(records)
            .get(&actor(UserRole::Employee, "EMP007"), id)
            .await;

        assert!(matches!(result, Err(AppError::Forbidden)));
    }

    #[tokio::test]
    async fn test_balance_reports_every_type() {
        let me = employee("EMP007");
        let mut records = MockRecordRepository::new();
        records
            .expect_find_by_key()
            .returning(move |_, _| Ok(Some(me.clone())));
        records.expect_find_all().returning(|_, _| {
            Ok(vec![record(
                Resource::LeaveRequest,
                json!({ "leaveType": "Sick", "status": "Approved", "days": 2.0 }),
            )])
        });

        let balance = manager(records)
            .balance(
                &actor(UserRole::Employee, "EMP007"),
                object(json!({ "year": 2024 })),
            )
            .await
            .unwrap();

        assert_eq!(balance["year"], json!(2024));
        let sick = balance["balances"]
            .as_array()
            .unwrap()
            .iter()
            .find(|b| b["leaveType"] == json!("Sick"))
            .unwrap();
        assert_eq!(sick["remaining"], json!(8.0));
    }

    #[tokio::test]
    async fn test_calendar_lists_overlapping_entries() {
        let mut records = MockRecordRepository::new();
        records.expect_find_all().returning(|_, _| {
            Ok(vec![
                record(
                    Resource::LeaveRequest,
                    json!({ "status": "Approved", "startDate": "2024-02-27", "endDate": "2024-03-02" }),
                ),
                record(
                    Resource::LeaveRequest,
                    json!({ "status": "Approved", "startDate": "2024-04-01", "endDate": "2024-04-02" }),
                ),
            ])
        });

        let calendar = manager(records)
            .calendar(
                &actor(UserRole::Employee, "EMP007"),
                object(json!({ "startDate": "2024-03-01", "endDate": "2024-03-31" })),
            )
            .await
            .unwrap();

        assert_eq!(calendar["entries"].as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_employee_calendar_shows_only_own_leave() {
        let expected = RecordFilter::new()
            .one_of("status", ACTIVE_STATUSES)
            .lte("startDate", "2024-03-31")
            .gte("endDate", "2024-03-01")
            .eq("employeeCode", "EMP007");
        let mut records = MockRecordRepository::new();
        records
            .expect_find_all()
            .with(eq(Resource::LeaveRequest), eq(expected))
            .times(1)
            .returning(|_, _| Ok(vec![]));

        let calendar = manager(records)
            .calendar(
                &actor(UserRole::Employee, "EMP007"),
                object(json!({ "startDate": "2024-03-01", "endDate": "2024-03-31" })),
            )
            .await
            .unwrap();

        assert!(calendar["entries"].as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_approver_calendar_covers_everyone() {
        let expected = RecordFilter::new()
            .one_of("status", ACTIVE_STATUSES)
            .lte("startDate", "2024-03-31")
            .gte("endDate", "2024-03-01");
        let mut records = MockRecordRepository::new();
        records
            .expect_find_all()
            .with(eq(Resource::LeaveRequest), eq(expected))
            .times(1)
            .returning(|_, _| Ok(vec![]));

        manager(records)
            .calendar(
                &actor(UserRole::Manager, "EMP001"),
                object(json!({ "startDate": "2024-03-01", "endDate": "2024-03-31" })),
            )
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_bulk_update_runs_in_a_transaction() {
        let result = manager(MockRecordRepository::new())
            .bulk_update(
                &actor(UserRole::Hr, "EMP100"),
                vec![Uuid::new_v4()],
                LeaveDecision {
                    status: "Approved".into(),
                    comments: None,
                },
            )
            .await;

        // The test unit of work refuses transactions, so nothing is written
        assert!(matches!(result, Err(AppError::Internal(_))));
    }
}
