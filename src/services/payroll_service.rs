//! Payslip generation.

use async_trait::async_trait;
use chrono::Utc;
use serde_json::{json, Value};
use std::sync::Arc;
use uuid::Uuid;

use super::scope::ensure_visible;
use crate::config::DEFAULT_CURRENCY;
use crate::domain::payroll::{self, PayPeriod};
use crate::domain::record::{full_name, payslip_key};
use crate::domain::{Actor, Record, Resource};
use crate::errors::{AppError, AppResult, OptionExt};
use crate::infra::UnitOfWork;
use crate::validation::{format_date, ErrorCode};

/// Inputs of one payslip run, already validated.
#[derive(Debug, Clone, PartialEq)]
pub struct PayslipRequest {
    pub employee_id: Uuid,
    pub month: u32,
    pub year: i32,
    pub lop_days: f64,
    pub bonus: f64,
}

#[async_trait]
pub trait PayrollService: Send + Sync {
    async fn generate(&self, request: PayslipRequest) -> AppResult<Value>;

    async fn get(&self, actor: &Actor, id: Uuid) -> AppResult<Value>;
}

pub struct PayrollManager<U: UnitOfWork> {
    uow: Arc<U>,
}

impl<U: UnitOfWork> PayrollManager<U> {
    pub fn new(uow: Arc<U>) -> Self {
        Self { uow }
    }
}

#[async_trait]
impl<U: UnitOfWork> PayrollService for PayrollManager<U> {
    async fn generate(&self, request: PayslipRequest) -> AppResult<Value> {
        let records = self.uow.records();
        let employee = records
            .find_by_id(Resource::Employee, request.employee_id)
            .await?
            .ok_or_missing("Employee")?;
        let salary = employee.object("salary").ok_or_else(|| {
            AppError::invalid_state("Employee has no salary structure")
        })?;

        let employee_id = employee.id.to_string();
        let key = payslip_key(&employee_id, i64::from(request.year), i64::from(request.month));
        if records.find_by_key(Resource::Payslip, &key).await?.is_some() {
            return Err(AppError::conflict(Resource::Payslip.key_label()));
        }

        let period = PayPeriod {
            year: request.year,
            month: request.month,
            lop_days: request.lop_days,
            bonus: request.bonus,
        };
        let breakdown = payroll::compute(salary, period).ok_or_else(|| {
            AppError::field("basicSalary", ErrorCode::Required, "\"salary.basicSalary\" is required")
        })?;
        if request.lop_days > f64::from(breakdown.days_in_period) {
            return Err(AppError::field(
                "lopDays",
                ErrorCode::NumberMax,
                format!(
                    "\"lopDays\" must be less than or equal to {}",
                    breakdown.days_in_period
                ),
            ));
        }
        let (start, end) = payroll::period_bounds(request.year, request.month)
            .ok_or_else(|| AppError::field("month", ErrorCode::NumberMax, "\"month\" is invalid"))?;

        let mut data = match serde_json::to_value(&breakdown) {
            Ok(Value::Object(map)) => map,
            _ => return Err(AppError::internal("payslip breakdown is not an object")),
        };
        data.insert("employeeId".into(), json!(employee_id));
        data.insert("employeeCode".into(), json!(employee.text("employeeId")));
        data.insert("employeeName".into(), json!(full_name(&employee)));
        if let Some(department) = employee.data.get("departmentId") {
            data.insert("departmentId".into(), department.clone());
        }
        data.insert("month".into(), json!(request.month));
        data.insert("year".into(), json!(request.year));
        data.insert("periodStart".into(), json!(format_date(start)));
        data.insert("periodEnd".into(), json!(format_date(end)));
        data.insert(
            "currency".into(),
            salary.get("currency").cloned().unwrap_or(json!(DEFAULT_CURRENCY)),
        );
        data.insert("generatedAt".into(), json!(Utc::now().to_rfc3339()));

        let record = records.insert(Record::new(Resource::Payslip, data)).await?;
        tracing::info!(
            payslip_id = %record.id,
            employee = %request.employee_id,
            period = %key,
            "payslip generated"
        );
        Ok(record.to_json())
    }

    async fn get(&self, actor: &Actor, id: Uuid) -> AppResult<Value> {
        let record = self
            .uow
            .records()
            .find_by_id(Resource::Payslip, id)
            .await?
            .ok_or_missing(Resource::Payslip.label())?;
        ensure_visible(actor, &record)?;
        Ok(record.to_json())
    }
}
