//! Directory records: employees, departments and positions.
//!
//! Payloads arrive already normalized by their request schema. This service
//! adds what a schema cannot check alone: referenced records must exist and
//! natural keys must stay unique.

use async_trait::async_trait;
use serde_json::{Map, Value};
use std::sync::Arc;
use uuid::Uuid;

use crate::domain::{Record, Resource};
use crate::errors::{AppError, AppResult, OptionExt};
use crate::infra::{RecordFilter, UnitOfWork};
use crate::types::{Paginated, PaginationParams};
use crate::validation::ErrorCode;

/// Record service trait for dependency injection.
#[async_trait]
pub trait RecordService: Send + Sync {
    async fn list(&self, resource: Resource, query: Map<String, Value>)
        -> AppResult<Paginated<Value>>;

    async fn get(&self, resource: Resource, id: Uuid) -> AppResult<Value>;

    async fn create(&self, resource: Resource, input: Map<String, Value>) -> AppResult<Value>;

    async fn update(
        &self,
        resource: Resource,
        id: Uuid,
        input: Map<String, Value>,
    ) -> AppResult<Value>;

    async fn delete(&self, resource: Resource, id: Uuid) -> AppResult<()>;
}

/// Fields holding the id of another record.
fn references(resource: Resource) -> &'static [(&'static str, Resource)] {
    match resource {
        Resource::Employee => &[
            ("departmentId", Resource::Department),
            ("positionId", Resource::Position),
            ("managerId", Resource::Employee),
        ],
        Resource::Department => &[("managerId", Resource::Employee)],
        Resource::Position => &[("departmentId", Resource::Department)],
        _ => &[],
    }
}

fn list_filter(resource: Resource, query: &Map<String, Value>) -> RecordFilter {
    let mut filter = match resource {
        Resource::Employee => RecordFilter::new().eq_from(
            query,
            &["departmentId", "positionId", "status", "employmentType"],
        ),
        _ => RecordFilter::new(),
    };

    if let Some(active) = query.get("isActive").and_then(Value::as_bool) {
        filter = filter.eq("isActive", active.to_string());
    }
    if let Some(term) = query.get("search").and_then(Value::as_str) {
        filter = match resource {
            Resource::Department => filter.search(&["name", "code"], term),
            Resource::Position => filter.search(&["title"], term),
            _ => filter.search(&["firstName", "lastName", "email", "employeeId"], term),
        };
    }
    filter
}

/// `salary.effectiveFrom` falls back to the hire date.
fn default_effective_from(data: &mut Map<String, Value>) {
    let hire_date = data.get("hireDate").cloned();
    if let (Some(Value::Object(salary)), Some(hire_date)) = (data.get_mut("salary"), hire_date) {
        salary.entry("effectiveFrom").or_insert(hire_date);
    }
}

/// A position's salary band must stay ordered after a partial update.
fn check_salary_band(record: &Record) -> AppResult<()> {
    match (record.number("minSalary"), record.number("maxSalary")) {
        (Some(min), Some(max)) if max < min => Err(AppError::field(
            "maxSalary",
            ErrorCode::NumberMin,
            "\"maxSalary\" must be greater than or equal to \"minSalary\"",
        )),
        _ => Ok(()),
    }
}

/// Concrete implementation of RecordService using Unit of Work.
pub struct RecordManager<U: UnitOfWork> {
    uow: Arc<U>,
}

impl<U: UnitOfWork> RecordManager<U> {
    pub fn new(uow: Arc<U>) -> Self {
        Self { uow }
    }

    /// Every referenced id in `data` must name a live record.
    async fn check_references(
        &self,
        resource: Resource,
        data: &Map<String, Value>,
        own_id: Option<Uuid>,
    ) -> AppResult<()> {
        for (field, target) in references(resource) {
            let Some(raw) = data.get(*field).and_then(Value::as_str) else {
                continue;
            };
            let id = Uuid::parse_str(raw).map_err(|_| {
                AppError::field(*field, ErrorCode::Guid, format!("\"{}\" must be a valid GUID", field))
            })?;
            if own_id == Some(id) && *target == resource {
                return Err(AppError::field(
                    *field,
                    ErrorCode::Custom,
                    format!("\"{}\" cannot reference the record itself", field),
                ));
            }
            if self.uow.records().find_by_id(*target, id).await?.is_none() {
                return Err(AppError::field(
                    *field,
                    ErrorCode::Custom,
                    format!("{} not found", target.label()),
                ));
            }
        }
        Ok(())
    }

    /// 409 when another live record already holds the key.
    async fn check_key_free(&self, record: &Record) -> AppResult<()> {
        let Some(key) = record.natural_key.as_deref() else {
            return Ok(());
        };
        match self.uow.records().find_by_key(record.resource, key).await? {
            Some(other) if other.id != record.id => {
                Err(AppError::conflict(record.resource.key_label()))
            }
            _ => Ok(()),
        }
    }

    async fn find(&self, resource: Resource, id: Uuid) -> AppResult<Record> {
        self.uow
            .records()
            .find_by_id(resource, id)
            .await?
            .ok_or_missing(resource.label())
    }
}

#[async_trait]
impl<U: UnitOfWork> RecordService for RecordManager<U> {
    async fn list(
        &self,
        resource: Resource,
        query: Map<String, Value>,
    ) -> AppResult<Paginated<Value>> {
        let page = PaginationParams::from_query(&query);
        let filter = list_filter(resource, &query);
        let (records, total) = self.uow.records().list(resource, &filter, page).await?;

        Ok(Paginated::new(
            records.into_iter().map(Value::from).collect(),
            page,
            total,
        ))
    }

    async fn get(&self, resource: Resource, id: Uuid) -> AppResult<Value> {
        Ok(self.find(resource, id).await?.to_json())
    }

    async fn create(&self, resource: Resource, mut input: Map<String, Value>) -> AppResult<Value> {
        if resource == Resource::Employee {
            default_effective_from(&mut input);
        }
        self.check_references(resource, &input, None).await?;

        let record = Record::new(resource, input);
        self.check_key_free(&record).await?;

        let record = self.uow.records().insert(record).await?;
        tracing::info!(resource = %resource, id = %record.id, "record created");
        Ok(record.to_json())
    }

    async fn update(
        &self,
        resource: Resource,
        id: Uuid,
        input: Map<String, Value>,
    ) -> AppResult<Value> {
        let mut record = self.find(resource, id).await?;
        self.check_references(resource, &input, Some(id)).await?;

        record.apply(input);
        if resource == Resource::Employee {
            default_effective_from(&mut record.data);
        }
        if resource == Resource::Position {
            check_salary_band(&record)?;
        }
        self.check_key_free(&record).await?;

        let record = self.uow.records().update(record).await?;
        tracing::info!(resource = %resource, id = %id, "record updated");
        Ok(record.to_json())
    }

    async fn delete(&self, resource: Resource, id: Uuid) -> AppResult<()> {
        if resource == Resource::Department {
            let filter = RecordFilter::new().eq("departmentId", id.to_string());
            let page = PaginationParams::new(1, 1);
            let (_, staff) = self.uow.records().list(Resource::Employee, &filter, page).await?;
            if staff > 0 {
                return Err(AppError::invalid_state(format!(
                    "Department has {} employee(s) and cannot be deleted",
                    staff
                )));
            }
        }

        self.uow.records().delete(resource, id).await?;
        tracing::info!(resource = %resource, id = %id, "record deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use mockall::predicate::{always, eq};
    use serde_json::json;

    use super::*;
    use crate::infra::MockRecordRepository;
    use crate::services::testing::{employee, object, record, TestUnitOfWork};

    fn manager(records: MockRecordRepository) -> RecordManager<TestUnitOfWork> {
        RecordManager::new(Arc::new(TestUnitOfWork::with_records(records)))
    }

    fn employee_input(department: Uuid, position: Uuid) -> Map<String, Value> {
        object(json!({
            "employeeId": "EMP1001",
            "firstName": "Jane",
            "lastName": "Doe",
            "departmentId": department.to_string(),
            "positionId": position.to_string(),
            "hireDate": "2022-03-01",
            "salary": { "basicSalary": 50000, "currency": "INR" }
        }))
    }

    #[tokio::test]
    async fn test_create_employee_defaults_effective_from() {
        let (department, position) = (Uuid::new_v4(), Uuid::new_v4());

        let mut records = MockRecordRepository::new();
        records
            .expect_find_by_id()
            .returning(|resource, _| Ok(Some(record(resource, json!({})))));
        records
            .expect_find_by_key()
            .with(eq(Resource::Employee), eq("EMP1001"))
            .returning(|_, _| Ok(None));
        records.expect_insert().returning(Ok);

        let created = manager(records)
            .create(Resource::Employee, employee_input(department, position))
            .await
            .unwrap();

        assert_eq!(created["salary"]["effectiveFrom"], json!("2022-03-01"));
        assert_eq!(created["employeeId"], json!("EMP1001"));
        assert!(created["id"].is_string());
    }

    #[tokio::test]
    async fn test_create_employee_unknown_department_is_field_error() {
        let (department, position) = (Uuid::new_v4(), Uuid::new_v4());

        let mut records = MockRecordRepository::new();
        records
            .expect_find_by_id()
            .with(eq(Resource::Department), eq(department))
            .returning(|_, _| Ok(None));
        records.expect_insert().never();

        let result = manager(records)
            .create(Resource::Employee, employee_input(department, position))
            .await;

        match result {
            Err(AppError::Validation { errors, message }) => {
                assert!(errors.contains("departmentId"));
                assert_eq!(message, "Department not found");
            }
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_duplicate_employee_code_conflicts() {
        let mut records = MockRecordRepository::new();
        records
            .expect_find_by_id()
            .returning(|resource, _| Ok(Some(record(resource, json!({})))));
        records
            .expect_find_by_key()
            .returning(|_, _| Ok(Some(employee("EMP1001"))));
        records.expect_insert().never();

        let result = manager(records)
            .create(
                Resource::Employee,
                employee_input(Uuid::new_v4(), Uuid::new_v4()),
            )
            .await;

        match result {
            Err(err @ AppError::Conflict(_)) => assert_eq!(
                err.to_string(),
                "Employee with this employeeId already exists"
            ),
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_update_position_keeps_salary_band_ordered() {
        let existing = record(
            Resource::Position,
            json!({ "title": "Engineer", "minSalary": 40000, "maxSalary": 80000 }),
        );
        let id = existing.id;

        let mut records = MockRecordRepository::new();
        records
            .expect_find_by_id()
            .with(eq(Resource::Position), eq(id))
            .returning(move |_, _| Ok(Some(existing.clone())));
        records.expect_update().never();

        let result = manager(records)
            .update(Resource::Position, id, object(json!({ "maxSalary": 30000 })))
            .await;

        assert!(matches!(result, Err(AppError::Validation { .. })));
    }

    #[tokio::test]
    async fn test_get_missing_names_resource() {
        let mut records = MockRecordRepository::new();
        records.expect_find_by_id().returning(|_, _| Ok(None));

        let result = manager(records).get(Resource::Department, Uuid::new_v4()).await;

        assert_eq!(result.unwrap_err().to_string(), "Department not found");
    }

    #[tokio::test]
    async fn test_department_with_staff_cannot_be_deleted() {
        let mut records = MockRecordRepository::new();
        records
            .expect_list()
            .with(eq(Resource::Employee), always(), always())
            .returning(|_, _, _| Ok((vec![], 3)));
        records.expect_delete().never();

        let result = manager(records).delete(Resource::Department, Uuid::new_v4()).await;

        assert!(matches!(result, Err(AppError::InvalidState(_))));
    }

    #[tokio::test]
    async fn test_list_wraps_pagination() {
        let mut records = MockRecordRepository::new();
        records
            .expect_list()
            .returning(|_, _, _| Ok((vec![employee("EMP001")], 41)));

        let page = manager(records)
            .list(Resource::Employee, object(json!({ "page": 2, "limit": 20 })))
            .await
            .unwrap();

        assert_eq!(page.items.len(), 1);
        assert_eq!(page.pagination.total_pages, 3);
    }
}
