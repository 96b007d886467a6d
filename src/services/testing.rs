//! Fixtures shared by the service unit tests.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use serde_json::{json, Map, Value};
use uuid::Uuid;

use crate::domain::{Actor, Record, Resource, User, UserRole};
use crate::errors::{AppError, AppResult};
use crate::infra::{
    MockRecordRepository, MockUserRepository, RecordRepository, TransactionContext, UnitOfWork,
    UserRepository,
};

/// Test UnitOfWork that wraps mock repositories
pub struct TestUnitOfWork {
    user_repo: Arc<MockUserRepository>,
    record_repo: Arc<MockRecordRepository>,
}

impl TestUnitOfWork {
    pub fn new(users: MockUserRepository, records: MockRecordRepository) -> Self {
        Self {
            user_repo: Arc::new(users),
            record_repo: Arc::new(records),
        }
    }

    pub fn with_records(records: MockRecordRepository) -> Self {
        Self::new(MockUserRepository::new(), records)
    }
}

#[async_trait]
impl UnitOfWork for TestUnitOfWork {
    fn users(&self) -> Arc<dyn UserRepository> {
        self.user_repo.clone()
    }

    fn records(&self) -> Arc<dyn RecordRepository> {
        self.record_repo.clone()
    }

    async fn transaction<F, T>(&self, _f: F) -> AppResult<T>
    where
        F: for<'a> FnOnce(TransactionContext<'a>) -> std::pin::Pin<
                Box<dyn std::future::Future<Output = AppResult<T>> + Send + 'a>,
            > + Send,
        T: Send,
    {
        // Transaction not supported in test mock
        Err(AppError::internal("Transactions not supported in test mock"))
    }
}

pub fn user(role: UserRole) -> User {
    User {
        id: Uuid::new_v4(),
        employee_code: "EMP001".to_string(),
        username: "jane_doe".to_string(),
        email: "hr@example.com".to_string(),
        password_hash: "hashed".to_string(),
        role,
        is_active: true,
        last_login_at: None,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

pub fn actor(role: UserRole, employee_code: &str) -> Actor {
    Actor {
        user_id: Uuid::new_v4(),
        employee_code: employee_code.to_string(),
        role,
    }
}

pub fn object(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        other => panic!("expected an object, got {}", other),
    }
}

pub fn record(resource: Resource, data: Value) -> Record {
    Record::new(resource, object(data))
}

pub fn employee(code: &str) -> Record {
    record(
        Resource::Employee,
        json!({
            "employeeId": code,
            "firstName": "Jane",
            "lastName": "Doe",
            "departmentId": Uuid::new_v4().to_string(),
            "status": "Active",
            "hireDate": "2020-01-15",
            "salary": {
                "basicSalary": 30000,
                "currency": "INR",
                "payFrequency": "Monthly",
                "allowances": { "hra": 12000 },
                "deductions": { "providentFund": 1800 }
            }
        }),
    )
}
