//! HRM resources stored as validated JSON documents.

use chrono::{DateTime, NaiveDate, Utc};
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::validation::parse_date;

/// Kinds of record the API manages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Resource {
    Employee,
    Department,
    Position,
    LeaveRequest,
    Timesheet,
    Payslip,
}

impl Resource {
    /// Value stored in the `resource` column
    pub fn as_str(&self) -> &'static str {
        match self {
            Resource::Employee => "employee",
            Resource::Department => "department",
            Resource::Position => "position",
            Resource::LeaveRequest => "leave_request",
            Resource::Timesheet => "timesheet",
            Resource::Payslip => "payslip",
        }
    }

    /// Human name used in error messages
    pub fn label(&self) -> &'static str {
        match self {
            Resource::Employee => "Employee",
            Resource::Department => "Department",
            Resource::Position => "Position",
            Resource::LeaveRequest => "Leave request",
            Resource::Timesheet => "Timesheet",
            Resource::Payslip => "Payslip",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        [
            Resource::Employee,
            Resource::Department,
            Resource::Position,
            Resource::LeaveRequest,
            Resource::Timesheet,
            Resource::Payslip,
        ]
        .into_iter()
        .find(|r| r.as_str() == raw)
    }

    /// Business key that must be unique within the resource, if any.
    pub fn natural_key(&self, data: &Map<String, Value>) -> Option<String> {
        let text = |key: &str| data.get(key).and_then(Value::as_str);
        match self {
            Resource::Employee => text("employeeId").map(str::to_string),
            Resource::Department => text("code").map(str::to_string),
            Resource::Timesheet => {
                Some(format!("{}:{}", text("employeeId")?, text("weekStartDate")?))
            }
            Resource::Payslip => {
                let month = data.get("month").and_then(Value::as_i64)?;
                let year = data.get("year").and_then(Value::as_i64)?;
                Some(payslip_key(text("employeeId")?, year, month))
            }
            Resource::Position | Resource::LeaveRequest => None,
        }
    }

    /// Field named in the 409 message when the natural key collides
    pub fn key_label(&self) -> &'static str {
        match self {
            Resource::Employee => "Employee with this employeeId",
            Resource::Department => "Department with this code",
            Resource::Timesheet => "Timesheet for this week",
            Resource::Payslip => "Payslip for this period",
            Resource::Position | Resource::LeaveRequest => self.label(),
        }
    }
}

impl std::fmt::Display for Resource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

pub fn payslip_key(employee_id: &str, year: i64, month: i64) -> String {
    format!("{}:{}-{:02}", employee_id, year, month)
}

/// A stored resource document.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub id: Uuid,
    pub resource: Resource,
    pub natural_key: Option<String>,
    pub data: Map<String, Value>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Record {
    pub fn new(resource: Resource, data: Map<String, Value>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            resource,
            natural_key: resource.natural_key(&data),
            data,
            created_at: now,
            updated_at: now,
        }
    }

    /// Shallow-merge validated changes; nested objects are replaced whole.
    pub fn apply(&mut self, changes: Map<String, Value>) {
        self.data.extend(changes);
        self.natural_key = self.resource.natural_key(&self.data);
        self.updated_at = Utc::now();
    }

    pub fn set(&mut self, key: &str, value: impl Into<Value>) {
        self.data.insert(key.to_string(), value.into());
        self.updated_at = Utc::now();
    }

    pub fn text(&self, key: &str) -> Option<&str> {
        self.data.get(key).and_then(Value::as_str)
    }

    pub fn number(&self, key: &str) -> Option<f64> {
        self.data.get(key).and_then(Value::as_f64)
    }

    pub fn date(&self, key: &str) -> Option<NaiveDate> {
        self.text(key).and_then(parse_date)
    }

    pub fn object(&self, key: &str) -> Option<&Map<String, Value>> {
        self.data.get(key).and_then(Value::as_object)
    }

    /// Client representation: `id`, the document fields, then timestamps.
    pub fn to_json(&self) -> Value {
        let mut out = Map::with_capacity(self.data.len() + 3);
        out.insert("id".into(), Value::String(self.id.to_string()));
        for (key, value) in &self.data {
            out.insert(key.clone(), value.clone());
        }
        out.insert("createdAt".into(), Value::String(self.created_at.to_rfc3339()));
        out.insert("updatedAt".into(), Value::String(self.updated_at.to_rfc3339()));
        Value::Object(out)
    }
}

impl From<Record> for Value {
    fn from(record: Record) -> Self {
        record.to_json()
    }
}

/// Display name of an employee record, `first last`.
pub fn full_name(employee: &Record) -> String {
    match (employee.text("firstName"), employee.text("lastName")) {
        (Some(first), Some(last)) => format!("{} {}", first, last),
        (Some(first), None) => first.to_string(),
        _ => employee.text("employeeId").unwrap_or_default().to_string(),
    }
}
