//! Process-wide schema registry.
//!
//! Built once on first use and only ever handed out by shared reference.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use once_cell::sync::Lazy;

use super::error::UnknownSchema;
use super::rules::Schema;
use super::schemas;

/// Names of every registered schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SchemaName {
    Login,
    Register,
    ChangePassword,
    CreateEmployee,
    UpdateEmployee,
    EmployeeQuery,
    CreateDepartment,
    UpdateDepartment,
    CreatePosition,
    UpdatePosition,
    IdParam,
    ListQuery,
    CreateLeaveRequest,
    UpdateLeaveStatus,
    LeaveQuery,
    LeaveBalance,
    BulkLeaveApproval,
    LeaveCalendar,
    TimesheetEntry,
    CreateTimesheet,
    BulkSubmitTimesheets,
    UpdateTimesheetStatus,
    TimesheetQuery,
    GeneratePayslip,
    UpdateConfig,
    LogQuery,
    TableQuery,
    ExecuteQuery,
}

impl SchemaName {
    pub const ALL: [SchemaName; 28] = [
        Self::Login,
        Self::Register,
        Self::ChangePassword,
        Self::CreateEmployee,
        Self::UpdateEmployee,
        Self::EmployeeQuery,
        Self::CreateDepartment,
        Self::UpdateDepartment,
        Self::CreatePosition,
        Self::UpdatePosition,
        Self::IdParam,
        Self::ListQuery,
        Self::CreateLeaveRequest,
        Self::UpdateLeaveStatus,
        Self::LeaveQuery,
        Self::LeaveBalance,
        Self::BulkLeaveApproval,
        Self::LeaveCalendar,
        Self::TimesheetEntry,
        Self::CreateTimesheet,
        Self::BulkSubmitTimesheets,
        Self::UpdateTimesheetStatus,
        Self::TimesheetQuery,
        Self::GeneratePayslip,
        Self::UpdateConfig,
        Self::LogQuery,
        Self::TableQuery,
        Self::ExecuteQuery,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Login => "login",
            Self::Register => "register",
            Self::ChangePassword => "changePassword",
            Self::CreateEmployee => "createEmployee",
            Self::UpdateEmployee => "updateEmployee",
            Self::EmployeeQuery => "employeeQuery",
            Self::CreateDepartment => "createDepartment",
            Self::UpdateDepartment => "updateDepartment",
            Self::CreatePosition => "createPosition",
            Self::UpdatePosition => "updatePosition",
            Self::IdParam => "idParam",
            Self::ListQuery => "listQuery",
            Self::CreateLeaveRequest => "createLeaveRequest",
            Self::UpdateLeaveStatus => "updateLeaveStatus",
            Self::LeaveQuery => "leaveQuery",
            Self::LeaveBalance => "leaveBalance",
            Self::BulkLeaveApproval => "bulkLeaveApproval",
            Self::LeaveCalendar => "leaveCalendar",
            Self::TimesheetEntry => "timesheetEntry",
            Self::CreateTimesheet => "createTimesheet",
            Self::BulkSubmitTimesheets => "bulkSubmitTimesheets",
            Self::UpdateTimesheetStatus => "updateTimesheetStatus",
            Self::TimesheetQuery => "timesheetQuery",
            Self::GeneratePayslip => "generatePayslip",
            Self::UpdateConfig => "updateConfig",
            Self::LogQuery => "logQuery",
            Self::TableQuery => "tableQuery",
            Self::ExecuteQuery => "executeQuery",
        }
    }
}

impl fmt::Display for SchemaName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SchemaName {
    type Err = UnknownSchema;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|name| name.as_str() == s)
            .ok_or_else(|| UnknownSchema(s.to_string()))
    }
}

/// Immutable name → schema map.
pub struct SchemaRegistry {
    schemas: HashMap<SchemaName, Schema>,
}

impl SchemaRegistry {
    fn build() -> Self {
        Self {
            schemas: schemas::all().into_iter().collect(),
        }
    }

    pub fn get(&self, name: SchemaName) -> Result<&Schema, UnknownSchema> {
        self.schemas
            .get(&name)
            .ok_or_else(|| UnknownSchema(name.to_string()))
    }

    pub fn get_by_name(&self, name: &str) -> Result<&Schema, UnknownSchema> {
        self.get(name.parse()?)
    }

    pub fn len(&self) -> usize {
        self.schemas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.schemas.is_empty()
    }
}

static REGISTRY: Lazy<SchemaRegistry> = Lazy::new(SchemaRegistry::build);

pub fn registry() -> &'static SchemaRegistry {
    &REGISTRY
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_name_is_registered() {
        for name in SchemaName::ALL {
            assert!(registry().get(name).is_ok(), "missing schema {}", name);
        }
        assert_eq!(registry().len(), SchemaName::ALL.len());
    }

    #[test]
    fn test_lookup_by_name() {
        assert!(registry().get_by_name("createEmployee").is_ok());

        let err = registry().get_by_name("doesNotExist").unwrap_err();
        assert_eq!(err, UnknownSchema("doesNotExist".to_string()));
    }

    #[test]
    fn test_names_round_trip() {
        for name in SchemaName::ALL {
            assert_eq!(name.as_str().parse::<SchemaName>().unwrap(), name);
        }
    }
}
