//! Application state - Dependency injection container.
//!
//! Provides centralized access to all application services and infrastructure.

use std::sync::Arc;

use crate::config::Config;
use crate::infra::Database;
use crate::services::admin::AdminServices;
use crate::services::{
    AuthService, LeaveService, PayrollService, RecordService, ServiceContainer, Services,
    TimesheetService,
};

/// Application state containing all services (DI container).
#[derive(Clone)]
pub struct AppState {
    pub auth_service: Arc<dyn AuthService>,
    /// Employees, departments and positions
    pub record_service: Arc<dyn RecordService>,
    pub leave_service: Arc<dyn LeaveService>,
    pub timesheet_service: Arc<dyn TimesheetService>,
    pub payroll_service: Arc<dyn PayrollService>,
    /// Debug console; `None` in production
    pub admin: Option<AdminServices>,
    /// Database connection, pinged by the health check
    pub database: Option<Arc<Database>>,
}

impl AppState {
    /// Create application state from database connection and config.
    pub fn from_config(database: Arc<Database>, config: Config) -> Self {
        let container = Services::from_connection(database.get_connection(), config);
        Self::from_container(&container).with_database(database)
    }

    /// Create application state from any service container.
    pub fn from_container(container: &dyn ServiceContainer) -> Self {
        Self {
            auth_service: container.auth(),
            record_service: container.records(),
            leave_service: container.leaves(),
            timesheet_service: container.timesheets(),
            payroll_service: container.payroll(),
            admin: container.admin(),
            database: None,
        }
    }

    pub fn with_database(mut self, database: Arc<Database>) -> Self {
        self.database = Some(database);
        self
    }
}
