//! Service Container - Centralized service access.
//!
//! Manages service lifecycle and hands out trait objects, so handlers
//! depend on service traits rather than implementations.

use std::sync::Arc;

use super::admin::{AdminServices, DatabaseInspector, DotenvConfig, LogReader};
use super::{AuthService, LeaveService, PayrollService, RecordService, TimesheetService};
use crate::config::Config;
use crate::infra::Persistence;

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Service container trait for dependency injection.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
pub trait ServiceContainer: Send + Sync {
    fn auth(&self) -> Arc<dyn AuthService>;

    /// Employees, departments and positions
    fn records(&self) -> Arc<dyn RecordService>;

    fn leaves(&self) -> Arc<dyn LeaveService>;

    fn timesheets(&self) -> Arc<dyn TimesheetService>;

    fn payroll(&self) -> Arc<dyn PayrollService>;

    /// Debug console services; `None` in production
    fn admin(&self) -> Option<AdminServices>;
}

/// Concrete implementation of ServiceContainer
#[derive(Clone)]
pub struct Services {
    auth_service: Arc<dyn AuthService>,
    record_service: Arc<dyn RecordService>,
    leave_service: Arc<dyn LeaveService>,
    timesheet_service: Arc<dyn TimesheetService>,
    payroll_service: Arc<dyn PayrollService>,
    admin_services: Option<AdminServices>,
}

impl Services {
    /// Create a service container from already-built services
    pub fn new(
        auth_service: Arc<dyn AuthService>,
        record_service: Arc<dyn RecordService>,
        leave_service: Arc<dyn LeaveService>,
        timesheet_service: Arc<dyn TimesheetService>,
        payroll_service: Arc<dyn PayrollService>,
    ) -> Self {
        Self {
            auth_service,
            record_service,
            leave_service,
            timesheet_service,
            payroll_service,
            admin_services: None,
        }
    }

    pub fn with_admin(mut self, admin: AdminServices) -> Self {
        self.admin_services = Some(admin);
        self
    }

    /// Create service container from database connection and config.
    ///
    /// Admin services are only wired outside production.
    pub fn from_connection(db: sea_orm::DatabaseConnection, config: Config) -> Self {
        use super::{Authenticator, LeaveManager, PayrollManager, RecordManager, TimesheetManager};

        let admin = (!config.is_production()).then(|| AdminServices {
            config: Arc::new(DotenvConfig::new(config.admin_config_path.clone())),
            logs: Arc::new(LogReader::new(config.log_dir.clone())),
            database: Arc::new(DatabaseInspector::new(db.clone())),
        });

        let uow = Arc::new(Persistence::new(db));
        let services = Self::new(
            Arc::new(Authenticator::new(uow.clone(), config)),
            Arc::new(RecordManager::new(uow.clone())),
            Arc::new(LeaveManager::new(uow.clone())),
            Arc::new(TimesheetManager::new(uow.clone())),
            Arc::new(PayrollManager::new(uow)),
        );

        match admin {
            Some(admin) => services.with_admin(admin),
            None => services,
        }
    }
}

impl ServiceContainer for Services {
    fn auth(&self) -> Arc<dyn AuthService> {
        self.auth_service.clone()
    }

    fn records(&self) -> Arc<dyn RecordService> {
        self.record_service.clone()
    }

    fn leaves(&self) -> Arc<dyn LeaveService> {
        self.leave_service.clone()
    }

    fn timesheets(&self) -> Arc<dyn TimesheetService> {
        self.timesheet_service.clone()
    }

    fn payroll(&self) -> Arc<dyn PayrollService> {
        self.payroll_service.clone()
    }

    fn admin(&self) -> Option<AdminServices> {
        self.admin_services.clone()
    }
}

#[cfg(test)]
mod tests {
    use sea_orm::{DatabaseBackend, MockDatabase};

    use super::*;

    fn connection() -> sea_orm::DatabaseConnection {
        MockDatabase::new(DatabaseBackend::Postgres).into_connection()
    }

    #[test]
    fn test_admin_services_outside_production() {
        let config = Config::new("postgres://localhost/hrm", "x".repeat(40));

        let services = Services::from_connection(connection(), config);

        assert!(services.admin().is_some());
    }

    #[test]
    fn test_no_admin_services_in_production() {
        let mut config = Config::new("postgres://localhost/hrm", "x".repeat(40));
        config.app_env = "production".to_string();

        let services = Services::from_connection(connection(), config);

        assert!(services.admin().is_none());
    }
}
