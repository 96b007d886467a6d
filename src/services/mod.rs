//! Application services layer - Use cases and business logic.
//!
//! Services orchestrate domain rules and infrastructure to fulfil the
//! HRM use cases. They depend on abstractions (traits) and reach the
//! repositories through the Unit of Work.

pub mod admin;
mod auth_service;
pub mod container;
mod leave_service;
mod payroll_service;
mod record_service;
mod scope;
mod timesheet_service;

#[cfg(test)]
pub(crate) mod testing;

// Service Container
pub use container::{ServiceContainer, Services};

// Service traits and implementations
pub use auth_service::{AuthService, Authenticator, Claims, Registration, TokenResponse};
pub use leave_service::{LeaveDecision, LeaveManager, LeaveService};
pub use payroll_service::{PayrollManager, PayrollService, PayslipRequest};
pub use record_service::{RecordManager, RecordService};
pub use timesheet_service::{TimesheetManager, TimesheetService};

#[cfg(any(test, feature = "test-utils"))]
pub use container::MockServiceContainer;
