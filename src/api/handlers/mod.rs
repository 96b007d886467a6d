//! HTTP request handlers, one module per resource.

pub mod admin_handler;
pub mod auth_handler;
pub mod department_handler;
pub mod employee_handler;
pub mod leave_handler;
pub mod payroll_handler;
pub mod position_handler;
pub mod timesheet_handler;

pub use admin_handler::admin_routes;
pub use auth_handler::{account_routes, auth_routes};
pub use department_handler::department_routes;
pub use employee_handler::employee_routes;
pub use leave_handler::leave_routes;
pub use payroll_handler::payroll_routes;
pub use position_handler::position_routes;
pub use timesheet_handler::timesheet_routes;
