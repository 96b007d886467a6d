//! Schema tables, one module per resource.

mod admin;
mod auth;
pub mod common;
mod employee;
mod leave;
mod organization;
mod payroll;
mod timesheet;

use super::registry::SchemaName;
use super::rules::Schema;

/// Every schema the API knows about.
pub fn all() -> Vec<(SchemaName, Schema)> {
    [
        auth::schemas(),
        employee::schemas(),
        organization::schemas(),
        leave::schemas(),
        timesheet::schemas(),
        payroll::schemas(),
        admin::schemas(),
    ]
    .into_iter()
    .flatten()
    .collect()
}
