//! OpenAPI documentation configuration.
//!
//! Provides Swagger UI for API exploration and testing.

use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::api::handlers::{
    admin_handler, auth_handler, department_handler, employee_handler, leave_handler,
    payroll_handler, position_handler, timesheet_handler,
};
use crate::domain::{UserResponse, UserRole};
use crate::services::TokenResponse;
use crate::types::{ErrorEnvelope, FieldErrorBody};

/// OpenAPI documentation for the HRM API
#[derive(OpenApi)]
#[openapi(
    info(
        title = "HRM API",
        version = "0.1.0",
        description = "Employees, leave, timesheets and payroll. Every response uses the \
                       `{ success, data | message, errors? }` envelope.",
        license(name = "MIT", url = "https://opensource.org/licenses/MIT")
    ),
    servers(
        (url = "http://localhost:3000", description = "Local development server")
    ),
    paths(
        auth_handler::register,
        auth_handler::login,
        auth_handler::me,
        auth_handler::change_password,
        employee_handler::list_employees,
        employee_handler::get_employee,
        employee_handler::create_employee,
        employee_handler::update_employee,
        employee_handler::delete_employee,
        department_handler::list_departments,
        department_handler::get_department,
        department_handler::create_department,
        department_handler::update_department,
        department_handler::delete_department,
        position_handler::list_positions,
        position_handler::get_position,
        position_handler::create_position,
        position_handler::update_position,
        position_handler::delete_position,
        leave_handler::create_leave,
        leave_handler::list_leaves,
        leave_handler::get_leave,
        leave_handler::update_leave_status,
        leave_handler::bulk_approve,
        leave_handler::leave_balance,
        leave_handler::leave_calendar,
        timesheet_handler::create_timesheet,
        timesheet_handler::list_timesheets,
        timesheet_handler::get_timesheet,
        timesheet_handler::submit_timesheets,
        timesheet_handler::update_timesheet_status,
        payroll_handler::generate_payslip,
        payroll_handler::get_payslip,
        admin_handler::read_config,
        admin_handler::update_config,
        admin_handler::read_log,
        admin_handler::list_tables,
        admin_handler::table_schema,
        admin_handler::table_data,
        admin_handler::execute_query,
    ),
    components(
        schemas(
            UserRole,
            UserResponse,
            TokenResponse,
            ErrorEnvelope,
            FieldErrorBody,
            auth_handler::RegisterRequest,
            auth_handler::LoginRequest,
            auth_handler::ChangePasswordRequest,
            leave_handler::LeaveStatusRequest,
            leave_handler::BulkLeaveRequest,
            timesheet_handler::SubmitTimesheetsRequest,
            timesheet_handler::TimesheetStatusRequest,
            payroll_handler::GeneratePayslipRequest,
            admin_handler::UpdateConfigRequest,
            admin_handler::ExecuteQueryRequest,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Authentication", description = "Registration, login and account"),
        (name = "Employees", description = "Employee directory"),
        (name = "Departments", description = "Departments"),
        (name = "Positions", description = "Positions and salary bands"),
        (name = "Leave", description = "Leave requests, balances and calendar"),
        (name = "Timesheets", description = "Weekly timesheets"),
        (name = "Payroll", description = "Payslip generation"),
        (name = "Admin", description = "Debug console, non-production only")
    )
)]
pub struct ApiDoc;

/// Security scheme modifier for JWT Bearer authentication
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .description(Some("JWT token obtained from /api/auth/login"))
                        .build(),
                ),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_lists_every_resource() {
        let doc = ApiDoc::openapi();
        let paths: Vec<&String> = doc.paths.paths.keys().collect();

        for expected in [
            "/api/auth/login",
            "/api/employees/{id}",
            "/api/leaves/bulk-approve",
            "/api/timesheets/submit",
            "/api/payroll/payslips",
            "/api/admin/database/query",
        ] {
            assert!(paths.iter().any(|p| p.as_str() == expected), "missing {}", expected);
        }
    }
}
