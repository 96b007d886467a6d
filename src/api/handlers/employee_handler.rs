//! Employee directory handlers.

use axum::{extract::State, routing::get, Extension, Router};
use serde_json::Value;

use crate::api::extractors::{PathId, ValidatedJson, ValidatedQuery};
use crate::api::middleware::{require_role, CurrentUser, HR_ROLES};
use crate::api::AppState;
use crate::document;
use crate::domain::Resource;
use crate::errors::AppResult;
use crate::types::{ApiResponse, Created, ErrorEnvelope, Paginated};

document!(
    /// Full employee record, salary structure included
    NewEmployee => CreateEmployee
);
document!(
    /// Any subset of the employee fields, at least one
    EmployeeChanges => UpdateEmployee
);
document!(EmployeeFilter => EmployeeQuery);

pub fn employee_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_employees).post(create_employee))
        .route(
            "/:id",
            get(get_employee).put(update_employee).delete(delete_employee),
        )
}

/// List employees
#[utoipa::path(
    get,
    path = "/api/employees",
    tag = "Employees",
    security(("bearer_auth" = [])),
    params(
        ("page" = Option<u64>, Query, description = "Page number, from 1"),
        ("limit" = Option<u64>, Query, description = "Page size, at most 100"),
        ("departmentId" = Option<String>, Query, description = "Department filter"),
        ("status" = Option<String>, Query, description = "Employment status filter")
    ),
    responses(
        (status = 200, description = "Page of employees"),
        (status = 400, description = "Invalid query", body = ErrorEnvelope)
    )
)]
pub async fn list_employees(
    State(state): State<AppState>,
    ValidatedQuery(EmployeeFilter(query)): ValidatedQuery<EmployeeFilter>,
) -> AppResult<ApiResponse<Paginated<Value>>> {
    let page = state.record_service.list(Resource::Employee, query).await?;
    Ok(ApiResponse::success(page))
}

/// Get one employee
#[utoipa::path(
    get,
    path = "/api/employees/{id}",
    tag = "Employees",
    security(("bearer_auth" = [])),
    params(("id" = String, Path, description = "Employee id (UUID)")),
    responses(
        (status = 200, description = "Employee"),
        (status = 400, description = "Malformed id", body = ErrorEnvelope),
        (status = 404, description = "Employee not found", body = ErrorEnvelope)
    )
)]
pub async fn get_employee(
    State(state): State<AppState>,
    PathId(id): PathId,
) -> AppResult<ApiResponse<Value>> {
    let employee = state.record_service.get(Resource::Employee, id).await?;
    Ok(ApiResponse::success(employee))
}

/// Create an employee (Admin, HR)
#[utoipa::path(
    post,
    path = "/api/employees",
    tag = "Employees",
    security(("bearer_auth" = [])),
    responses(
        (status = 201, description = "Employee created"),
        (status = 400, description = "Validation error", body = ErrorEnvelope),
        (status = 403, description = "Forbidden", body = ErrorEnvelope),
        (status = 409, description = "Employee id already taken", body = ErrorEnvelope)
    )
)]
pub async fn create_employee(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    ValidatedJson(NewEmployee(input)): ValidatedJson<NewEmployee>,
) -> AppResult<Created<Value>> {
    require_role(&current_user, HR_ROLES)?;
    let employee = state.record_service.create(Resource::Employee, input).await?;
    Ok(Created(employee))
}

/// Update an employee (Admin, HR)
#[utoipa::path(
    put,
    path = "/api/employees/{id}",
    tag = "Employees",
    security(("bearer_auth" = [])),
    params(("id" = String, Path, description = "Employee id (UUID)")),
    responses(
        (status = 200, description = "Employee updated"),
        (status = 400, description = "Validation error", body = ErrorEnvelope),
        (status = 404, description = "Employee not found", body = ErrorEnvelope)
    )
)]
pub async fn update_employee(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    PathId(id): PathId,
    ValidatedJson(EmployeeChanges(changes)): ValidatedJson<EmployeeChanges>,
) -> AppResult<ApiResponse<Value>> {
    require_role(&current_user, HR_ROLES)?;
    let employee = state
        .record_service
        .update(Resource::Employee, id, changes)
        .await?;
    Ok(ApiResponse::with_message(employee, "Employee updated successfully"))
}

/// Delete an employee (Admin, HR)
#[utoipa::path(
    delete,
    path = "/api/employees/{id}",
    tag = "Employees",
    security(("bearer_auth" = [])),
    params(("id" = String, Path, description = "Employee id (UUID)")),
    responses(
        (status = 200, description = "Employee deleted"),
        (status = 404, description = "Employee not found", body = ErrorEnvelope)
    )
)]
pub async fn delete_employee(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    PathId(id): PathId,
) -> AppResult<ApiResponse<()>> {
    require_role(&current_user, HR_ROLES)?;
    state.record_service.delete(Resource::Employee, id).await?;
    Ok(ApiResponse::message("Employee deleted successfully"))
}
