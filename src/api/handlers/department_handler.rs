//! Department handlers.

use axum::{extract::State, routing::get, Extension, Router};
use serde_json::Value;

use crate::api::extractors::{PathId, ValidatedJson, ValidatedQuery};
use crate::api::middleware::{require_role, CurrentUser, HR_ROLES};
use crate::api::AppState;
use crate::document;
use crate::domain::Resource;
use crate::errors::AppResult;
use crate::types::{ApiResponse, Created, ErrorEnvelope, Paginated};

document!(NewDepartment => CreateDepartment);
document!(DepartmentChanges => UpdateDepartment);
document!(DepartmentFilter => ListQuery);

pub fn department_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_departments).post(create_department))
        .route(
            "/:id",
            get(get_department).put(update_department).delete(delete_department),
        )
}

/// List departments
#[utoipa::path(
    get,
    path = "/api/departments",
    tag = "Departments",
    security(("bearer_auth" = [])),
    params(
        ("page" = Option<u64>, Query, description = "Page number, from 1"),
        ("limit" = Option<u64>, Query, description = "Page size, at most 100"),
        ("search" = Option<String>, Query, description = "Case-insensitive name search"),
        ("isActive" = Option<bool>, Query, description = "Active filter")
    ),
    responses(
        (status = 200, description = "Page of departments"),
        (status = 400, description = "Invalid query", body = ErrorEnvelope)
    )
)]
pub async fn list_departments(
    State(state): State<AppState>,
    ValidatedQuery(DepartmentFilter(query)): ValidatedQuery<DepartmentFilter>,
) -> AppResult<ApiResponse<Paginated<Value>>> {
    let page = state.record_service.list(Resource::Department, query).await?;
    Ok(ApiResponse::success(page))
}

#[utoipa::path(
    get,
    path = "/api/departments/{id}",
    tag = "Departments",
    security(("bearer_auth" = [])),
    params(("id" = String, Path, description = "Department id (UUID)")),
    responses(
        (status = 200, description = "Department"),
        (status = 404, description = "Department not found", body = ErrorEnvelope)
    )
)]
pub async fn get_department(
    State(state): State<AppState>,
    PathId(id): PathId,
) -> AppResult<ApiResponse<Value>> {
    let department = state.record_service.get(Resource::Department, id).await?;
    Ok(ApiResponse::success(department))
}

/// Create a department (Admin, HR)
#[utoipa::path(
    post,
    path = "/api/departments",
    tag = "Departments",
    security(("bearer_auth" = [])),
    responses(
        (status = 201, description = "Department created"),
        (status = 400, description = "Validation error", body = ErrorEnvelope),
        (status = 403, description = "Forbidden", body = ErrorEnvelope),
        (status = 409, description = "Department code already taken", body = ErrorEnvelope)
    )
)]
pub async fn create_department(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    ValidatedJson(NewDepartment(input)): ValidatedJson<NewDepartment>,
) -> AppResult<Created<Value>> {
    require_role(&current_user, HR_ROLES)?;
    let department = state.record_service.create(Resource::Department, input).await?;
    Ok(Created(department))
}

/// Update a department (Admin, HR)
#[utoipa::path(
    put,
    path = "/api/departments/{id}",
    tag = "Departments",
    security(("bearer_auth" = [])),
    params(("id" = String, Path, description = "Department id (UUID)")),
    responses(
        (status = 200, description = "Department updated"),
        (status = 400, description = "Validation error", body = ErrorEnvelope),
        (status = 404, description = "Department not found", body = ErrorEnvelope)
    )
)]
pub async fn update_department(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    PathId(id): PathId,
    ValidatedJson(DepartmentChanges(changes)): ValidatedJson<DepartmentChanges>,
) -> AppResult<ApiResponse<Value>> {
    require_role(&current_user, HR_ROLES)?;
    let department = state
        .record_service
        .update(Resource::Department, id, changes)
        .await?;
    Ok(ApiResponse::with_message(department, "Department updated successfully"))
}

/// Delete a department (Admin, HR)
#[utoipa::path(
    delete,
    path = "/api/departments/{id}",
    tag = "Departments",
    security(("bearer_auth" = [])),
    params(("id" = String, Path, description = "Department id (UUID)")),
    responses(
        (status = 200, description = "Department deleted"),
        (status = 404, description = "Department not found", body = ErrorEnvelope),
        (status = 409, description = "Department still has employees", body = ErrorEnvelope)
    )
)]
pub async fn delete_department(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    PathId(id): PathId,
) -> AppResult<ApiResponse<()>> {
    require_role(&current_user, HR_ROLES)?;
    state.record_service.delete(Resource::Department, id).await?;
    Ok(ApiResponse::message("Department deleted successfully"))
}
