//! Timesheet handlers.

use axum::{
    extract::State,
    routing::{get, post, put},
    Extension, Router,
};
use serde::Deserialize;
use serde_json::Value;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::api::extractors::{PathId, RequestSchema, ValidatedJson, ValidatedQuery};
use crate::api::middleware::{require_role, CurrentUser, APPROVER_ROLES};
use crate::api::AppState;
use crate::document;
use crate::errors::AppResult;
use crate::types::{ApiResponse, Created, ErrorEnvelope, Paginated};
use crate::validation::SchemaName;

document!(
    /// One week of entries starting on a Monday
    NewTimesheet => CreateTimesheet
);
document!(TimesheetFilter => TimesheetQuery);

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SubmitTimesheetsRequest {
    pub timesheet_ids: Vec<Uuid>,
}

impl RequestSchema for SubmitTimesheetsRequest {
    const SCHEMA: SchemaName = SchemaName::BulkSubmitTimesheets;
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TimesheetStatusRequest {
    #[schema(example = "Approved")]
    pub status: String,
    /// Required when rejecting
    pub approver_comments: Option<String>,
}

impl RequestSchema for TimesheetStatusRequest {
    const SCHEMA: SchemaName = SchemaName::UpdateTimesheetStatus;
}

pub fn timesheet_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_timesheets).post(create_timesheet))
        .route("/submit", post(submit_timesheets))
        .route("/:id", get(get_timesheet))
        .route("/:id/status", put(update_timesheet_status))
}

/// Create a draft timesheet
#[utoipa::path(
    post,
    path = "/api/timesheets",
    tag = "Timesheets",
    security(("bearer_auth" = [])),
    responses(
        (status = 201, description = "Draft created"),
        (status = 400, description = "Validation error", body = ErrorEnvelope),
        (status = 409, description = "Timesheet for this week already exists", body = ErrorEnvelope)
    )
)]
pub async fn create_timesheet(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    ValidatedJson(NewTimesheet(input)): ValidatedJson<NewTimesheet>,
) -> AppResult<Created<Value>> {
    let sheet = state
        .timesheet_service
        .create(&current_user.actor(), input)
        .await?;
    Ok(Created(sheet))
}

#[utoipa::path(
    get,
    path = "/api/timesheets",
    tag = "Timesheets",
    security(("bearer_auth" = [])),
    params(
        ("status" = Option<String>, Query, description = "Status filter"),
        ("startDate" = Option<String>, Query, description = "Weeks starting on or after"),
        ("endDate" = Option<String>, Query, description = "Weeks starting on or before")
    ),
    responses((status = 200, description = "Page of timesheets"))
)]
pub async fn list_timesheets(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    ValidatedQuery(TimesheetFilter(query)): ValidatedQuery<TimesheetFilter>,
) -> AppResult<ApiResponse<Paginated<Value>>> {
    let page = state
        .timesheet_service
        .list(&current_user.actor(), query)
        .await?;
    Ok(ApiResponse::success(page))
}

#[utoipa::path(
    get,
    path = "/api/timesheets/{id}",
    tag = "Timesheets",
    security(("bearer_auth" = [])),
    params(("id" = String, Path, description = "Timesheet id (UUID)")),
    responses(
        (status = 200, description = "Timesheet"),
        (status = 404, description = "Timesheet not found", body = ErrorEnvelope)
    )
)]
pub async fn get_timesheet(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    PathId(id): PathId,
) -> AppResult<ApiResponse<Value>> {
    let sheet = state
        .timesheet_service
        .get(&current_user.actor(), id)
        .await?;
    Ok(ApiResponse::success(sheet))
}

/// Submit drafts for approval; all or nothing
#[utoipa::path(
    post,
    path = "/api/timesheets/submit",
    tag = "Timesheets",
    security(("bearer_auth" = [])),
    request_body = SubmitTimesheetsRequest,
    responses(
        (status = 200, description = "Every timesheet submitted"),
        (status = 409, description = "A timesheet is not a draft", body = ErrorEnvelope)
    )
)]
pub async fn submit_timesheets(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<SubmitTimesheetsRequest>,
) -> AppResult<ApiResponse<Value>> {
    let result = state
        .timesheet_service
        .submit(&current_user.actor(), payload.timesheet_ids)
        .await?;
    Ok(ApiResponse::with_message(result, "Timesheets submitted"))
}

/// Approve or reject a submitted timesheet (Admin, HR, Manager)
#[utoipa::path(
    put,
    path = "/api/timesheets/{id}/status",
    tag = "Timesheets",
    security(("bearer_auth" = [])),
    params(("id" = String, Path, description = "Timesheet id (UUID)")),
    request_body = TimesheetStatusRequest,
    responses(
        (status = 200, description = "Status updated"),
        (status = 409, description = "Timesheet is not submitted", body = ErrorEnvelope)
    )
)]
pub async fn update_timesheet_status(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    PathId(id): PathId,
    ValidatedJson(payload): ValidatedJson<TimesheetStatusRequest>,
) -> AppResult<ApiResponse<Value>> {
    require_role(&current_user, APPROVER_ROLES)?;
    let sheet = state
        .timesheet_service
        .update_status(
            &current_user.actor(),
            id,
            payload.status,
            payload.approver_comments,
        )
        .await?;
    Ok(ApiResponse::with_message(sheet, "Timesheet status updated"))
}
