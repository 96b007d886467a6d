//! Leave request handlers.

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
use crate::services::LeaveDecision;
use crate::types::{ApiResponse, Created, ErrorEnvelope, Paginated};
use crate::validation::SchemaName;

document!(
    /// `employeeId` may only name someone else for approvers
    NewLeaveRequest => CreateLeaveRequest
);
document!(LeaveFilter => LeaveQuery);
document!(BalanceQuery => LeaveBalance);
document!(CalendarQuery => LeaveCalendar);

/// Approver's decision on one request
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LeaveStatusRequest {
    #[schema(example = "Approved")]
    pub status: String,
    /// Required when rejecting
    pub approver_comments: Option<String>,
}

impl RequestSchema for LeaveStatusRequest {
    const SCHEMA: SchemaName = SchemaName::UpdateLeaveStatus;
}

/// One decision applied to up to 50 requests
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BulkLeaveRequest {
    pub leave_ids: Vec<Uuid>,
    #[schema(example = "Approved")]
    pub status: String,
    /// Required when rejecting
    pub comments: Option<String>,
}

impl RequestSchema for BulkLeaveRequest {
    const SCHEMA: SchemaName = SchemaName::BulkLeaveApproval;
}

pub fn leave_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_leaves).post(create_leave))
        .route("/balance", get(leave_balance))
        .route("/calendar", get(leave_calendar))
        .route("/bulk-approve", post(bulk_approve))
        .route("/:id", get(get_leave))
        .route("/:id/status", put(update_leave_status))
}

/// Apply for leave
#[utoipa::path(
    post,
    path = "/api/leaves",
    tag = "Leave",
    security(("bearer_auth" = [])),
    responses(
        (status = 201, description = "Leave request created"),
        (status = 400, description = "Validation error or insufficient balance", body = ErrorEnvelope),
        (status = 409, description = "Overlaps an existing request", body = ErrorEnvelope)
    )
)]
pub async fn create_leave(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    ValidatedJson(NewLeaveRequest(input)): ValidatedJson<NewLeaveRequest>,
) -> AppResult<Created<Value>> {
    let request = state
        .leave_service
        .create(&current_user.actor(), input)
        .await?;
    Ok(Created(request))
}

/// List leave requests; employees only see their own
#[utoipa::path(
    get,
    path = "/api/leaves",
    tag = "Leave",
    security(("bearer_auth" = [])),
    params(
        ("status" = Option<String>, Query, description = "Status filter"),
        ("leaveType" = Option<String>, Query, description = "Leave type filter"),
        ("employeeId" = Option<String>, Query, description = "Employee filter (approvers)")
    ),
    responses((status = 200, description = "Page of leave requests"))
)]
pub async fn list_leaves(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    ValidatedQuery(LeaveFilter(query)): ValidatedQuery<LeaveFilter>,
) -> AppResult<ApiResponse<Paginated<Value>>> {
    let page = state
        .leave_service
        .list(&current_user.actor(), query)
        .await?;
    Ok(ApiResponse::success(page))
}

#[utoipa::path(
    get,
    path = "/api/leaves/{id}",
    tag = "Leave",
    security(("bearer_auth" = [])),
    params(("id" = String, Path, description = "Leave request id (UUID)")),
    responses(
        (status = 200, description = "Leave request"),
        (status = 403, description = "Someone else's request", body = ErrorEnvelope),
        (status = 404, description = "Leave request not found", body = ErrorEnvelope)
    )
)]
pub async fn get_leave(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    PathId(id): PathId,
) -> AppResult<ApiResponse<Value>> {
    let request = state.leave_service.get(&current_user.actor(), id).await?;
    Ok(ApiResponse::success(request))
}

/// Approve, reject or cancel a request (Admin, HR, Manager)
#[utoipa::path(
    put,
    path = "/api/leaves/{id}/status",
    tag = "Leave",
    security(("bearer_auth" = [])),
    params(("id" = String, Path, description = "Leave request id (UUID)")),
    request_body = LeaveStatusRequest,
    responses(
        (status = 200, description = "Status updated"),
        (status = 403, description = "Not an approver, or own request", body = ErrorEnvelope),
        (status = 409, description = "Transition not allowed", body = ErrorEnvelope)
    )
)]
pub async fn update_leave_status(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    PathId(id): PathId,
    ValidatedJson(payload): ValidatedJson<LeaveStatusRequest>,
) -> AppResult<ApiResponse<Value>> {
    require_role(&current_user, APPROVER_ROLES)?;
    let decision = LeaveDecision {
        status: payload.status,
        comments: payload.approver_comments,
    };
    let request = state
        .leave_service
        .update_status(&current_user.actor(), id, decision)
        .await?;
    Ok(ApiResponse::with_message(request, "Leave status updated"))
}

/// Decide several requests at once; all or nothing (Admin, HR, Manager)
#[utoipa::path(
    post,
    path = "/api/leaves/bulk-approve",
    tag = "Leave",
    security(("bearer_auth" = [])),
    request_body = BulkLeaveRequest,
    responses(
        (status = 200, description = "Every request updated"),
        (status = 404, description = "A request does not exist", body = ErrorEnvelope),
        (status = 409, description = "A request cannot make the transition", body = ErrorEnvelope)
    )
)]
pub async fn bulk_approve(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<BulkLeaveRequest>,
) -> AppResult<ApiResponse<Value>> {
    require_role(&current_user, APPROVER_ROLES)?;
    let decision = LeaveDecision {
        status: payload.status,
        comments: payload.comments,
    };
    let result = state
        .leave_service
        .bulk_update(&current_user.actor(), payload.leave_ids, decision)
        .await?;
    Ok(ApiResponse::success(result))
}

/// Entitlement, usage and remaining days per leave type
#[utoipa::path(
    get,
    path = "/api/leaves/balance",
    tag = "Leave",
    security(("bearer_auth" = [])),
    params(
        ("employeeId" = Option<String>, Query, description = "Employee (approvers only)"),
        ("year" = Option<i32>, Query, description = "Calendar year, defaults to the current one")
    ),
    responses((status = 200, description = "Leave balances"))
)]
pub async fn leave_balance(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    ValidatedQuery(BalanceQuery(query)): ValidatedQuery<BalanceQuery>,
) -> AppResult<ApiResponse<Value>> {
    let balance = state
        .leave_service
        .balance(&current_user.actor(), query)
        .await?;
    Ok(ApiResponse::success(balance))
}

/// Approved and pending leave within a date range
#[utoipa::path(
    get,
    path = "/api/leaves/calendar",
    tag = "Leave",
    security(("bearer_auth" = [])),
    params(
        ("startDate" = String, Query, description = "YYYY-MM-DD"),
        ("endDate" = String, Query, description = "YYYY-MM-DD, at most 180 days later"),
        ("departmentId" = Option<String>, Query, description = "Department filter")
    ),
    responses(
        (status = 200, description = "Calendar entries"),
        (status = 400, description = "Invalid range", body = ErrorEnvelope)
    )
)]
pub async fn leave_calendar(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    ValidatedQuery(CalendarQuery(query)): ValidatedQuery<CalendarQuery>,
) -> AppResult<ApiResponse<Value>> {
    let calendar = state
        .leave_service
        .calendar(&current_user.actor(), query)
        .await?;
    Ok(ApiResponse::success(calendar))
}
