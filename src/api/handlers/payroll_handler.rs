//! Payslip handlers.

use axum::{
    extract::State,
    routing::{get, post},
    Extension, Router,
};
use serde::Deserialize;
use serde_json::Value;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::api::extractors::{PathId, RequestSchema, ValidatedJson};
use crate::api::middleware::{require_role, CurrentUser, HR_ROLES};
use crate::api::AppState;
use crate::errors::AppResult;
use crate::services::PayslipRequest;
use crate::types::{ApiResponse, Created, ErrorEnvelope};
use crate::validation::SchemaName;

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GeneratePayslipRequest {
    pub employee_id: Uuid,
    #[schema(example = 6, minimum = 1, maximum = 12)]
    pub month: u32,
    #[schema(example = 2024)]
    pub year: i32,
    /// Unpaid days in the period
    #[schema(example = 0)]
    pub lop_days: f64,
    #[schema(example = 0)]
    pub bonus: f64,
}

impl RequestSchema for GeneratePayslipRequest {
    const SCHEMA: SchemaName = SchemaName::GeneratePayslip;
}

pub fn payroll_routes() -> Router<AppState> {
    Router::new()
        .route("/payslips", post(generate_payslip))
        .route("/payslips/:id", get(get_payslip))
}

/// Generate the payslip of one employee for one month (Admin, HR)
#[utoipa::path(
    post,
    path = "/api/payroll/payslips",
    tag = "Payroll",
    security(("bearer_auth" = [])),
    request_body = GeneratePayslipRequest,
    responses(
        (status = 201, description = "Payslip generated"),
        (status = 400, description = "Validation error", body = ErrorEnvelope),
        (status = 404, description = "Employee not found", body = ErrorEnvelope),
        (status = 409, description = "Payslip for this period already exists", body = ErrorEnvelope)
    )
)]
pub async fn generate_payslip(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<GeneratePayslipRequest>,
) -> AppResult<Created<Value>> {
    require_role(&current_user, HR_ROLES)?;
    let payslip = state
        .payroll_service
        .generate(PayslipRequest {
            employee_id: payload.employee_id,
            month: payload.month,
            year: payload.year,
            lop_days: payload.lop_days,
            bonus: payload.bonus,
        })
        .await?;
    Ok(Created(payslip))
}

/// Get a payslip (Admin, HR)
#[utoipa::path(
    get,
    path = "/api/payroll/payslips/{id}",
    tag = "Payroll",
    security(("bearer_auth" = [])),
    params(("id" = String, Path, description = "Payslip id (UUID)")),
    responses(
        (status = 200, description = "Payslip"),
        (status = 403, description = "Forbidden", body = ErrorEnvelope),
        (status = 404, description = "Payslip not found", body = ErrorEnvelope)
    )
)]
pub async fn get_payslip(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    PathId(id): PathId,
) -> AppResult<ApiResponse<Value>> {
    require_role(&current_user, HR_ROLES)?;
    let payslip = state
        .payroll_service
        .get(&current_user.actor(), id)
        .await?;
    Ok(ApiResponse::success(payslip))
}
