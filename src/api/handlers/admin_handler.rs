//! Debug console handlers (Admin only, never mounted in production).

use std::collections::BTreeMap;

use axum::{
    extract::{Path, State},
    routing::{get, post},
    Extension, Router,
};
use serde::Deserialize;
use serde_json::Value;
use utoipa::ToSchema;

use crate::api::extractors::{RequestSchema, ValidatedJson, ValidatedQuery};
use crate::api::middleware::{require_admin, CurrentUser};
use crate::api::AppState;
use crate::errors::{AppError, AppResult};
use crate::services::admin::{
    AdminServices, ColumnInfo, LogPage, LogQuery, QueryOptions, QueryResultSet, TablePage,
};
use crate::types::{ApiResponse, ErrorEnvelope};
use crate::validation::SchemaName;

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateConfigRequest {
    #[schema(example = "LOG_LEVEL")]
    pub key: String,
    /// May be empty
    pub value: String,
}

impl RequestSchema for UpdateConfigRequest {
    const SCHEMA: SchemaName = SchemaName::UpdateConfig;
}

#[derive(Debug, Deserialize)]
pub struct LogQueryParams {
    pub lines: usize,
    pub offset: usize,
    pub search: Option<String>,
}

impl RequestSchema for LogQueryParams {
    const SCHEMA: SchemaName = SchemaName::LogQuery;
}

#[derive(Debug, Deserialize)]
pub struct TableQueryParams {
    pub page: u64,
    pub limit: u64,
}

impl RequestSchema for TableQueryParams {
    const SCHEMA: SchemaName = SchemaName::TableQuery;
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ExecuteQueryRequest {
    #[schema(example = "SELECT id, email FROM users")]
    pub sql: String,
    /// Defaults to true; blocklisted keywords are refused
    pub read_only: bool,
    /// Defaults to 100
    pub max_rows: usize,
}

impl RequestSchema for ExecuteQueryRequest {
    const SCHEMA: SchemaName = SchemaName::ExecuteQuery;
}

pub fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/config", get(read_config).put(update_config))
        .route("/logs/:kind", get(read_log))
        .route("/database/tables", get(list_tables))
        .route("/database/tables/:table", get(table_schema))
        .route("/database/tables/:table/data", get(table_data))
        .route("/database/query", post(execute_query))
}

fn admin_services(state: &AppState, user: &CurrentUser) -> AppResult<AdminServices> {
    require_admin(user)?;
    state.admin.clone().ok_or(AppError::NotFound)
}

#[utoipa::path(
    get,
    path = "/api/admin/config",
    tag = "Admin",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Configuration with secrets masked"),
        (status = 403, description = "Admin only", body = ErrorEnvelope)
    )
)]
pub async fn read_config(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
) -> AppResult<ApiResponse<BTreeMap<String, String>>> {
    let admin = admin_services(&state, &current_user)?;
    Ok(ApiResponse::success(admin.config.read_config().await?))
}

#[utoipa::path(
    put,
    path = "/api/admin/config",
    tag = "Admin",
    security(("bearer_auth" = [])),
    request_body = UpdateConfigRequest,
    responses(
        (status = 200, description = "Key written"),
        (status = 400, description = "Validation error", body = ErrorEnvelope)
    )
)]
pub async fn update_config(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<UpdateConfigRequest>,
) -> AppResult<ApiResponse<()>> {
    let admin = admin_services(&state, &current_user)?;
    admin.config.update_config(&payload.key, &payload.value).await?;
    Ok(ApiResponse::message(format!(
        "{} updated; restart the server to apply it",
        payload.key
    )))
}

#[utoipa::path(
    get,
    path = "/api/admin/logs/{kind}",
    tag = "Admin",
    security(("bearer_auth" = [])),
    params(
        ("kind" = String, Path, description = "app, error or access"),
        ("lines" = Option<usize>, Query, description = "Page size, default 100"),
        ("offset" = Option<usize>, Query, description = "Lines to skip, newest first"),
        ("search" = Option<String>, Query, description = "Case-insensitive substring")
    ),
    responses(
        (status = 200, description = "Newest lines first"),
        (status = 404, description = "Unknown log type", body = ErrorEnvelope)
    )
)]
pub async fn read_log(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    Path(kind): Path<String>,
    ValidatedQuery(params): ValidatedQuery<LogQueryParams>,
) -> AppResult<ApiResponse<LogPage>> {
    let admin = admin_services(&state, &current_user)?;
    let page = admin
        .logs
        .read_log(
            &kind,
            LogQuery {
                lines: params.lines,
                offset: params.offset,
                search: params.search,
            },
        )
        .await?;
    Ok(ApiResponse::success(page))
}

#[utoipa::path(
    get,
    path = "/api/admin/database/tables",
    tag = "Admin",
    security(("bearer_auth" = [])),
    responses((status = 200, description = "Public table names"))
)]
pub async fn list_tables(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
) -> AppResult<ApiResponse<Vec<String>>> {
    let admin = admin_services(&state, &current_user)?;
    Ok(ApiResponse::success(admin.database.list_tables().await?))
}

#[utoipa::path(
    get,
    path = "/api/admin/database/tables/{table}",
    tag = "Admin",
    security(("bearer_auth" = [])),
    params(("table" = String, Path, description = "Table name")),
    responses(
        (status = 200, description = "Column definitions"),
        (status = 404, description = "Unknown table", body = ErrorEnvelope)
    )
)]
pub async fn table_schema(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    Path(table): Path<String>,
) -> AppResult<ApiResponse<Vec<ColumnInfo>>> {
    let admin = admin_services(&state, &current_user)?;
    Ok(ApiResponse::success(admin.database.table_schema(&table).await?))
}

#[utoipa::path(
    get,
    path = "/api/admin/database/tables/{table}/data",
    tag = "Admin",
    security(("bearer_auth" = [])),
    params(
        ("table" = String, Path, description = "Table name"),
        ("page" = Option<u64>, Query, description = "Page number, from 1"),
        ("limit" = Option<u64>, Query, description = "Rows per page, at most 500")
    ),
    responses(
        (status = 200, description = "Rows of the table"),
        (status = 404, description = "Unknown table", body = ErrorEnvelope)
    )
)]
pub async fn table_data(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    Path(table): Path<String>,
    ValidatedQuery(params): ValidatedQuery<TableQueryParams>,
) -> AppResult<ApiResponse<Value>> {
    let admin = admin_services(&state, &current_user)?;
    let page = TablePage {
        page: params.page,
        limit: params.limit,
    };
    Ok(ApiResponse::success(admin.database.table_data(&table, page).await?))
}

#[utoipa::path(
    post,
    path = "/api/admin/database/query",
    tag = "Admin",
    security(("bearer_auth" = [])),
    request_body = ExecuteQueryRequest,
    responses(
        (status = 200, description = "Result rows, truncated to maxRows"),
        (status = 403, description = "Statement refused in read-only mode", body = ErrorEnvelope)
    )
)]
pub async fn execute_query(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<ExecuteQueryRequest>,
) -> AppResult<ApiResponse<QueryResultSet>> {
    let admin = admin_services(&state, &current_user)?;
    let options = QueryOptions {
        read_only: payload.read_only,
        max_rows: payload.max_rows,
    };
    let result = admin.database.execute_query(&payload.sql, options).await?;
    Ok(ApiResponse::success(result))
}
