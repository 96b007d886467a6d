//! Authentication handlers.

use axum::{
    extract::State,
    routing::{get, post},
    Extension, Router,
};
use serde::Deserialize;
use utoipa::ToSchema;

use crate::api::extractors::{RequestSchema, ValidatedJson};
use crate::api::middleware::CurrentUser;
use crate::api::AppState;
use crate::domain::{UserResponse, UserRole};
use crate::errors::AppResult;
use crate::services::{Registration, TokenResponse};
use crate::types::{ApiResponse, Created, ErrorEnvelope};
use crate::validation::SchemaName;

/// User login request
#[derive(Debug, Deserialize, ToSchema)]
pub struct LoginRequest {
    /// Lowercased before lookup
    #[schema(example = "jane.doe@example.com")]
    pub email: String,
    #[schema(example = "Secret@123", min_length = 6)]
    pub password: String,
}

impl RequestSchema for LoginRequest {
    const SCHEMA: SchemaName = SchemaName::Login;
}

/// Account registration request
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    /// `EMP` followed by at least three digits
    #[schema(example = "EMP001")]
    pub employee_id: String,
    #[schema(example = "jane_doe", min_length = 3, max_length = 30)]
    pub username: String,
    #[schema(example = "jane.doe@example.com")]
    pub email: String,
    /// Needs lower and upper case, a digit and one of `@$!%*?&`
    #[schema(example = "Secret@123", min_length = 8, max_length = 128)]
    pub password: String,
    #[schema(example = "Secret@123")]
    pub confirm_password: String,
    /// Defaults to `Employee`
    #[schema(example = "Employee")]
    pub role: String,
}

impl RequestSchema for RegisterRequest {
    const SCHEMA: SchemaName = SchemaName::Register;
}

/// Password change request
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    pub current_password: String,
    /// Same complexity as at registration, and different from the current one
    pub new_password: String,
    pub confirm_password: String,
}

impl RequestSchema for ChangePasswordRequest {
    const SCHEMA: SchemaName = SchemaName::ChangePassword;
}

/// Public authentication routes
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
}

/// Authentication routes that need a bearer token, mounted beside the public ones
pub fn account_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/me", get(me))
        .route("/auth/change-password", post(change_password))
}

/// Register a new account
#[utoipa::path(
    post,
    path = "/api/auth/register",
    tag = "Authentication",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Account registered", body = UserResponse),
        (status = 400, description = "Validation error", body = ErrorEnvelope),
        (status = 409, description = "Account already exists", body = ErrorEnvelope)
    )
)]
pub async fn register(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<RegisterRequest>,
) -> AppResult<Created<UserResponse>> {
    let user = state
        .auth_service
        .register(Registration {
            employee_code: payload.employee_id,
            username: payload.username,
            email: payload.email,
            password: payload.password,
            role: UserRole::from(payload.role.as_str()),
        })
        .await?;

    Ok(Created(user))
}

/// Login and get JWT token
#[utoipa::path(
    post,
    path = "/api/auth/login",
    tag = "Authentication",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = TokenResponse),
        (status = 400, description = "Validation error", body = ErrorEnvelope),
        (status = 401, description = "Invalid credentials", body = ErrorEnvelope)
    )
)]
pub async fn login(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<LoginRequest>,
) -> AppResult<ApiResponse<TokenResponse>> {
    let token = state
        .auth_service
        .login(payload.email, payload.password)
        .await?;

    Ok(ApiResponse::with_message(token, "Login successful"))
}

/// Profile of the authenticated account
#[utoipa::path(
    get,
    path = "/api/auth/me",
    tag = "Authentication",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Current account", body = UserResponse),
        (status = 401, description = "Unauthorized", body = ErrorEnvelope)
    )
)]
pub async fn me(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
) -> AppResult<ApiResponse<UserResponse>> {
    let user = state.auth_service.me(current_user.id).await?;
    Ok(ApiResponse::success(user))
}

/// Change the password of the authenticated account
#[utoipa::path(
    post,
    path = "/api/auth/change-password",
    tag = "Authentication",
    security(("bearer_auth" = [])),
    request_body = ChangePasswordRequest,
    responses(
        (status = 200, description = "Password changed"),
        (status = 400, description = "Validation error or wrong current password", body = ErrorEnvelope),
        (status = 401, description = "Unauthorized", body = ErrorEnvelope)
    )
)]
pub async fn change_password(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<ChangePasswordRequest>,
) -> AppResult<ApiResponse<()>> {
    state
        .auth_service
        .change_password(current_user.id, payload.current_password, payload.new_password)
        .await?;

    Ok(ApiResponse::message("Password changed successfully"))
}
