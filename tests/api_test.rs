//! Integration tests for API endpoints.
//!
//! These tests drive the full router with in-memory fake services, so the
//! extractors, auth middleware and error envelope are exercised without a
//! database.

use std::sync::Arc;

use async_trait::async_trait;
use axum::body::{to_bytes, Body};
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use chrono::Utc;
use serde_json::{json, Map, Value};
use tower::ServiceExt;
use uuid::Uuid;

use hrm_api::api::{create_router, AppState};
use hrm_api::domain::{Actor, Resource, UserResponse, UserRole};
use hrm_api::errors::{AppError, AppResult};
use hrm_api::services::admin::{
    AdminServices, ColumnInfo, DatabaseService, DotenvConfig, LogReader, QueryOptions,
    QueryResultSet, TablePage,
};
use hrm_api::services::{
    AuthService, Claims, LeaveDecision, LeaveService, PayrollService, PayslipRequest,
    RecordService, Registration, TimesheetService, TokenResponse,
};
use hrm_api::types::{Paginated, PaginationParams};

// =============================================================================
// Fake Services for Testing
// =============================================================================

const HR_TOKEN: &str = "hr-token";
const EMPLOYEE_TOKEN: &str = "employee-token";
const ADMIN_TOKEN: &str = "admin-token";

fn user_response(email: &str, role: UserRole) -> UserResponse {
    UserResponse {
        id: Uuid::new_v4(),
        employee_id: "EMP001".to_string(),
        username: "jane_doe".to_string(),
        email: email.to_string(),
        role,
        last_login_at: None,
        created_at: Utc::now(),
    }
}

/// Auth service that accepts a fixed token per role
struct FakeAuthService;

#[async_trait]
impl AuthService for FakeAuthService {
    async fn register(&self, registration: Registration) -> AppResult<UserResponse> {
        Ok(user_response(&registration.email, registration.role))
    }

    async fn login(&self, email: String, _password: String) -> AppResult<TokenResponse> {
        Ok(TokenResponse {
            access_token: "fake-jwt".to_string(),
            token_type: "Bearer".to_string(),
            expires_in: 86400,
            user: user_response(&email, UserRole::Employee),
        })
    }

    async fn change_password(&self, _: Uuid, _: String, _: String) -> AppResult<()> {
        Ok(())
    }

    async fn me(&self, _user_id: Uuid) -> AppResult<UserResponse> {
        Ok(user_response("jane@example.com", UserRole::Employee))
    }

    fn verify_token(&self, token: &str) -> AppResult<Claims> {
        let role = match token {
            ADMIN_TOKEN => UserRole::Admin,
            HR_TOKEN => UserRole::Hr,
            EMPLOYEE_TOKEN => UserRole::Employee,
            _ => return Err(AppError::Unauthorized),
        };
        Ok(Claims {
            sub: Uuid::new_v4(),
            email: "jane@example.com".to_string(),
            role: role.as_str().to_string(),
            employee_code: "EMP001".to_string(),
            exp: Utc::now().timestamp() + 3600,
            iat: Utc::now().timestamp(),
        })
    }
}

/// Record service echoing its input; the code `DUP` is always taken
struct FakeRecordService;

#[async_trait]
impl RecordService for FakeRecordService {
    async fn list(&self, _: Resource, query: Map<String, Value>) -> AppResult<Paginated<Value>> {
        let page = PaginationParams::from_query(&query);
        Ok(Paginated::new(vec![Value::Object(query)], page, 1))
    }

    async fn get(&self, resource: Resource, id: Uuid) -> AppResult<Value> {
        Err(AppError::NotFoundEntity(format!("{} {}", resource.label(), id)))
    }

    async fn create(&self, _: Resource, mut input: Map<String, Value>) -> AppResult<Value> {
        if input.get("code") == Some(&json!("DUP")) {
            return Err(AppError::conflict("Department code"));
        }
        input.insert("id".into(), json!(Uuid::new_v4()));
        Ok(Value::Object(input))
    }

    async fn update(&self, _: Resource, id: Uuid, mut input: Map<String, Value>) -> AppResult<Value> {
        input.insert("id".into(), json!(id));
        Ok(Value::Object(input))
    }

    async fn delete(&self, _: Resource, _: Uuid) -> AppResult<()> {
        Ok(())
    }
}

struct FakeLeaveService;

#[async_trait]
impl LeaveService for FakeLeaveService {
    async fn create(&self, _: &Actor, input: Map<String, Value>) -> AppResult<Value> {
        Ok(Value::Object(input))
    }

    async fn list(&self, _: &Actor, query: Map<String, Value>) -> AppResult<Paginated<Value>> {
        Ok(Paginated::new(vec![], PaginationParams::from_query(&query), 0))
    }

    async fn get(&self, _: &Actor, _: Uuid) -> AppResult<Value> {
        Err(AppError::NotFoundEntity("Leave request".into()))
    }

    async fn update_status(&self, _: &Actor, id: Uuid, decision: LeaveDecision) -> AppResult<Value> {
        Ok(json!({ "id": id, "status": decision.status }))
    }

    async fn bulk_update(&self, _: &Actor, ids: Vec<Uuid>, _: LeaveDecision) -> AppResult<Value> {
        Ok(json!({ "count": ids.len() }))
    }

    async fn balance(&self, _: &Actor, _: Map<String, Value>) -> AppResult<Value> {
        Ok(json!({}))
    }

    async fn calendar(&self, _: &Actor, _: Map<String, Value>) -> AppResult<Value> {
        Ok(json!([]))
    }
}

struct FakeTimesheetService;

#[async_trait]
impl TimesheetService for FakeTimesheetService {
    async fn create(&self, _: &Actor, input: Map<String, Value>) -> AppResult<Value> {
        Ok(Value::Object(input))
    }

    async fn list(&self, _: &Actor, query: Map<String, Value>) -> AppResult<Paginated<Value>> {
        Ok(Paginated::new(vec![], PaginationParams::from_query(&query), 0))
    }

    async fn get(&self, _: &Actor, _: Uuid) -> AppResult<Value> {
        Err(AppError::NotFoundEntity("Timesheet".into()))
    }

    async fn submit(&self, _: &Actor, ids: Vec<Uuid>) -> AppResult<Value> {
        Ok(json!({ "count": ids.len() }))
    }

    async fn update_status(
        &self,
        _: &Actor,
        id: Uuid,
        status: String,
        _: Option<String>,
    ) -> AppResult<Value> {
        Ok(json!({ "id": id, "status": status }))
    }
}

struct FakePayrollService;

#[async_trait]
impl PayrollService for FakePayrollService {
    async fn generate(&self, request: PayslipRequest) -> AppResult<Value> {
        Ok(json!({ "employeeId": request.employee_id, "month": request.month }))
    }

    async fn get(&self, _: &Actor, _: Uuid) -> AppResult<Value> {
        Err(AppError::NotFoundEntity("Payslip".into()))
    }
}

/// Database console with one table and no connection behind it
struct FakeDatabaseService;

#[async_trait]
impl DatabaseService for FakeDatabaseService {
    async fn list_tables(&self) -> AppResult<Vec<String>> {
        Ok(vec!["users".to_string()])
    }

    async fn table_schema(&self, table: &str) -> AppResult<Vec<ColumnInfo>> {
        Err(AppError::NotFoundEntity(format!("Table '{}'", table)))
    }

    async fn table_data(&self, table: &str, _: TablePage) -> AppResult<Value> {
        Err(AppError::NotFoundEntity(format!("Table '{}'", table)))
    }

    async fn execute_query(&self, _: &str, options: QueryOptions) -> AppResult<QueryResultSet> {
        Ok(QueryResultSet::new(vec![], options.max_rows, 0))
    }
}

// =============================================================================
// Helpers
// =============================================================================

fn state() -> AppState {
    AppState {
        auth_service: Arc::new(FakeAuthService),
        record_service: Arc::new(FakeRecordService),
        leave_service: Arc::new(FakeLeaveService),
        timesheet_service: Arc::new(FakeTimesheetService),
        payroll_service: Arc::new(FakePayrollService),
        admin: None,
        database: None,
    }
}

fn app() -> Router {
    create_router(state())
}

fn request(method: Method, uri: &str, token: Option<&str>, body: Option<Value>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

// =============================================================================
// Public endpoints
// =============================================================================

#[tokio::test]
async fn test_health_without_database() {
    let (status, body) = send(app(), request(Method::GET, "/api/health", None, None)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], json!(true));
    assert_eq!(body["data"]["database"], json!("not configured"));
}

#[tokio::test]
async fn test_login_validation_envelope() {
    let (status, body) = send(
        app(),
        request(
            Method::POST,
            "/api/auth/login",
            None,
            Some(json!({ "email": "BAD", "password": "x" })),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], json!(false));
    let errors = body["errors"].as_array().unwrap();
    assert_eq!(errors.len(), 2);
    assert_eq!(errors[0]["field"], json!("email"));
    assert_eq!(errors[1]["field"], json!("password"));
    assert!(errors.iter().all(|e| e.get("code").is_none()));
}

#[tokio::test]
async fn test_login_success() {
    let (status, body) = send(
        app(),
        request(
            Method::POST,
            "/api/auth/login",
            None,
            Some(json!({ "email": "Jane@Example.com", "password": "secret1" })),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], json!("Login successful"));
    assert_eq!(body["data"]["accessToken"], json!("fake-jwt"));
    assert_eq!(body["data"]["user"]["email"], json!("jane@example.com"));
}

#[tokio::test]
async fn test_malformed_json_is_bad_request() {
    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/auth/login")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{ not json"))
        .unwrap();

    let (status, body) = send(app(), request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], json!(false));
    assert!(body.get("errors").is_none());
}

#[tokio::test]
async fn test_unknown_route() {
    let (status, body) = send(app(), request(Method::GET, "/api/nowhere", None, None)).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], json!("Route not found"));
}

// =============================================================================
// Authentication and roles
// =============================================================================

#[tokio::test]
async fn test_missing_token_is_unauthorized() {
    let (status, body) = send(app(), request(Method::GET, "/api/employees", None, None)).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], json!("Authentication required"));
}

#[tokio::test]
async fn test_invalid_token_is_unauthorized() {
    let (status, _) = send(
        app(),
        request(Method::GET, "/api/employees", Some("forged"), None),
    )
    .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_malformed_path_id() {
    let (status, body) = send(
        app(),
        request(Method::GET, "/api/employees/not-a-uuid", Some(HR_TOKEN), None),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["errors"][0]["field"], json!("id"));
}

#[tokio::test]
async fn test_employee_cannot_delete_employees() {
    let uri = format!("/api/employees/{}", Uuid::new_v4());
    let (status, _) = send(app(), request(Method::DELETE, &uri, Some(EMPLOYEE_TOKEN), None)).await;

    assert_eq!(status, StatusCode::FORBIDDEN);
}

// =============================================================================
// Records
// =============================================================================

#[tokio::test]
async fn test_hr_creates_department() {
    let (status, body) = send(
        app(),
        request(
            Method::POST,
            "/api/departments",
            Some(HR_TOKEN),
            Some(json!({ "name": "  Engineering ", "code": "eng" })),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["code"], json!("ENG"));
    assert_eq!(body["data"]["name"], json!("Engineering"));
    assert_eq!(body["data"]["isActive"], json!(true));
}

#[tokio::test]
async fn test_duplicate_department_conflicts() {
    let (status, body) = send(
        app(),
        request(
            Method::POST,
            "/api/departments",
            Some(HR_TOKEN),
            Some(json!({ "name": "Duplicates", "code": "dup" })),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["message"], json!("Department code already exists"));
}

#[tokio::test]
async fn test_list_query_is_coerced() {
    let (status, body) = send(
        app(),
        request(
            Method::GET,
            "/api/departments?page=2&isActive=false",
            Some(EMPLOYEE_TOKEN),
            None,
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["items"][0]["isActive"], json!(false));
    assert_eq!(body["data"]["pagination"]["page"], json!(2));
}

#[tokio::test]
async fn test_missing_record_names_resource() {
    let uri = format!("/api/positions/{}", Uuid::new_v4());
    let (status, body) = send(app(), request(Method::GET, &uri, Some(HR_TOKEN), None)).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["message"].as_str().unwrap().starts_with("Position"));
}

// =============================================================================
// Leave and timesheets
// =============================================================================

#[tokio::test]
async fn test_rejection_without_comments() {
    let uri = format!("/api/leaves/{}/status", Uuid::new_v4());
    let (status, body) = send(
        app(),
        request(Method::PUT, &uri, Some(HR_TOKEN), Some(json!({ "status": "Rejected" }))),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["errors"][0]["field"], json!("approverComments"));
}

#[tokio::test]
async fn test_employee_cannot_decide_leave() {
    let uri = format!("/api/leaves/{}/status", Uuid::new_v4());
    let (status, _) = send(
        app(),
        request(
            Method::PUT,
            &uri,
            Some(EMPLOYEE_TOKEN),
            Some(json!({ "status": "Approved" })),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_timesheet_week_must_start_monday() {
    let (status, body) = send(
        app(),
        request(
            Method::POST,
            "/api/timesheets",
            Some(EMPLOYEE_TOKEN),
            Some(json!({
                "weekStartDate": "2024-01-02",
                "entries": [{ "date": "2024-01-02", "hours": 8 }]
            })),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["errors"][0]["field"], json!("weekStartDate"));
}

// =============================================================================
// Admin console
// =============================================================================

#[tokio::test]
async fn test_admin_routes_absent_without_console() {
    let (status, _) = send(app(), request(Method::GET, "/api/admin/config", Some(ADMIN_TOKEN), None)).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_admin_config_masks_secrets() {
    let dir = tempfile::tempdir().unwrap();
    let env_path = dir.path().join(".env");
    std::fs::write(&env_path, "PORT=3000\nJWT_SECRET=hunter2\n").unwrap();

    let mut state = state();
    state.admin = Some(AdminServices {
        config: Arc::new(DotenvConfig::new(&env_path)),
        logs: Arc::new(LogReader::new(dir.path())),
        database: Arc::new(FakeDatabaseService),
    });
    let app = create_router(state);

    let (status, body) = send(
        app.clone(),
        request(Method::GET, "/api/admin/config", Some(ADMIN_TOKEN), None),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["PORT"], json!("3000"));
    assert_eq!(body["data"]["JWT_SECRET"], json!("********"));

    let (status, _) = send(
        app,
        request(Method::GET, "/api/admin/config", Some(HR_TOKEN), None),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_admin_log_of_missing_file_is_empty() {
    let dir = tempfile::tempdir().unwrap();

    let mut state = state();
    state.admin = Some(AdminServices {
        config: Arc::new(DotenvConfig::new(dir.path().join(".env"))),
        logs: Arc::new(LogReader::new(dir.path())),
        database: Arc::new(FakeDatabaseService),
    });

    let (status, body) = send(
        create_router(state),
        request(Method::GET, "/api/admin/logs/app?lines=10", Some(ADMIN_TOKEN), None),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["type"], json!("app"));
    assert_eq!(body["data"]["pagination"]["total"], json!(0));
}
