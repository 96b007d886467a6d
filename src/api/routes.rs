//! Application route configuration.

use axum::{extract::State, http::StatusCode, middleware, routing::get, Router};
use serde::Serialize;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use super::handlers::{
    account_routes, admin_routes, auth_routes, department_routes, employee_routes, leave_routes,
    payroll_routes, position_routes, timesheet_routes,
};
use super::middleware::auth_middleware;
use super::openapi::ApiDoc;
use super::AppState;
use crate::errors::AppError;
use crate::types::ApiResponse;

/// Create the application router with all routes configured
pub fn create_router(state: AppState) -> Router {
    // Everything here requires a bearer token
    let mut protected = Router::new()
        .merge(account_routes())
        .nest("/employees", employee_routes())
        .nest("/departments", department_routes())
        .nest("/positions", position_routes())
        .nest("/leaves", leave_routes())
        .nest("/timesheets", timesheet_routes())
        .nest("/payroll", payroll_routes());

    if state.admin.is_some() {
        protected = protected.nest("/admin", admin_routes());
    }

    let api = Router::new()
        .route("/health", get(health))
        .nest("/auth", auth_routes())
        .merge(protected.route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        )));

    Router::new()
        .route("/", get(root))
        // OpenAPI Swagger UI documentation
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .nest("/api", api)
        .fallback(not_found)
        // Global middleware
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Root endpoint
async fn root() -> &'static str {
    "HRM API"
}

async fn not_found() -> AppError {
    AppError::NotFoundEntity("Route".into())
}

/// Health check payload
#[derive(Serialize)]
struct HealthStatus {
    status: &'static str,
    database: &'static str,
}

/// Health check endpoint with database connectivity check
async fn health(State(state): State<AppState>) -> (StatusCode, ApiResponse<HealthStatus>) {
    let database = match &state.database {
        None => "not configured",
        Some(db) => match db.ping().await {
            Ok(_) => "healthy",
            Err(e) => {
                tracing::warn!(error = %e, "health check could not reach the database");
                "unhealthy"
            }
        },
    };

    let healthy = database != "unhealthy";
    let status_code = if healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (
        status_code,
        ApiResponse::success(HealthStatus {
            status: if healthy { "healthy" } else { "degraded" },
            database,
        }),
    )
}
