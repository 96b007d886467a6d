//! Position handlers.

use axum::{extract::State, routing::get, Extension, Router};
use serde_json::Value;

use crate::api::extractors::{PathId, ValidatedJson, ValidatedQuery};
use crate::api::middleware::{require_role, CurrentUser, HR_ROLES};
use crate::api::AppState;
use crate::document;
use crate::domain::Resource;
use crate::errors::AppResult;
use crate::types::{ApiResponse, Created, ErrorEnvelope, Paginated};

document!(NewPosition => CreatePosition);
document!(PositionChanges => UpdatePosition);
document!(PositionFilter => ListQuery);

pub fn position_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_positions).post(create_position))
        .route(
            "/:id",
            get(get_position).put(update_position).delete(delete_position),
        )
}

/// List positions
#[utoipa::path(
    get,
    path = "/api/positions",
    tag = "Positions",
    security(("bearer_auth" = [])),
    params(
        ("page" = Option<u64>, Query, description = "Page number, from 1"),
        ("limit" = Option<u64>, Query, description = "Page size, at most 100"),
        ("search" = Option<String>, Query, description = "Case-insensitive title search"),
        ("isActive" = Option<bool>, Query, description = "Active filter")
    ),
    responses(
        (status = 200, description = "Page of positions"),
        (status = 400, description = "Invalid query", body = ErrorEnvelope)
    )
)]
pub async fn list_positions(
    State(state): State<AppState>,
    ValidatedQuery(PositionFilter(query)): ValidatedQuery<PositionFilter>,
) -> AppResult<ApiResponse<Paginated<Value>>> {
    let page = state.record_service.list(Resource::Position, query).await?;
    Ok(ApiResponse::success(page))
}

#[utoipa::path(
    get,
    path = "/api/positions/{id}",
    tag = "Positions",
    security(("bearer_auth" = [])),
    params(("id" = String, Path, description = "Position id (UUID)")),
    responses(
        (status = 200, description = "Position"),
        (status = 404, description = "Position not found", body = ErrorEnvelope)
    )
)]
pub async fn get_position(
    State(state): State<AppState>,
    PathId(id): PathId,
) -> AppResult<ApiResponse<Value>> {
    let position = state.record_service.get(Resource::Position, id).await?;
    Ok(ApiResponse::success(position))
}

/// Create a position (Admin, HR)
#[utoipa::path(
    post,
    path = "/api/positions",
    tag = "Positions",
    security(("bearer_auth" = [])),
    responses(
        (status = 201, description = "Position created"),
        (status = 400, description = "Validation error", body = ErrorEnvelope),
        (status = 403, description = "Forbidden", body = ErrorEnvelope)
    )
)]
pub async fn create_position(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    ValidatedJson(NewPosition(input)): ValidatedJson<NewPosition>,
) -> AppResult<Created<Value>> {
    require_role(&current_user, HR_ROLES)?;
    let position = state.record_service.create(Resource::Position, input).await?;
    Ok(Created(position))
}

/// Update a position (Admin, HR)
#[utoipa::path(
    put,
    path = "/api/positions/{id}",
    tag = "Positions",
    security(("bearer_auth" = [])),
    params(("id" = String, Path, description = "Position id (UUID)")),
    responses(
        (status = 200, description = "Position updated"),
        (status = 400, description = "Validation error or salary band inverted", body = ErrorEnvelope),
        (status = 404, description = "Position not found", body = ErrorEnvelope)
    )
)]
pub async fn update_position(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    PathId(id): PathId,
    ValidatedJson(PositionChanges(changes)): ValidatedJson<PositionChanges>,
) -> AppResult<ApiResponse<Value>> {
    require_role(&current_user, HR_ROLES)?;
    let position = state
        .record_service
        .update(Resource::Position, id, changes)
        .await?;
    Ok(ApiResponse::with_message(position, "Position updated successfully"))
}

/// Delete a position (Admin, HR)
#[utoipa::path(
    delete,
    path = "/api/positions/{id}",
    tag = "Positions",
    security(("bearer_auth" = [])),
    params(("id" = String, Path, description = "Position id (UUID)")),
    responses(
        (status = 200, description = "Position deleted"),
        (status = 404, description = "Position not found", body = ErrorEnvelope)
    )
)]
pub async fn delete_position(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    PathId(id): PathId,
) -> AppResult<ApiResponse<()>> {
    require_role(&current_user, HR_ROLES)?;
    state.record_service.delete(Resource::Position, id).await?;
    Ok(ApiResponse::message("Position deleted successfully"))
}
