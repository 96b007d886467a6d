//! `/:id` path parameter, validated with the `idParam` schema.

use axum::{
    async_trait,
    extract::{FromRequestParts, Path},
    http::request::Parts,
};
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use super::validated_json::{validated, RequestSchema};
use crate::errors::AppError;
use crate::validation::SchemaName;

#[derive(Deserialize)]
struct IdParam {
    id: Uuid,
}

impl RequestSchema for IdParam {
    const SCHEMA: SchemaName = SchemaName::IdParam;
}

/// A malformed id is a 400 with a field error on `id`, never a 404.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PathId(pub Uuid);

#[async_trait]
impl<S> FromRequestParts<S> for PathId
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(raw) = Path::<String>::from_request_parts(parts, state)
            .await
            .map_err(|e| AppError::bad_request(e.body_text()))?;

        let IdParam { id } = validated(&json!({ "id": raw }))?;
        Ok(PathId(id))
    }
}
