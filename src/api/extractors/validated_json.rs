//! Schema-validated extractors - Combine deserialization with validation.
//!
//! The payload is checked against its registry schema first; only the
//! normalized value is deserialized into the handler's type.

use std::collections::HashMap;

use axum::{
    async_trait,
    extract::{rejection::JsonRejection, FromRequest, FromRequestParts, Query, Request},
    http::request::Parts,
    Json,
};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::errors::{AppError, AppResult};
use crate::validation::{validate, SchemaName};

/// Binds a request type to the schema that validates it.
pub trait RequestSchema: DeserializeOwned {
    const SCHEMA: SchemaName;
}

/// Validate `payload` against `T::SCHEMA` and deserialize the normalized value.
pub fn validated<T: RequestSchema>(payload: &Value) -> AppResult<T> {
    let normalized = validate(T::SCHEMA, payload)?.into_result()?;
    serde_json::from_value(Value::Object(normalized)).map_err(|e| {
        AppError::internal(format!("schema {} produced an unexpected shape: {}", T::SCHEMA, e))
    })
}

/// Request body validated against its schema.
///
/// # Example
///
/// ```rust,ignore
/// async fn login(ValidatedJson(payload): ValidatedJson<LoginRequest>) {
///     // payload.email is already trimmed and lowercased
/// }
/// ```
pub struct ValidatedJson<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for ValidatedJson<T>
where
    S: Send + Sync,
    T: RequestSchema,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(payload): Json<Value> = Json::from_request(req, state)
            .await
            .map_err(|e: JsonRejection| AppError::bad_request(e.body_text()))?;

        Ok(ValidatedJson(validated(&payload)?))
    }
}

/// Query string validated against its schema.
///
/// Every query value arrives as a string; the validator coerces numbers
/// and booleans.
pub struct ValidatedQuery<T>(pub T);

#[async_trait]
impl<S, T> FromRequestParts<S> for ValidatedQuery<T>
where
    S: Send + Sync,
    T: RequestSchema,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(params) = Query::<HashMap<String, String>>::from_request_parts(parts, state)
            .await
            .map_err(|e| AppError::bad_request(e.body_text()))?;

        let payload: Map<String, Value> = params
            .into_iter()
            .map(|(key, value)| (key, Value::String(value)))
            .collect();

        Ok(ValidatedQuery(validated(&Value::Object(payload))?))
    }
}

/// Declare an open JSON document validated by a schema.
///
/// Services work on the normalized map directly, so these types only carry
/// the schema binding.
#[macro_export]
macro_rules! document {
    ($(#[$meta:meta])* $name:ident => $schema:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, serde::Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub serde_json::Map<String, serde_json::Value>);

        impl $crate::api::extractors::RequestSchema for $name {
            const SCHEMA: $crate::validation::SchemaName = $crate::validation::SchemaName::$schema;
        }
    };
}
