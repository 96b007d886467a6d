//! Centralized error handling.
//!
//! Every failure leaves the API as the same envelope
//! `{ "success": false, "message": ..., "errors"?: [...] }`.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::types::ApiResponse;
use crate::validation::{FieldErrors, UnknownSchema};

/// Application error types
#[derive(Error, Debug)]
pub enum AppError {
    // Authentication & Authorization
    #[error("Authentication required")]
    Unauthorized,

    #[error("Access denied")]
    Forbidden,

    /// Refused before any side effect; the message names the constraint.
    #[error("{0}")]
    NotPermitted(String),

    #[error("Invalid credentials")]
    InvalidCredentials,

    // Resource errors
    #[error("Resource not found")]
    NotFound,

    #[error("{0} not found")]
    NotFoundEntity(String),

    #[error("{0} already exists")]
    Conflict(String),

    /// The record exists but its current state forbids the operation.
    #[error("{0}")]
    InvalidState(String),

    // Validation
    #[error("{message}")]
    Validation { message: String, errors: FieldErrors },

    #[error("Invalid input: {0}")]
    BadRequest(String),

    // External service errors
    #[error("Database error")]
    Database(#[from] sea_orm::DbErr),

    #[error("Authentication error")]
    Jwt(#[from] jsonwebtoken::errors::Error),

    #[error("I/O error")]
    Io(#[from] std::io::Error),

    // Internal
    #[error("Internal server error")]
    Internal(String),
}

impl AppError {
    /// Machine-readable code, used in logs
    pub fn code(&self) -> &'static str {
        match self {
            AppError::Unauthorized => "UNAUTHORIZED",
            AppError::Forbidden => "FORBIDDEN",
            AppError::NotPermitted(_) => "NOT_PERMITTED",
            AppError::InvalidCredentials => "INVALID_CREDENTIALS",
            AppError::NotFound | AppError::NotFoundEntity(_) => "NOT_FOUND",
            AppError::Conflict(_) => "CONFLICT",
            AppError::InvalidState(_) => "INVALID_STATE",
            AppError::Validation { .. } => "VALIDATION_ERROR",
            AppError::BadRequest(_) => "BAD_REQUEST",
            AppError::Database(_) => "DATABASE_ERROR",
            AppError::Jwt(_) => "AUTH_ERROR",
            AppError::Io(_) => "IO_ERROR",
            AppError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Get HTTP status code
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Unauthorized | AppError::InvalidCredentials | AppError::Jwt(_) => {
                StatusCode::UNAUTHORIZED
            }
            AppError::Forbidden | AppError::NotPermitted(_) => StatusCode::FORBIDDEN,
            AppError::NotFound | AppError::NotFoundEntity(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) | AppError::InvalidState(_) => StatusCode::CONFLICT,
            AppError::Validation { .. } | AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Database(_) | AppError::Io(_) | AppError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Get user-facing message (hides internal details)
    fn user_message(&self) -> String {
        match self {
            AppError::Database(e) => {
                tracing::error!("Database error: {:?}", e);
                "A database error occurred".to_string()
            }
            AppError::Jwt(e) => {
                tracing::debug!("JWT error: {:?}", e);
                "Invalid or expired token".to_string()
            }
            AppError::Io(e) => {
                tracing::error!("I/O error: {:?}", e);
                "An internal error occurred".to_string()
            }
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                "An internal error occurred".to_string()
            }
            _ => self.to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = self.user_message();
        let errors = match self {
            AppError::Validation { errors, .. } => Some(errors.into_vec()),
            _ => None,
        };

        (status, ApiResponse::failure(message, errors)).into_response()
    }
}

impl From<FieldErrors> for AppError {
    fn from(errors: FieldErrors) -> Self {
        AppError::Validation {
            message: errors.summary(),
            errors,
        }
    }
}

impl From<UnknownSchema> for AppError {
    fn from(err: UnknownSchema) -> Self {
        AppError::Internal(err.to_string())
    }
}

/// Result type alias
pub type AppResult<T> = Result<T, AppError>;

/// Extension trait for Option -> AppError conversion
pub trait OptionExt<T> {
    /// Not found, naming the missing entity
    fn ok_or_missing(self, entity: &str) -> AppResult<T>;
}

impl<T> OptionExt<T> for Option<T> {
    fn ok_or_missing(self, entity: &str) -> AppResult<T> {
        self.ok_or_else(|| AppError::NotFoundEntity(entity.to_string()))
    }
}

/// Convenience constructors
impl AppError {
    pub fn conflict(entity: impl Into<String>) -> Self {
        AppError::Conflict(entity.into())
    }

    pub fn invalid_state(msg: impl Into<String>) -> Self {
        AppError::InvalidState(msg.into())
    }

    pub fn not_permitted(msg: impl Into<String>) -> Self {
        AppError::NotPermitted(msg.into())
    }

    pub fn bad_request(msg: impl Into<String>) -> Self {
        AppError::BadRequest(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        AppError::Internal(msg.into())
    }

    /// A validation failure on a single field, for checks that need I/O
    pub fn field(
        field: impl Into<String>,
        code: crate::validation::ErrorCode,
        message: impl Into<String>,
    ) -> Self {
        FieldErrors::single(field, code, message).into()
    }
}

#[cfg(test)]
mod tests {
    use axum::body::to_bytes;
    use serde_json::{json, Value};

    use super::*;
    use crate::validation::ErrorCode;

    async fn body_of(err: AppError) -> (StatusCode, Value) {
        let response = err.into_response();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_validation_error_envelope() {
        let err = AppError::field("email", ErrorCode::Email, "\"email\" must be a valid email");
        let (status, body) = body_of(err).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(
            body,
            json!({
                "success": false,
                "message": "\"email\" must be a valid email",
                "errors": [{ "field": "email", "message": "\"email\" must be a valid email" }]
            })
        );
    }

    #[tokio::test]
    async fn test_not_found_has_no_errors_array() {
        let (status, body) = body_of(AppError::NotFoundEntity("Employee".into())).await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body, json!({ "success": false, "message": "Employee not found" }));
    }

    #[tokio::test]
    async fn test_internal_details_are_hidden() {
        let (status, body) = body_of(UnknownSchema("doesNotExist".into()).into()).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["message"], json!("An internal error occurred"));
    }

    #[test]
    fn test_status_mapping() {
        assert_eq!(AppError::conflict("Employee").status(), StatusCode::CONFLICT);
        assert_eq!(AppError::not_permitted("DROP").status(), StatusCode::FORBIDDEN);
        assert_eq!(AppError::Unauthorized.status(), StatusCode::UNAUTHORIZED);
    }
}
