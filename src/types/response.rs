use axum::{http::StatusCode, response::IntoResponse, Json};
use serde::Serialize;
use utoipa::ToSchema;

use crate::validation::FieldError;

/// Uniform response envelope: `{ success, data?, message?, errors? }`
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<FieldError>>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: None,
            errors: None,
        }
    }

    pub fn with_message(data: T, message: impl Into<String>) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: Some(message.into()),
            errors: None,
        }
    }
}

impl ApiResponse<()> {
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            success: true,
            data: None,
            message: Some(message.into()),
            errors: None,
        }
    }

    /// Failure body; `errors` is only set for validation failures.
    pub fn failure(message: impl Into<String>, errors: Option<Vec<FieldError>>) -> Self {
        Self {
            success: false,
            data: None,
            message: Some(message.into()),
            errors,
        }
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> axum::response::Response {
        Json(self).into_response()
    }
}

/// OpenAPI shape of a failed response.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorEnvelope {
    #[schema(example = false)]
    pub success: bool,
    #[schema(example = "\"email\" must be a valid email")]
    pub message: String,
    /// Present only for validation failures
    pub errors: Option<Vec<FieldErrorBody>>,
}

/// OpenAPI shape of one entry in `errors`.
#[derive(Debug, Serialize, ToSchema)]
pub struct FieldErrorBody {
    /// Dotted path, e.g. `salary.allowances.hra`
    #[schema(example = "salary.allowances.hra")]
    pub field: String,
    pub message: String,
}

/// Created response helper for POST endpoints
pub struct Created<T: Serialize>(pub T);

impl<T: Serialize> IntoResponse for Created<T> {
    fn into_response(self) -> axum::response::Response {
        (StatusCode::CREATED, Json(ApiResponse::success(self.0))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::validation::{ErrorCode, FieldError};

    #[test]
    fn test_success_omits_empty_members() {
        let body = serde_json::to_value(ApiResponse::success(json!({ "id": 1 }))).unwrap();

        assert_eq!(body, json!({ "success": true, "data": { "id": 1 } }));
    }

    #[test]
    fn test_failure_carries_field_errors_without_codes() {
        let errors = vec![FieldError::new("salary.basicSalary", ErrorCode::NumberMin, "too low")];
        let body = serde_json::to_value(ApiResponse::failure("too low", Some(errors))).unwrap();

        assert_eq!(
            body,
            json!({
                "success": false,
                "message": "too low",
                "errors": [{ "field": "salary.basicSalary", "message": "too low" }]
            })
        );
    }
}
