//! Field-level validation errors.
//!
//! A failed validation never aborts the request: it produces an ordered list
//! of [`FieldError`]s that the handler turns into a 400 response. The only
//! fatal condition is asking for a schema that was never registered.

use serde::Serialize;
use thiserror::Error;

/// Field name used when an error concerns the payload as a whole.
pub const ROOT_FIELD: &str = "value";

/// Machine-readable class of a validation failure.
///
/// Coercion failures (`*.base`) are kept apart from range and pattern
/// failures so a client can tell "wrong type" from "out of bounds".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    Required,
    StringBase,
    NumberBase,
    DateBase,
    BooleanBase,
    ArrayBase,
    ObjectBase,
    Empty,
    MinLength,
    MaxLength,
    Pattern,
    Email,
    Guid,
    OnlyAllowed,
    Integer,
    NumberMin,
    NumberMax,
    DateMin,
    DateMax,
    DateWeekday,
    ArrayMin,
    ArrayMax,
    ObjectMin,
    Custom,
}

impl ErrorCode {
    /// Dotted code, e.g. `any.required` or `date.min`.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::Required => "any.required",
            ErrorCode::StringBase => "string.base",
            ErrorCode::NumberBase => "number.base",
            ErrorCode::DateBase => "date.base",
            ErrorCode::BooleanBase => "boolean.base",
            ErrorCode::ArrayBase => "array.base",
            ErrorCode::ObjectBase => "object.base",
            ErrorCode::Empty => "string.empty",
            ErrorCode::MinLength => "string.min",
            ErrorCode::MaxLength => "string.max",
            ErrorCode::Pattern => "string.pattern.base",
            ErrorCode::Email => "string.email",
            ErrorCode::Guid => "string.guid",
            ErrorCode::OnlyAllowed => "any.only",
            ErrorCode::Integer => "number.integer",
            ErrorCode::NumberMin => "number.min",
            ErrorCode::NumberMax => "number.max",
            ErrorCode::DateMin => "date.min",
            ErrorCode::DateMax => "date.max",
            ErrorCode::DateWeekday => "date.weekday",
            ErrorCode::ArrayMin => "array.min",
            ErrorCode::ArrayMax => "array.max",
            ErrorCode::ObjectMin => "object.min",
            ErrorCode::Custom => "any.custom",
        }
    }

    /// True for the coercion ("wrong type") family.
    pub fn is_type_error(&self) -> bool {
        matches!(
            self,
            ErrorCode::StringBase
                | ErrorCode::NumberBase
                | ErrorCode::DateBase
                | ErrorCode::BooleanBase
                | ErrorCode::ArrayBase
                | ErrorCode::ObjectBase
        )
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One failed field, addressed by its dotted path.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
    #[serde(skip)]
    pub code: ErrorCode,
}

impl FieldError {
    pub fn new(field: impl Into<String>, code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
            code,
        }
    }
}

/// Ordered error set produced by a failed validation.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct FieldErrors(Vec<FieldError>);

impl FieldErrors {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    /// Shorthand for an error set holding a single entry.
    pub fn single(field: impl Into<String>, code: ErrorCode, message: impl Into<String>) -> Self {
        Self(vec![FieldError::new(field, code, message)])
    }

    pub fn push(&mut self, field: impl Into<String>, code: ErrorCode, message: impl Into<String>) {
        self.0.push(FieldError::new(field, code, message));
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, FieldError> {
        self.0.iter()
    }

    /// First error recorded for `field`, if any.
    pub fn get(&self, field: &str) -> Option<&FieldError> {
        self.0.iter().find(|e| e.field == field)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.get(field).is_some()
    }

    /// Human-readable summary used as the envelope `message`.
    pub fn summary(&self) -> String {
        match self.0.as_slice() {
            [] => "Validation failed".to_string(),
            [only] => only.message.clone(),
            [first, rest @ ..] => format!("{} (and {} more)", first.message, rest.len()),
        }
    }

    pub fn into_vec(self) -> Vec<FieldError> {
        self.0
    }
}

impl IntoIterator for FieldErrors {
    type Item = FieldError;
    type IntoIter = std::vec::IntoIter<FieldError>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a FieldErrors {
    type Item = &'a FieldError;
    type IntoIter = std::slice::Iter<'a, FieldError>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl From<Vec<FieldError>> for FieldErrors {
    fn from(errors: Vec<FieldError>) -> Self {
        Self(errors)
    }
}

/// A handler asked for a schema that is not in the registry.
///
/// This is a wiring bug, not bad input, and surfaces as a 500.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown validation schema: {0}")]
pub struct UnknownSchema(pub String);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_mentions_remaining_count() {
        let mut errors = FieldErrors::new();
        errors.push("email", ErrorCode::Email, "\"email\" must be a valid email");
        errors.push("password", ErrorCode::MinLength, "too short");

        assert_eq!(errors.summary(), "\"email\" must be a valid email (and 1 more)");
    }

    #[test]
    fn test_serializes_field_and_message_only() {
        let errors = FieldErrors::single("salary.basicSalary", ErrorCode::NumberMin, "must be >= 0");
        let json = serde_json::to_value(&errors).unwrap();

        assert_eq!(
            json,
            serde_json::json!([{ "field": "salary.basicSalary", "message": "must be >= 0" }])
        );
    }

    #[test]
    fn test_type_error_family() {
        assert!(ErrorCode::NumberBase.is_type_error());
        assert!(!ErrorCode::NumberMin.is_type_error());
        assert_eq!(ErrorCode::DateMin.as_str(), "date.min");
    }
}
