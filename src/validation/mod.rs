//! Request validation and data shaping.
//!
//! Every request payload is checked against a named [`Schema`](rules::Schema)
//! from the static [`registry`]. A run either yields the normalized payload
//! (defaults applied, strings trimmed and cased, numbers and dates coerced,
//! unknown keys removed) or an ordered list of field errors, never both.
//!
//! ```ignore
//! let outcome = validate(SchemaName::Login, &json!({ "email": "A@X.com", "password": "secret1" }))?;
//! assert_eq!(outcome.value().unwrap()["email"], "a@x.com");
//! ```

mod engine;
mod error;
mod registry;
pub mod rules;
mod schemas;

use chrono::{DateTime, Utc};
use serde_json::Value;

pub use engine::{age_in_years, format_date, parse_date, Outcome};
pub use error::{ErrorCode, FieldError, FieldErrors, UnknownSchema, ROOT_FIELD};
pub use registry::{registry, SchemaName, SchemaRegistry};

use rules::Context;

/// Validate `payload` against the schema `name` as of now.
pub fn validate(name: SchemaName, payload: &Value) -> Result<Outcome, UnknownSchema> {
    validate_at(name, payload, Utc::now())
}

/// Validate with an explicit clock for date rules.
pub fn validate_at(
    name: SchemaName,
    payload: &Value,
    now: DateTime<Utc>,
) -> Result<Outcome, UnknownSchema> {
    let schema = registry().get(name)?;
    Ok(engine::run(schema, payload, &Context::at(now)))
}

/// Validate against a schema looked up by its wire name.
pub fn validate_named(name: &str, payload: &Value) -> Result<Outcome, UnknownSchema> {
    validate(name.parse()?, payload)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_login_scenario_reports_both_fields() {
        let outcome = validate(SchemaName::Login, &json!({ "email": "BAD", "password": "x" })).unwrap();
        let errors = outcome.errors().unwrap();

        assert_eq!(errors.len(), 2);
        assert_eq!(errors.get("email").unwrap().code, ErrorCode::Email);
        assert_eq!(errors.get("password").unwrap().code, ErrorCode::MinLength);
        assert!(outcome.value().is_none());
    }

    #[test]
    fn test_login_lowercases_email() {
        let outcome = validate(
            SchemaName::Login,
            &json!({ "email": "Admin@X.com", "password": "secret1" }),
        )
        .unwrap();

        assert_eq!(outcome.value().unwrap()["email"], json!("admin@x.com"));
    }

    #[test]
    fn test_unknown_schema_is_distinct_from_invalid() {
        let err = validate_named("doesNotExist", &json!({})).unwrap_err();

        assert_eq!(err.to_string(), "unknown validation schema: doesNotExist");
    }
}
