use serde_json::{Map, Value};

use super::common::{
    email, employee_code, one_of_any_case, secret, strong_password, text_of,
};
use crate::config::{MIN_LOGIN_PASSWORD_LENGTH, ROLE_EMPLOYEE, VALID_ROLES};
use crate::validation::error::ErrorCode;
use crate::validation::registry::SchemaName;
use crate::validation::rules::{
    Context, CrossRule, Field, Kind, Pattern, Schema, StringRule,
};

pub fn schemas() -> Vec<(SchemaName, Schema)> {
    vec![
        (SchemaName::Login, login()),
        (SchemaName::Register, register()),
        (SchemaName::ChangePassword, change_password()),
    ]
}

fn login() -> Schema {
    Schema::new(vec![
        Field::required("email", email()),
        Field::required("password", secret(Some(MIN_LOGIN_PASSWORD_LENGTH))),
    ])
}

fn register() -> Schema {
    Schema::new(vec![
        Field::required("employeeId", employee_code()),
        Field::required(
            "username",
            Kind::String(StringRule {
                min_len: Some(3),
                max_len: Some(30),
                pattern: Some(Pattern::new(
                    r"^[a-zA-Z0-9_]+$",
                    "can only contain letters, numbers and underscores",
                )),
                ..Default::default()
            }),
        ),
        Field::required("email", email()),
        Field::required("password", strong_password()),
        Field::required("confirmPassword", secret(None)),
        Field::with_default("role", one_of_any_case(VALID_ROLES), ROLE_EMPLOYEE),
    ])
    .with_rules(vec![CrossRule {
        field: "confirmPassword",
        requires: &["password", "confirmPassword"],
        code: ErrorCode::Custom,
        check: confirmation_matches_password,
    }])
}

fn change_password() -> Schema {
    Schema::new(vec![
        Field::required("currentPassword", secret(None)),
        Field::required("newPassword", strong_password()),
        Field::required("confirmPassword", secret(None)),
    ])
    .with_rules(vec![
        CrossRule {
            field: "newPassword",
            requires: &["currentPassword", "newPassword"],
            code: ErrorCode::Custom,
            check: new_password_differs,
        },
        CrossRule {
            field: "confirmPassword",
            requires: &["newPassword", "confirmPassword"],
            code: ErrorCode::Custom,
            check: confirmation_matches_new_password,
        },
    ])
}

fn confirmation_matches_password(value: &Map<String, Value>, _: &Context) -> Result<(), String> {
    if text_of(value, "password") == text_of(value, "confirmPassword") {
        Ok(())
    } else {
        Err("Passwords do not match".to_string())
    }
}

fn confirmation_matches_new_password(
    value: &Map<String, Value>,
    _: &Context,
) -> Result<(), String> {
    if text_of(value, "newPassword") == text_of(value, "confirmPassword") {
        Ok(())
    } else {
        Err("Passwords do not match".to_string())
    }
}

fn new_password_differs(value: &Map<String, Value>, _: &Context) -> Result<(), String> {
    if text_of(value, "newPassword") == text_of(value, "currentPassword") {
        Err("New password must be different from current password".to_string())
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use crate::validation::{validate, ErrorCode, SchemaName};

    #[test]
    fn test_register_defaults_role_and_normalizes() {
        let outcome = validate(
            SchemaName::Register,
            &json!({
                "employeeId": "emp001",
                "username": "jane_doe",
                "email": "Jane@Corp.COM",
                "password": "Str0ng!Pass",
                "confirmPassword": "Str0ng!Pass"
            }),
        )
        .unwrap();
        let value = outcome.value().unwrap();

        assert_eq!(value["employeeId"], json!("EMP001"));
        assert_eq!(value["email"], json!("jane@corp.com"));
        assert_eq!(value["role"], json!("Employee"));
    }

    #[test]
    fn test_register_role_is_case_insensitive() {
        let outcome = validate(
            SchemaName::Register,
            &json!({
                "employeeId": "EMP123",
                "username": "hr_lead",
                "email": "hr@corp.com",
                "password": "Str0ng!Pass",
                "confirmPassword": "Str0ng!Pass",
                "role": "hr"
            }),
        )
        .unwrap();

        assert_eq!(outcome.value().unwrap()["role"], json!("HR"));
    }

    #[test]
    fn test_register_rejects_weak_password() {
        let outcome = validate(
            SchemaName::Register,
            &json!({
                "employeeId": "EMP123",
                "username": "weak",
                "email": "weak@corp.com",
                "password": "alllowercase1",
                "confirmPassword": "alllowercase1"
            }),
        )
        .unwrap();
        let errors = outcome.errors().unwrap();

        assert_eq!(errors.len(), 1);
        assert_eq!(errors.get("password").unwrap().code, ErrorCode::Pattern);
    }

    #[test]
    fn test_register_confirmation_mismatch() {
        let outcome = validate(
            SchemaName::Register,
            &json!({
                "employeeId": "EMP123",
                "username": "mismatch",
                "email": "m@corp.com",
                "password": "Str0ng!Pass",
                "confirmPassword": "Str0ng!Pas"
            }),
        )
        .unwrap();

        assert_eq!(
            outcome.errors().unwrap().get("confirmPassword").unwrap().message,
            "Passwords do not match"
        );
    }

    #[test]
    fn test_change_password_must_differ() {
        let outcome = validate(
            SchemaName::ChangePassword,
            &json!({
                "currentPassword": "Str0ng!Pass",
                "newPassword": "Str0ng!Pass",
                "confirmPassword": "Str0ng!Pass"
            }),
        )
        .unwrap();
        let errors = outcome.errors().unwrap();

        assert_eq!(errors.len(), 1);
        assert!(errors.contains("newPassword"));
    }
}
