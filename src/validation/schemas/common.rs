//! Building blocks shared by the resource schemas.

use chrono::NaiveDate;
use serde_json::{Map, Value};

use crate::config::{
    DEFAULT_PAGE_NUMBER, DEFAULT_PAGE_SIZE, MAX_MONEY_AMOUNT, MAX_PAGE_SIZE, PASSWORD_SPECIALS,
};
use crate::validation::engine::parse_date;
use crate::validation::rules::{
    ArrayRule, Case, Choices, Context, DateRule, Field, Kind, NumberRule, Pattern, StringRule,
};

pub fn text(max: usize) -> Kind {
    Kind::String(StringRule {
        max_len: Some(max),
        ..Default::default()
    })
}

pub fn text_between(min: usize, max: usize) -> Kind {
    Kind::String(StringRule {
        min_len: Some(min),
        max_len: Some(max),
        ..Default::default()
    })
}

/// Letters and spaces only, e.g. first and last names.
pub fn person_name(min: usize, max: usize) -> Kind {
    Kind::String(StringRule {
        min_len: Some(min),
        max_len: Some(max),
        pattern: Some(Pattern::new(
            r"^[a-zA-Z\s]+$",
            "can only contain letters and spaces",
        )),
        ..Default::default()
    })
}

pub fn email() -> Kind {
    Kind::String(StringRule {
        case: Case::Lower,
        email: true,
        ..Default::default()
    })
}

pub fn employee_code() -> Kind {
    Kind::String(StringRule {
        case: Case::Upper,
        pattern: Some(Pattern::new(
            r"^EMP\d{3,}$",
            "must start with EMP followed by at least 3 digits",
        )),
        ..Default::default()
    })
}

pub fn digits(regex: &str, message: &'static str) -> Kind {
    Kind::String(StringRule {
        pattern: Some(Pattern::new(regex, message)),
        ..Default::default()
    })
}

pub fn phone() -> Kind {
    digits(r"^\d{10}$", "must be exactly 10 digits")
}

/// Upper-cased identifier with a fixed shape (PAN, IFSC, department codes).
pub fn code(regex: &str, message: &'static str) -> Kind {
    Kind::String(StringRule {
        case: Case::Upper,
        pattern: Some(Pattern::new(regex, message)),
        ..Default::default()
    })
}

/// 8–128 characters with lower, upper, digit and a special character.
pub fn strong_password() -> Kind {
    Kind::String(StringRule {
        trim: false,
        min_len: Some(8),
        max_len: Some(128),
        pattern: Some(Pattern::all(
            &["[a-z]", "[A-Z]", r"\d", PASSWORD_SPECIALS],
            "must contain at least one lowercase letter, one uppercase letter, one number and one special character (@$!%*?&)",
        )),
        ..Default::default()
    })
}

pub fn secret(min: Option<usize>) -> Kind {
    Kind::String(StringRule {
        trim: false,
        min_len: min,
        ..Default::default()
    })
}

pub fn one_of(values: &'static [&'static str]) -> Kind {
    Kind::String(StringRule {
        choices: Some(Choices {
            values,
            ignore_case: false,
        }),
        ..Default::default()
    })
}

/// Enumeration matched case-insensitively, normalized to canonical casing.
pub fn one_of_any_case(values: &'static [&'static str]) -> Kind {
    Kind::String(StringRule {
        choices: Some(Choices {
            values,
            ignore_case: true,
        }),
        ..Default::default()
    })
}

pub fn money() -> Kind {
    Kind::Number(NumberRule {
        min: Some(0.0),
        max: Some(MAX_MONEY_AMOUNT),
        integer: false,
        precision: Some(2),
    })
}

/// Money sub-field that falls back to 0 when omitted.
pub fn money_or_zero(name: &'static str) -> Field {
    Field::with_default(name, money(), 0)
}

pub fn int_between(min: i64, max: i64) -> Kind {
    Kind::Number(NumberRule {
        min: Some(min as f64),
        max: Some(max as f64),
        integer: true,
        precision: None,
    })
}

pub fn number_between(min: f64, max: f64) -> Kind {
    Kind::Number(NumberRule {
        min: Some(min),
        max: Some(max),
        integer: false,
        precision: Some(2),
    })
}

pub fn date() -> Kind {
    Kind::Date(DateRule::default())
}

pub fn past_date() -> Kind {
    Kind::Date(DateRule {
        not_future: true,
        ..Default::default()
    })
}

pub fn uuid_list(max: usize) -> Kind {
    Kind::Array(ArrayRule {
        item: Box::new(Kind::Uuid),
        min_items: Some(1),
        max_items: Some(max),
    })
}

pub fn page_fields() -> Vec<Field> {
    vec![
        Field::with_default("page", int_between(1, i64::from(u32::MAX)), DEFAULT_PAGE_NUMBER),
        Field::with_default("limit", int_between(1, MAX_PAGE_SIZE as i64), DEFAULT_PAGE_SIZE),
    ]
}

/// Read back a date the engine already normalized.
pub fn date_of(value: &Map<String, Value>, key: &str) -> Option<NaiveDate> {
    value.get(key).and_then(Value::as_str).and_then(parse_date)
}

pub fn number_of(value: &Map<String, Value>, key: &str) -> Option<f64> {
    value.get(key).and_then(Value::as_f64)
}

pub fn text_of<'a>(value: &'a Map<String, Value>, key: &str) -> Option<&'a str> {
    value.get(key).and_then(Value::as_str)
}

/// `endDate >= startDate`.
pub fn end_not_before_start(value: &Map<String, Value>, _: &Context) -> Result<(), String> {
    match (date_of(value, "startDate"), date_of(value, "endDate")) {
        (Some(start), Some(end)) if end < start => {
            Err("\"endDate\" must be greater than or equal to \"startDate\"".to_string())
        }
        _ => Ok(()),
    }
}

/// Days between start and end, exclusive of the start day.
pub fn span_days(value: &Map<String, Value>) -> Option<i64> {
    Some((date_of(value, "endDate")? - date_of(value, "startDate")?).num_days())
}

/// "Rejected" requires a non-empty comment in `comment_field`.
pub fn rejection_has_comment(
    value: &Map<String, Value>,
    comment_field: &str,
) -> Result<(), String> {
    let rejected = text_of(value, "status") == Some("Rejected");
    let has_comment = text_of(value, comment_field).is_some_and(|c| !c.trim().is_empty());

    if rejected && !has_comment {
        Err(format!("\"{}\" is required when rejecting", comment_field))
    } else {
        Ok(())
    }
}
