//! The schema interpreter.
//!
//! One generic walk over a [`Schema`]: coerce each declared field, apply its
//! constraints, strip undeclared keys, then run cross-field rules once every
//! field of the object is clean.

use chrono::{DateTime, Datelike, NaiveDate, NaiveTime, TimeZone, Utc, Weekday};
use serde_json::{Map, Value};
use uuid::Uuid;
use validator::ValidateEmail;

use super::error::{ErrorCode, FieldErrors, ROOT_FIELD};
use super::rules::{
    ArrayRule, Case, Context, DateRule, Kind, NumberRule, Presence, Schema, StringRule,
};

const SECONDS_PER_YEAR: f64 = 365.25 * 86_400.0;

/// Calendar years a date field may fall in.
pub const DATE_YEARS: std::ops::RangeInclusive<i32> = 1900..=9999;

/// Result of one validation run: exactly one of value or errors.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Valid(Map<String, Value>),
    Invalid(FieldErrors),
}

impl Outcome {
    pub fn is_valid(&self) -> bool {
        matches!(self, Outcome::Valid(_))
    }

    pub fn value(&self) -> Option<&Map<String, Value>> {
        match self {
            Outcome::Valid(value) => Some(value),
            Outcome::Invalid(_) => None,
        }
    }

    pub fn errors(&self) -> Option<&FieldErrors> {
        match self {
            Outcome::Valid(_) => None,
            Outcome::Invalid(errors) => Some(errors),
        }
    }

    pub fn into_result(self) -> Result<Map<String, Value>, FieldErrors> {
        match self {
            Outcome::Valid(value) => Ok(value),
            Outcome::Invalid(errors) => Err(errors),
        }
    }
}

/// Validate `payload` against `schema`.
pub fn run(schema: &Schema, payload: &Value, ctx: &Context) -> Outcome {
    let mut errors = FieldErrors::new();

    let Value::Object(input) = payload else {
        errors.push(
            ROOT_FIELD,
            ErrorCode::ObjectBase,
            format!("{} must be of type object", quoted(ROOT_FIELD)),
        );
        return Outcome::Invalid(errors);
    };

    let value = validate_object(schema, input, "", "", ctx, &mut errors);
    if errors.is_empty() {
        Outcome::Valid(value)
    } else {
        Outcome::Invalid(errors)
    }
}

fn validate_object(
    schema: &Schema,
    input: &Map<String, Value>,
    prefix: &str,
    label_prefix: &str,
    ctx: &Context,
    errors: &mut FieldErrors,
) -> Map<String, Value> {
    let before = errors.len();
    let mut output = Map::new();

    for field in schema.fields() {
        let path = join(prefix, field.name);
        let label = join(label_prefix, field.name);

        let value = match input.get(field.name) {
            Some(Value::Null) | None => match &field.presence {
                Presence::Default(default) => default,
                Presence::Optional => continue,
                Presence::Required => {
                    errors.push(
                        path,
                        ErrorCode::Required,
                        format!("{} is required", quoted(&label)),
                    );
                    continue;
                }
            },
            Some(value) => value,
        };

        if let Some(normalized) = check_value(&field.kind, value, &path, &label, ctx, errors) {
            output.insert(field.name.to_string(), normalized);
        }
    }

    // Cross-field rules only ever see clean data.
    if errors.len() > before {
        return output;
    }

    if let Some(min_keys) = schema.min_keys() {
        if output.len() < min_keys {
            let field = if prefix.is_empty() { ROOT_FIELD } else { prefix };
            errors.push(
                field,
                ErrorCode::ObjectMin,
                format!("{} must have at least {} key", quoted(field), min_keys),
            );
            return output;
        }
    }

    for rule in schema.rules() {
        if !rule.requires.iter().all(|name| output.contains_key(*name)) {
            continue;
        }
        if let Err(message) = (rule.check)(&output, ctx) {
            errors.push(join(prefix, rule.field), rule.code, message);
            break;
        }
    }

    output
}

/// A single failed constraint on a scalar.
struct Violation {
    code: ErrorCode,
    message: String,
}

impl Violation {
    fn new(code: ErrorCode, message: String) -> Self {
        Self { code, message }
    }
}

fn check_value(
    kind: &Kind,
    value: &Value,
    path: &str,
    label: &str,
    ctx: &Context,
    errors: &mut FieldErrors,
) -> Option<Value> {
    let result = match kind {
        Kind::String(rule) => check_string(rule, value, label),
        Kind::Number(rule) => check_number(rule, value, label),
        Kind::Date(rule) => check_date(rule, value, label, ctx),
        Kind::Boolean => check_boolean(value, label),
        Kind::Uuid => check_uuid(value, label),
        Kind::Array(rule) => return check_array(rule, value, path, label, ctx, errors),
        Kind::Object(schema) => return check_nested(schema, value, path, label, ctx, errors),
    };

    match result {
        Ok(normalized) => Some(normalized),
        Err(violation) => {
            errors.push(path, violation.code, violation.message);
            None
        }
    }
}

fn check_string(rule: &StringRule, value: &Value, label: &str) -> Result<Value, Violation> {
    let Value::String(raw) = value else {
        return Err(Violation::new(
            ErrorCode::StringBase,
            format!("{} must be a string", quoted(label)),
        ));
    };

    let trimmed = if rule.trim { raw.trim() } else { raw.as_str() };
    let text = match rule.case {
        Case::Preserve => trimmed.to_string(),
        Case::Lower => trimmed.to_lowercase(),
        Case::Upper => trimmed.to_uppercase(),
    };

    if text.is_empty() {
        if rule.allow_empty {
            return Ok(Value::String(text));
        }
        return Err(Violation::new(
            ErrorCode::Empty,
            format!("{} is not allowed to be empty", quoted(label)),
        ));
    }

    if let Some(choices) = &rule.choices {
        return match choices.resolve(&text) {
            Some(canonical) => Ok(Value::String(canonical.to_string())),
            None => Err(Violation::new(
                ErrorCode::OnlyAllowed,
                format!(
                    "{} must be one of [{}]",
                    quoted(label),
                    choices.values.join(", ")
                ),
            )),
        };
    }

    let length = text.chars().count();
    if let Some(min) = rule.min_len {
        if length < min {
            return Err(Violation::new(
                ErrorCode::MinLength,
                format!("{} length must be at least {} characters long", quoted(label), min),
            ));
        }
    }
    if let Some(max) = rule.max_len {
        if length > max {
            return Err(Violation::new(
                ErrorCode::MaxLength,
                format!(
                    "{} length must be less than or equal to {} characters long",
                    quoted(label),
                    max
                ),
            ));
        }
    }

    if rule.email && !text.validate_email() {
        return Err(Violation::new(
            ErrorCode::Email,
            format!("{} must be a valid email", quoted(label)),
        ));
    }

    if let Some(pattern) = &rule.pattern {
        if !pattern.is_match(&text) {
            return Err(Violation::new(
                ErrorCode::Pattern,
                format!("{} {}", quoted(label), pattern.message),
            ));
        }
    }

    Ok(Value::String(text))
}

fn check_number(rule: &NumberRule, value: &Value, label: &str) -> Result<Value, Violation> {
    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    let Some(mut number) = parsed.filter(|n| n.is_finite()) else {
        return Err(Violation::new(
            ErrorCode::NumberBase,
            format!("{} must be a number", quoted(label)),
        ));
    };

    if rule.integer && number.fract() != 0.0 {
        return Err(Violation::new(
            ErrorCode::Integer,
            format!("{} must be an integer", quoted(label)),
        ));
    }

    if let Some(places) = rule.precision {
        let factor = 10f64.powi(places as i32);
        number = (number * factor).round() / factor;
    }

    if let Some(min) = rule.min {
        if number < min {
            return Err(Violation::new(
                ErrorCode::NumberMin,
                format!("{} must be greater than or equal to {}", quoted(label), min),
            ));
        }
    }
    if let Some(max) = rule.max {
        if number > max {
            return Err(Violation::new(
                ErrorCode::NumberMax,
                format!("{} must be less than or equal to {}", quoted(label), max),
            ));
        }
    }

    Ok(number_value(number))
}

fn check_date(
    rule: &DateRule,
    value: &Value,
    label: &str,
    ctx: &Context,
) -> Result<Value, Violation> {
    let Some(date) = value.as_str().and_then(|s| parse_date(s.trim())) else {
        return Err(Violation::new(
            ErrorCode::DateBase,
            format!("{} must be a valid date", quoted(label)),
        ));
    };

    if rule.not_future && date > ctx.today() {
        return Err(Violation::new(
            ErrorCode::DateMax,
            format!("{} cannot be in the future", quoted(label)),
        ));
    }

    if let Some(min_age) = rule.min_age_years {
        if age_in_years(date, ctx.now) < min_age {
            return Err(Violation::new(
                ErrorCode::Custom,
                format!("{} indicates an age below {} years", quoted(label), min_age),
            ));
        }
    }

    if let Some(weekday) = rule.weekday {
        if date.weekday() != weekday {
            return Err(Violation::new(
                ErrorCode::DateWeekday,
                format!("{} must be a {}", quoted(label), weekday_name(weekday)),
            ));
        }
    }

    Ok(Value::String(format_date(date)))
}

fn check_boolean(value: &Value, label: &str) -> Result<Value, Violation> {
    let parsed = match value {
        Value::Bool(b) => Some(*b),
        Value::String(s) if s.trim().eq_ignore_ascii_case("true") => Some(true),
        Value::String(s) if s.trim().eq_ignore_ascii_case("false") => Some(false),
        _ => None,
    };

    parsed.map(Value::Bool).ok_or_else(|| {
        Violation::new(
            ErrorCode::BooleanBase,
            format!("{} must be a boolean", quoted(label)),
        )
    })
}

fn check_uuid(value: &Value, label: &str) -> Result<Value, Violation> {
    let Value::String(raw) = value else {
        return Err(Violation::new(
            ErrorCode::StringBase,
            format!("{} must be a string", quoted(label)),
        ));
    };

    Uuid::parse_str(raw.trim())
        .map(|id| Value::String(id.to_string()))
        .map_err(|_| {
            Violation::new(
                ErrorCode::Guid,
                format!("{} must be a valid GUID", quoted(label)),
            )
        })
}

fn check_array(
    rule: &ArrayRule,
    value: &Value,
    path: &str,
    label: &str,
    ctx: &Context,
    errors: &mut FieldErrors,
) -> Option<Value> {
    let Value::Array(items) = value else {
        errors.push(
            path,
            ErrorCode::ArrayBase,
            format!("{} must be an array", quoted(label)),
        );
        return None;
    };

    if let Some(min) = rule.min_items {
        if items.len() < min {
            errors.push(
                path,
                ErrorCode::ArrayMin,
                format!("{} must contain at least {} items", quoted(label), min),
            );
            return None;
        }
    }
    if let Some(max) = rule.max_items {
        if items.len() > max {
            errors.push(
                path,
                ErrorCode::ArrayMax,
                format!("{} must contain less than or equal to {} items", quoted(label), max),
            );
            return None;
        }
    }

    let before = errors.len();
    let mut normalized = Vec::with_capacity(items.len());
    for (index, item) in items.iter().enumerate() {
        let item_path = format!("{}.{}", path, index);
        let item_label = format!("{}[{}]", label, index);
        if let Some(value) = check_value(&rule.item, item, &item_path, &item_label, ctx, errors) {
            normalized.push(value);
        }
    }

    (errors.len() == before).then_some(Value::Array(normalized))
}

fn check_nested(
    schema: &Schema,
    value: &Value,
    path: &str,
    label: &str,
    ctx: &Context,
    errors: &mut FieldErrors,
) -> Option<Value> {
    let Value::Object(input) = value else {
        errors.push(
            path,
            ErrorCode::ObjectBase,
            format!("{} must be of type object", quoted(label)),
        );
        return None;
    };

    let before = errors.len();
    let normalized = validate_object(schema, input, path, label, ctx, errors);
    (errors.len() == before).then_some(Value::Object(normalized))
}

/// Parse `YYYY-MM-DD` or an RFC 3339 timestamp (taken in UTC).
///
/// Years outside [`DATE_YEARS`] are not dates.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .or_else(|| {
            DateTime::parse_from_rfc3339(raw)
                .ok()
                .map(|dt| dt.with_timezone(&Utc).date_naive())
        })
        .filter(|date| DATE_YEARS.contains(&date.year()))
}

pub fn format_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Age using a 365.25-day year, measured from midnight UTC of `dob`.
pub fn age_in_years(dob: NaiveDate, now: DateTime<Utc>) -> f64 {
    let born = Utc.from_utc_datetime(&dob.and_time(NaiveTime::MIN));
    (now - born).num_seconds() as f64 / SECONDS_PER_YEAR
}

/// Integral numbers stay integers so normalizing twice is a no-op.
fn number_value(number: f64) -> Value {
    if number.fract() == 0.0 && number.abs() < 9.0e15 {
        Value::from(number as i64)
    } else {
        serde_json::Number::from_f64(number).map_or(Value::Null, Value::Number)
    }
}

fn weekday_name(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
}

fn join(prefix: &str, name: &str) -> String {
    if prefix.is_empty() {
        name.to_string()
    } else {
        format!("{}.{}", prefix, name)
    }
}

fn quoted(label: &str) -> String {
    format!("\"{}\"", label)
}
