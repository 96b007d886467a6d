//! Declarative constraint tables.
//!
//! A [`Schema`] is plain data: an ordered list of [`Field`]s, each carrying a
//! [`Kind`] with its bounds, plus a list of [`CrossRule`]s over sibling
//! fields. The engine in [`super::engine`] is the only code that interprets
//! these tables.

use chrono::{DateTime, NaiveDate, Utc, Weekday};
use regex::Regex;
use serde_json::{Map, Value};

use super::error::ErrorCode;

/// Evaluation context shared by every check of one validation run.
#[derive(Debug, Clone, Copy)]
pub struct Context {
    pub now: DateTime<Utc>,
}

impl Context {
    pub fn at(now: DateTime<Utc>) -> Self {
        Self { now }
    }

    pub fn today(&self) -> NaiveDate {
        self.now.date_naive()
    }
}

/// What happens when a field is absent (or `null`).
#[derive(Debug, Clone)]
pub enum Presence {
    Required,
    Optional,
    /// Substitute this value, then validate it like any input.
    Default(Value),
}

/// One declared field of a schema.
#[derive(Debug, Clone)]
pub struct Field {
    pub name: &'static str,
    pub kind: Kind,
    pub presence: Presence,
}

impl Field {
    pub fn required(name: &'static str, kind: Kind) -> Self {
        Self {
            name,
            kind,
            presence: Presence::Required,
        }
    }

    pub fn optional(name: &'static str, kind: Kind) -> Self {
        Self {
            name,
            kind,
            presence: Presence::Optional,
        }
    }

    pub fn with_default(name: &'static str, kind: Kind, default: impl Into<Value>) -> Self {
        Self {
            name,
            kind,
            presence: Presence::Default(default.into()),
        }
    }

    pub fn is_required(&self) -> bool {
        matches!(self.presence, Presence::Required)
    }
}

/// Value kind plus its constraints.
#[derive(Debug, Clone)]
pub enum Kind {
    String(StringRule),
    Number(NumberRule),
    Date(DateRule),
    Boolean,
    Uuid,
    Array(ArrayRule),
    Object(Schema),
}

/// Case folding applied to strings before any constraint runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Case {
    #[default]
    Preserve,
    Lower,
    Upper,
}

#[derive(Debug, Clone)]
pub struct StringRule {
    pub trim: bool,
    pub case: Case,
    pub allow_empty: bool,
    pub min_len: Option<usize>,
    pub max_len: Option<usize>,
    pub email: bool,
    pub pattern: Option<Pattern>,
    pub choices: Option<Choices>,
}

impl Default for StringRule {
    fn default() -> Self {
        Self {
            trim: true,
            case: Case::Preserve,
            allow_empty: false,
            min_len: None,
            max_len: None,
            email: false,
            pattern: None,
            choices: None,
        }
    }
}

/// One or more regular expressions that must all match.
#[derive(Debug, Clone)]
pub struct Pattern {
    checks: Vec<Regex>,
    /// Appended to the quoted field label, e.g. `must be exactly 10 digits`.
    pub message: &'static str,
}

impl Pattern {
    /// Compile a pattern from a literal; the literals are part of the code.
    pub fn new(regex: &str, message: &'static str) -> Self {
        Self::all(&[regex], message)
    }

    pub fn all(regexes: &[&str], message: &'static str) -> Self {
        let checks = regexes
            .iter()
            .map(|r| Regex::new(r).expect("schema patterns are valid literals"))
            .collect();
        Self { checks, message }
    }

    pub fn is_match(&self, value: &str) -> bool {
        self.checks.iter().all(|re| re.is_match(value))
    }
}

/// Closed set of accepted strings.
#[derive(Debug, Clone, Copy)]
pub struct Choices {
    pub values: &'static [&'static str],
    pub ignore_case: bool,
}

impl Choices {
    /// Canonical spelling of `input`, if it is one of the choices.
    pub fn resolve(&self, input: &str) -> Option<&'static str> {
        self.values.iter().copied().find(|candidate| {
            if self.ignore_case {
                candidate.eq_ignore_ascii_case(input)
            } else {
                *candidate == input
            }
        })
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct NumberRule {
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub integer: bool,
    /// Round to this many decimals before bounds are checked.
    pub precision: Option<u32>,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct DateRule {
    pub not_future: bool,
    /// Minimum age in 365.25-day years between the date and now.
    pub min_age_years: Option<f64>,
    pub weekday: Option<Weekday>,
}

#[derive(Debug, Clone)]
pub struct ArrayRule {
    pub item: Box<Kind>,
    pub min_items: Option<usize>,
    pub max_items: Option<usize>,
}

/// Predicate over the normalized sibling fields of one object.
pub type RuleCheck = fn(&Map<String, Value>, &Context) -> Result<(), String>;

/// Constraint spanning several fields of the same object.
#[derive(Debug, Clone)]
pub struct CrossRule {
    /// Field the failure is attributed to.
    pub field: &'static str,
    /// Fields that must be present for the rule to run.
    pub requires: &'static [&'static str],
    pub code: ErrorCode,
    pub check: RuleCheck,
}

/// Named, immutable payload shape.
#[derive(Debug, Clone, Default)]
pub struct Schema {
    fields: Vec<Field>,
    rules: Vec<CrossRule>,
    min_keys: Option<usize>,
}

impl Schema {
    pub fn new(fields: Vec<Field>) -> Self {
        Self {
            fields,
            rules: Vec::new(),
            min_keys: None,
        }
    }

    pub fn with_rules(mut self, rules: Vec<CrossRule>) -> Self {
        self.rules = rules;
        self
    }

    pub fn with_min_keys(mut self, min_keys: usize) -> Self {
        self.min_keys = Some(min_keys);
        self
    }

    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn rules(&self) -> &[CrossRule] {
        &self.rules
    }

    pub fn min_keys(&self) -> Option<usize> {
        self.min_keys
    }

    /// Update variant: every top-level field optional, top-level defaults
    /// dropped, at least one key required. Nested schemas are unchanged.
    pub fn partial(&self) -> Self {
        let fields = self
            .fields
            .iter()
            .cloned()
            .map(|field| Field {
                presence: Presence::Optional,
                ..field
            })
            .collect();

        Self {
            fields,
            rules: self.rules.clone(),
            min_keys: Some(1),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_choices_resolve_to_canonical_casing() {
        let choices = Choices {
            values: &["Monthly", "Bi-weekly"],
            ignore_case: true,
        };

        assert_eq!(choices.resolve("MONTHLY"), Some("Monthly"));
        assert_eq!(choices.resolve("bi-WEEKLY"), Some("Bi-weekly"));
        assert_eq!(choices.resolve("yearly"), None);
    }

    #[test]
    fn test_exact_choices_reject_other_casing() {
        let choices = Choices {
            values: &["Approved"],
            ignore_case: false,
        };

        assert_eq!(choices.resolve("approved"), None);
    }

    #[test]
    fn test_pattern_all_must_match() {
        let pattern = Pattern::all(&["[a-z]", "[0-9]"], "needs a letter and a digit");

        assert!(pattern.is_match("a1"));
        assert!(!pattern.is_match("aa"));
    }

    #[test]
    fn test_partial_relaxes_presence() {
        let schema = Schema::new(vec![
            Field::required("name", Kind::Boolean),
            Field::with_default("active", Kind::Boolean, true),
        ]);
        let partial = schema.partial();

        assert!(partial.fields().iter().all(|f| matches!(f.presence, Presence::Optional)));
        assert_eq!(partial.min_keys(), Some(1));
    }
}
