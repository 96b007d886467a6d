//! Debug console inputs.

use super::common::{digits, int_between, text};
use crate::config::{
    DEFAULT_LOG_LINES, DEFAULT_MAX_ROWS, DEFAULT_TABLE_PAGE_SIZE, MAX_LOG_LINES, MAX_QUERY_LENGTH,
    MAX_QUERY_ROWS, MAX_TABLE_PAGE_SIZE,
};
use crate::validation::registry::SchemaName;
use crate::validation::rules::{Field, Kind, Schema, StringRule};

pub fn schemas() -> Vec<(SchemaName, Schema)> {
    vec![
        (SchemaName::UpdateConfig, update_config()),
        (SchemaName::LogQuery, log_query()),
        (SchemaName::TableQuery, table_query()),
        (SchemaName::ExecuteQuery, execute_query()),
    ]
}

fn update_config() -> Schema {
    Schema::new(vec![
        Field::required(
            "key",
            digits(
                r"^[A-Z][A-Z0-9_]*$",
                "must be upper-case letters, digits and underscores",
            ),
        ),
        Field::required(
            "value",
            Kind::String(StringRule {
                trim: false,
                allow_empty: true,
                max_len: Some(2000),
                ..Default::default()
            }),
        ),
    ])
}

fn log_query() -> Schema {
    Schema::new(vec![
        Field::with_default("lines", int_between(1, MAX_LOG_LINES), DEFAULT_LOG_LINES),
        Field::with_default("offset", int_between(0, i64::from(u32::MAX)), 0),
        Field::optional("search", text(200)),
    ])
}

fn table_query() -> Schema {
    Schema::new(vec![
        Field::with_default("page", int_between(1, i64::from(u32::MAX)), 1),
        Field::with_default(
            "limit",
            int_between(1, MAX_TABLE_PAGE_SIZE),
            DEFAULT_TABLE_PAGE_SIZE,
        ),
    ])
}

fn execute_query() -> Schema {
    Schema::new(vec![
        Field::required(
            "sql",
            Kind::String(StringRule {
                max_len: Some(MAX_QUERY_LENGTH),
                ..Default::default()
            }),
        ),
        Field::with_default("readOnly", Kind::Boolean, true),
        Field::with_default("maxRows", int_between(1, MAX_QUERY_ROWS), DEFAULT_MAX_ROWS),
    ])
}
