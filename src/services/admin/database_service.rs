//! Database inspector behind the admin console.

use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use sea_orm::{
    AccessMode, ConnectionTrait, DatabaseConnection, DbBackend, FromQueryResult, JsonValue,
    QueryResult, Statement, TransactionTrait,
};
use serde::Serialize;
use serde_json::{json, Value};
use std::time::Instant;

use super::sql_guard::check_read_only;
use crate::errors::{AppError, AppResult};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

static IDENTIFIER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("valid identifier pattern"));

#[derive(Debug, Clone, PartialEq, Serialize, FromQueryResult)]
#[serde(rename_all = "camelCase")]
pub struct ColumnInfo {
    pub column_name: String,
    pub data_type: String,
    pub is_nullable: String,
    pub column_default: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TablePage {
    pub page: u64,
    pub limit: u64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct QueryOptions {
    pub read_only: bool,
    pub max_rows: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryResultSet {
    pub columns: Vec<String>,
    pub rows: Vec<Value>,
    pub row_count: usize,
    pub truncated: bool,
    pub duration_ms: u128,
}

impl QueryResultSet {
    /// Cap the rows at `max_rows`, flagging whether anything was dropped.
    pub fn new(mut rows: Vec<Value>, max_rows: usize, duration_ms: u128) -> Self {
        let truncated = rows.len() > max_rows;
        rows.truncate(max_rows);
        let columns = rows
            .first()
            .and_then(Value::as_object)
            .map(|row| row.keys().cloned().collect())
            .unwrap_or_default();
        Self {
            columns,
            row_count: rows.len(),
            rows,
            truncated,
            duration_ms,
        }
    }
}

#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait DatabaseService: Send + Sync {
    async fn list_tables(&self) -> AppResult<Vec<String>>;

    async fn table_schema(&self, table: &str) -> AppResult<Vec<ColumnInfo>>;

    async fn table_data(&self, table: &str, page: TablePage) -> AppResult<Value>;

    async fn execute_query(&self, sql: &str, options: QueryOptions) -> AppResult<QueryResultSet>;
}

pub struct DatabaseInspector {
    db: DatabaseConnection,
}

impl DatabaseInspector {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    fn statement(sql: &str, values: Vec<sea_orm::Value>) -> Statement {
        Statement::from_sql_and_values(DbBackend::Postgres, sql, values)
    }

    /// Only public tables that exist may be addressed by name.
    async fn known_table<'a>(&self, table: &'a str) -> AppResult<&'a str> {
        if !IDENTIFIER.is_match(table) || !self.list_tables().await?.iter().any(|t| t == table) {
            return Err(AppError::NotFoundEntity(format!("Table '{}'", table)));
        }
        Ok(table)
    }
}

fn rows_to_json(rows: Vec<QueryResult>) -> AppResult<Vec<Value>> {
    rows.iter()
        .map(|row| JsonValue::from_query_result(row, "").map_err(AppError::from))
        .collect()
}

#[async_trait]
impl DatabaseService for DatabaseInspector {
    async fn list_tables(&self) -> AppResult<Vec<String>> {
        let rows = self
            .db
            .query_all(Self::statement(
                "SELECT table_name FROM information_schema.tables \
                 WHERE table_schema = 'public' AND table_type = 'BASE TABLE' \
                 ORDER BY table_name",
                vec![],
            ))
            .await?;
        rows.iter()
            .map(|row| row.try_get::<String>("", "table_name").map_err(AppError::from))
            .collect()
    }

    async fn table_schema(&self, table: &str) -> AppResult<Vec<ColumnInfo>> {
        let table = self.known_table(table).await?;
        let columns = ColumnInfo::find_by_statement(Self::statement(
            "SELECT column_name, data_type, is_nullable, column_default \
             FROM information_schema.columns \
             WHERE table_schema = 'public' AND table_name = $1 \
             ORDER BY ordinal_position",
            vec![table.into()],
        ))
        .all(&self.db)
        .await?;
        Ok(columns)
    }

    async fn table_data(&self, table: &str, page: TablePage) -> AppResult<Value> {
        let table = self.known_table(table).await?;

        let total = self
            .db
            .query_one(Self::statement(
                &format!("SELECT COUNT(*) AS total FROM \"{}\"", table),
                vec![],
            ))
            .await?
            .map(|row| row.try_get::<i64>("", "total"))
            .transpose()?
            .unwrap_or_default();

        let offset = (page.page.saturating_sub(1)) * page.limit;
        let rows = self
            .db
            .query_all(Self::statement(
                &format!("SELECT * FROM \"{}\" LIMIT $1 OFFSET $2", table),
                vec![(page.limit as i64).into(), (offset as i64).into()],
            ))
            .await?;

        let total = total.max(0) as u64;
        Ok(json!({
            "table": table,
            "rows": rows_to_json(rows)?,
            "pagination": {
                "page": page.page,
                "limit": page.limit,
                "total": total,
                "totalPages": total.div_ceil(page.limit.max(1)),
            }
        }))
    }

    async fn execute_query(&self, sql: &str, options: QueryOptions) -> AppResult<QueryResultSet> {
        if options.read_only {
            if let Err(err) = check_read_only(sql) {
                tracing::warn!(error = %err, "query console statement refused");
                return Err(err);
            }
        }

        let started = Instant::now();
        let statement = Self::statement(sql, vec![]);
        let rows = if options.read_only {
            let txn = self
                .db
                .begin_with_config(None, Some(AccessMode::ReadOnly))
                .await?;
            let rows = txn.query_all(statement).await;
            txn.rollback().await?;
            rows?
        } else {
            tracing::warn!("query console running a writable statement");
            self.db.query_all(statement).await?
        };

        let result = QueryResultSet::new(
            rows_to_json(rows)?,
            options.max_rows,
            started.elapsed().as_millis(),
        );
        tracing::info!(
            rows = result.row_count,
            truncated = result.truncated,
            read_only = options.read_only,
            "query console statement executed"
        );
        Ok(result)
    }
}
