//! Record repository: every HRM resource lives in one JSONB-backed table.
//!
//! Query helpers are generic over [`ConnectionTrait`] so the pooled store
//! and the transaction-scoped repository share one implementation.

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, DatabaseConnection, DbErr,
    EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Select, Set, SqlErr,
};
use serde_json::Value;
use uuid::Uuid;

use super::entities::record::{self, ActiveModel, Entity as RecordEntity};
use crate::domain::{Record, Resource};
use crate::errors::{AppError, AppResult};
use crate::types::PaginationParams;

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparison {
    Eq,
    Gte,
    Lte,
}

impl Comparison {
    fn sql(&self) -> &'static str {
        match self {
            Comparison::Eq => "=",
            Comparison::Gte => ">=",
            Comparison::Lte => "<=",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Clause {
    Compare {
        key: String,
        op: Comparison,
        value: String,
    },
    OneOf {
        key: String,
        values: Vec<String>,
    },
    Search {
        keys: Vec<String>,
        term: String,
    },
}

/// Conditions on top-level document fields, compared as text.
///
/// ISO dates compare correctly as text, which is all the range filters need.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordFilter {
    clauses: Vec<Clause>,
}

impl RecordFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn eq(self, key: &str, value: impl Into<String>) -> Self {
        self.compare(key, Comparison::Eq, value)
    }

    pub fn gte(self, key: &str, value: impl Into<String>) -> Self {
        self.compare(key, Comparison::Gte, value)
    }

    pub fn lte(self, key: &str, value: impl Into<String>) -> Self {
        self.compare(key, Comparison::Lte, value)
    }

    pub fn compare(mut self, key: &str, op: Comparison, value: impl Into<String>) -> Self {
        self.clauses.push(Clause::Compare {
            key: key.to_string(),
            op,
            value: value.into(),
        });
        self
    }

    pub fn one_of(mut self, key: &str, values: &[&str]) -> Self {
        self.clauses.push(Clause::OneOf {
            key: key.to_string(),
            values: values.iter().map(|v| v.to_string()).collect(),
        });
        self
    }

    /// Case-insensitive substring match on any of `keys`.
    pub fn search(mut self, keys: &[&str], term: &str) -> Self {
        self.clauses.push(Clause::Search {
            keys: keys.iter().map(|k| k.to_string()).collect(),
            term: term.to_string(),
        });
        self
    }

    /// Copy every string-valued query parameter in `keys` into an equality clause.
    pub fn eq_from(mut self, query: &serde_json::Map<String, Value>, keys: &[&str]) -> Self {
        for key in keys {
            if let Some(value) = query.get(*key).and_then(Value::as_str) {
                self = self.eq(key, value);
            }
        }
        self
    }

    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }

    fn apply(&self, mut select: Select<RecordEntity>) -> Select<RecordEntity> {
        for clause in &self.clauses {
            select = select.filter(clause.condition());
        }
        select
    }
}

impl Clause {
    fn condition(&self) -> Condition {
        match self {
            Clause::Compare { key, op, value } => Condition::all().add(Expr::cust_with_values(
                format!("data ->> ? {} ?", op.sql()),
                [key.clone(), value.clone()],
            )),
            Clause::OneOf { key, values } => values.iter().fold(Condition::any(), |cond, v| {
                cond.add(Expr::cust_with_values(
                    "data ->> ? = ?",
                    [key.clone(), v.clone()],
                ))
            }),
            Clause::Search { keys, term } => {
                let pattern = format!("%{}%", term);
                keys.iter().fold(Condition::any(), |cond, key| {
                    cond.add(Expr::cust_with_values(
                        "data ->> ? ILIKE ?",
                        [key.clone(), pattern.clone()],
                    ))
                })
            }
        }
    }
}

/// Record repository trait for dependency injection.
///
/// All queries exclude soft-deleted records.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait RecordRepository: Send + Sync {
    async fn find_by_id(&self, resource: Resource, id: Uuid) -> AppResult<Option<Record>>;

    /// Find by the resource's natural key (employee code, department code...)
    async fn find_by_key(&self, resource: Resource, key: &str) -> AppResult<Option<Record>>;

    /// One page, newest first, plus the total number of matches
    async fn list(
        &self,
        resource: Resource,
        filter: &RecordFilter,
        page: PaginationParams,
    ) -> AppResult<(Vec<Record>, u64)>;

    /// Every match, oldest first
    async fn find_all(&self, resource: Resource, filter: &RecordFilter) -> AppResult<Vec<Record>>;

    /// Insert; a natural key collision is a conflict
    async fn insert(&self, record: Record) -> AppResult<Record>;

    /// Overwrite document and key of an existing record
    async fn update(&self, record: Record) -> AppResult<Record>;

    /// Soft delete (sets deleted_at and frees the natural key)
    async fn delete(&self, resource: Resource, id: Uuid) -> AppResult<()>;
}

/// Concrete implementation of RecordRepository
pub struct RecordStore {
    db: DatabaseConnection,
}

impl RecordStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl RecordRepository for RecordStore {
    async fn find_by_id(&self, resource: Resource, id: Uuid) -> AppResult<Option<Record>> {
        find_by_id(&self.db, resource, id).await
    }

    async fn find_by_key(&self, resource: Resource, key: &str) -> AppResult<Option<Record>> {
        find_by_key(&self.db, resource, key).await
    }

    async fn list(
        &self,
        resource: Resource,
        filter: &RecordFilter,
        page: PaginationParams,
    ) -> AppResult<(Vec<Record>, u64)> {
        list(&self.db, resource, filter, page).await
    }

    async fn find_all(&self, resource: Resource, filter: &RecordFilter) -> AppResult<Vec<Record>> {
        find_all(&self.db, resource, filter).await
    }

    async fn insert(&self, record: Record) -> AppResult<Record> {
        insert(&self.db, record).await
    }

    async fn update(&self, record: Record) -> AppResult<Record> {
        update(&self.db, record).await
    }

    async fn delete(&self, resource: Resource, id: Uuid) -> AppResult<()> {
        delete(&self.db, resource, id).await
    }
}

fn live(resource: Resource) -> Select<RecordEntity> {
    RecordEntity::find()
        .filter(record::Column::Resource.eq(resource.as_str()))
        .filter(record::Column::DeletedAt.is_null())
}

fn to_records(models: Vec<record::Model>) -> AppResult<Vec<Record>> {
    models.into_iter().map(Record::try_from).collect()
}

/// Unique violations on the natural key surface as 409.
fn write_error(resource: Resource) -> impl Fn(DbErr) -> AppError {
    move |err| match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => AppError::conflict(resource.key_label()),
        _ => AppError::from(err),
    }
}

pub(crate) async fn find_by_id<C: ConnectionTrait>(
    db: &C,
    resource: Resource,
    id: Uuid,
) -> AppResult<Option<Record>> {
    live(resource)
        .filter(record::Column::Id.eq(id))
        .one(db)
        .await?
        .map(Record::try_from)
        .transpose()
}

pub(crate) async fn find_by_key<C: ConnectionTrait>(
    db: &C,
    resource: Resource,
    key: &str,
) -> AppResult<Option<Record>> {
    live(resource)
        .filter(record::Column::NaturalKey.eq(key))
        .one(db)
        .await?
        .map(Record::try_from)
        .transpose()
}

pub(crate) async fn list<C: ConnectionTrait>(
    db: &C,
    resource: Resource,
    filter: &RecordFilter,
    page: PaginationParams,
) -> AppResult<(Vec<Record>, u64)> {
    let total = filter.apply(live(resource)).count(db).await?;
    let models = filter
        .apply(live(resource))
        .order_by_desc(record::Column::CreatedAt)
        .offset(page.offset())
        .limit(page.limit)
        .all(db)
        .await?;

    Ok((to_records(models)?, total))
}

pub(crate) async fn find_all<C: ConnectionTrait>(
    db: &C,
    resource: Resource,
    filter: &RecordFilter,
) -> AppResult<Vec<Record>> {
    let models = filter
        .apply(live(resource))
        .order_by_asc(record::Column::CreatedAt)
        .all(db)
        .await?;
    to_records(models)
}

pub(crate) async fn insert<C: ConnectionTrait>(db: &C, record: Record) -> AppResult<Record> {
    let resource = record.resource;
    let active = ActiveModel {
        id: Set(record.id),
        resource: Set(resource.as_str().to_string()),
        natural_key: Set(record.natural_key.clone()),
        data: Set(Value::Object(record.data.clone())),
        created_at: Set(record.created_at),
        updated_at: Set(record.updated_at),
        deleted_at: Set(None),
    };

    active.insert(db).await.map_err(write_error(resource))?;
    Ok(record)
}

pub(crate) async fn update<C: ConnectionTrait>(db: &C, record: Record) -> AppResult<Record> {
    let resource = record.resource;
    let result = RecordEntity::update_many()
        .col_expr(record::Column::NaturalKey, Expr::value(record.natural_key.clone()))
        .col_expr(record::Column::Data, Expr::value(Value::Object(record.data.clone())))
        .col_expr(record::Column::UpdatedAt, Expr::value(record.updated_at))
        .filter(record::Column::Id.eq(record.id))
        .filter(record::Column::Resource.eq(resource.as_str()))
        .filter(record::Column::DeletedAt.is_null())
        .exec(db)
        .await
        .map_err(write_error(resource))?;

    if result.rows_affected == 0 {
        return Err(AppError::NotFoundEntity(resource.label().to_string()));
    }
    Ok(record)
}

pub(crate) async fn delete<C: ConnectionTrait>(
    db: &C,
    resource: Resource,
    id: Uuid,
) -> AppResult<()> {
    let now = Utc::now();
    let result = RecordEntity::update_many()
        .col_expr(record::Column::DeletedAt, Expr::value(Some(now)))
        .col_expr(record::Column::NaturalKey, Expr::value(Option::<String>::None))
        .col_expr(record::Column::UpdatedAt, Expr::value(now))
        .filter(record::Column::Id.eq(id))
        .filter(record::Column::Resource.eq(resource.as_str()))
        .filter(record::Column::DeletedAt.is_null())
        .exec(db)
        .await?;

    if result.rows_affected == 0 {
        return Err(AppError::NotFoundEntity(resource.label().to_string()));
    }
    Ok(())
}
