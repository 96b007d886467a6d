//! Resource document entity.

use sea_orm::entity::prelude::*;

use crate::domain::{Record, Resource};
use crate::errors::AppError;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "records")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub resource: String,
    /// Unique per resource; cleared on soft delete so the key can be reused
    pub natural_key: Option<String>,
    #[sea_orm(column_type = "JsonBinary")]
    pub data: Json,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
    pub deleted_at: Option<DateTimeUtc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl TryFrom<Model> for Record {
    type Error = AppError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        let resource = Resource::parse(&model.resource).ok_or_else(|| {
            AppError::internal(format!("unknown resource '{}' in records", model.resource))
        })?;
        let data = match model.data {
            Json::Object(map) => map,
            _ => return Err(AppError::internal(format!("record {} is not an object", model.id))),
        };

        Ok(Record {
            id: model.id,
            resource,
            natural_key: model.natural_key,
            data,
            created_at: model.created_at,
            updated_at: model.updated_at,
        })
    }
}
