//! Migration: Create records table holding every HRM resource document.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Records::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Records::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Records::Resource).string_len(32).not_null())
                    .col(ColumnDef::new(Records::NaturalKey).string().null())
                    .col(ColumnDef::new(Records::Data).json_binary().not_null())
                    .col(
                        ColumnDef::new(Records::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(Records::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(Records::DeletedAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .to_owned(),
            )
            .await?;

        // NULL keys never collide, so deleted records free their key
        manager
            .create_index(
                Index::create()
                    .name("idx_records_resource_natural_key")
                    .table(Records::Table)
                    .col(Records::Resource)
                    .col(Records::NaturalKey)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_records_resource_created_at")
                    .table(Records::Table)
                    .col(Records::Resource)
                    .col(Records::CreatedAt)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_records_deleted_at")
                    .table(Records::Table)
                    .col(Records::DeletedAt)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Records::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Records {
    Table,
    Id,
    Resource,
    NaturalKey,
    Data,
    CreatedAt,
    UpdatedAt,
    DeletedAt,
}
