//! Create `prior_substance` table holding substance presets.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(PriorSubstance::Table)
                    .if_not_exists()
                    .col(uuid(PriorSubstance::Id).primary_key())
                    .col(string_len(PriorSubstance::Substance, 128).not_null())
                    .col(timestamp_with_time_zone_null(PriorSubstance::Time))
                    .col(double_null(PriorSubstance::Quantity))
                    .col(timestamp_with_time_zone(PriorSubstance::CreatedAt).not_null())
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(PriorSubstance::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum PriorSubstance { Table, Id, Substance, Time, Quantity, CreatedAt }
