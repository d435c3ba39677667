//! Create `night` table.
//!
//! One row per wake date; interruptions and substances are JSONB lists.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Night::Table)
                    .if_not_exists()
                    .col(uuid(Night::Id).primary_key())
                    .col(timestamp_with_time_zone(Night::DateAwake).not_null())
                    .col(boolean(Night::Edited).not_null().default(false))
                    .col(timestamp_with_time_zone_null(Night::BedTime))
                    .col(timestamp_with_time_zone_null(Night::FellAsleepAt))
                    .col(json_binary(Night::Interruptions).not_null().default(Expr::cust("'[]'::jsonb")))
                    .col(timestamp_with_time_zone_null(Night::WokeUp))
                    .col(timestamp_with_time_zone_null(Night::GotUp))
                    .col(string_null(Night::RestedRating))
                    .col(string_null(Night::SleepQuality))
                    .col(json_binary(Night::MedsAndAlcohol).not_null().default(Expr::cust("'[]'::jsonb")))
                    .col(text_null(Night::Notes))
                    .col(timestamp_with_time_zone(Night::CreatedAt).not_null())
                    .col(timestamp_with_time_zone(Night::UpdatedAt).not_null())
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Night::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum Night {
    Table,
    Id,
    DateAwake,
    Edited,
    BedTime,
    FellAsleepAt,
    Interruptions,
    WokeUp,
    GotUp,
    RestedRating,
    SleepQuality,
    MedsAndAlcohol,
    Notes,
    CreatedAt,
    UpdatedAt,
}
