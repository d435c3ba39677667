use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Night: one document per wake date; also serves range scans
        manager
            .create_index(
                Index::create()
                    .name("uniq_night_date_awake")
                    .table(Night::Table)
                    .col(Night::DateAwake)
                    .unique()
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        // PriorSubstance: listing order
        manager
            .create_index(
                Index::create()
                    .name("idx_prior_substance_created")
                    .table(PriorSubstance::Table)
                    .col(PriorSubstance::CreatedAt)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_index(Index::drop().name("idx_prior_substance_created").table(PriorSubstance::Table).to_owned()).await?;
        manager.drop_index(Index::drop().name("uniq_night_date_awake").table(Night::Table).to_owned()).await?;
        Ok(())
    }
}

#[derive(DeriveIden)]
enum Night { Table, DateAwake }

#[derive(DeriveIden)]
enum PriorSubstance { Table, CreatedAt }
