use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Driver::Table)
                    .if_not_exists()
                    .col(string_len(Driver::Id, 64).primary_key())
                    .col(string_len_null(Driver::Name, 100))
                    .col(double_null(Driver::Lat))
                    .col(double_null(Driver::Lng))
                    // Location document written by older clients: {"lat": .., "lng": ..}
                    .col(json_binary_null(Driver::Location))
                    .to_owned(),
            )
            .await?;

        // Nearby lookups range-filter on latitude
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_driver_lat")
                    .table(Driver::Table)
                    .col(Driver::Lat)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Driver::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum Driver {
    Table,
    Id,
    Name,
    Lat,
    Lng,
    Location,
}
