use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[cfg_attr(target_arch = "wasm32", async_trait::async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait::async_trait)]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Workers isolates share no memory, so throttle windows live in the database.
        manager
            .create_table(
                Table::create()
                    .table(ThrottleBuckets::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(ThrottleBuckets::Key).string().not_null().primary_key())
                    .col(ColumnDef::new(ThrottleBuckets::WindowStart).big_integer().not_null())
                    .col(ColumnDef::new(ThrottleBuckets::Hits).big_integer().not_null().default(0))
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(ThrottleBuckets::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum ThrottleBuckets {
    Table,
    Key,
    WindowStart,
    Hits,
}
