use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Panels::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Panels::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Panels::ImageUrl).string().not_null())
                    .col(ColumnDef::new(Panels::Text).text().not_null())
                    .col(
                        ColumnDef::new(Panels::CreatedAt)
                            .date_time()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Panels::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Panels {
    Table,
    Id,
    ImageUrl,
    Text,
    CreatedAt,
}
