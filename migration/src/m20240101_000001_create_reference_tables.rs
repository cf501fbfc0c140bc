use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Exchanges::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Exchanges::Id).integer().auto_increment().primary_key())
                    .col(ColumnDef::new(Exchanges::Name).string_len(64).not_null().unique_key())
                    .col(ColumnDef::new(Exchanges::CreatedAt).timestamp().default(Expr::cust("CURRENT_TIMESTAMP")))
                    .col(ColumnDef::new(Exchanges::UpdatedAt).timestamp().default(Expr::cust("CURRENT_TIMESTAMP ON UPDATE CURRENT_TIMESTAMP")))
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(MarketTypes::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(MarketTypes::Id).integer().auto_increment().primary_key())
                    .col(ColumnDef::new(MarketTypes::Name).string_len(64).not_null().unique_key())
                    .col(ColumnDef::new(MarketTypes::CreatedAt).timestamp().default(Expr::cust("CURRENT_TIMESTAMP")))
                    .col(ColumnDef::new(MarketTypes::UpdatedAt).timestamp().default(Expr::cust("CURRENT_TIMESTAMP ON UPDATE CURRENT_TIMESTAMP")))
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Symbols::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Symbols::Id).integer().auto_increment().primary_key())
                    .col(ColumnDef::new(Symbols::Name).string_len(64).not_null().unique_key())
                    .col(ColumnDef::new(Symbols::CreatedAt).timestamp().default(Expr::cust("CURRENT_TIMESTAMP")))
                    .col(ColumnDef::new(Symbols::UpdatedAt).timestamp().default(Expr::cust("CURRENT_TIMESTAMP ON UPDATE CURRENT_TIMESTAMP")))
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Symbols::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(MarketTypes::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Exchanges::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Exchanges {
    Table,
    Id,
    Name,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum MarketTypes {
    Table,
    Id,
    Name,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Symbols {
    Table,
    Id,
    Name,
    CreatedAt,
    UpdatedAt,
}
