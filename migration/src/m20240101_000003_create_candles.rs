use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Candles::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Candles::Id).big_integer().auto_increment().primary_key())
                    .col(ColumnDef::new(Candles::ExchangeSymbolId).integer().not_null())
                    .col(ColumnDef::new(Candles::Timeframe).string_len(8).not_null())
                    .col(ColumnDef::new(Candles::Timestamp).timestamp().not_null())
                    .col(ColumnDef::new(Candles::Open).decimal_len(30, 10).not_null())
                    .col(ColumnDef::new(Candles::High).decimal_len(30, 10).not_null())
                    .col(ColumnDef::new(Candles::Low).decimal_len(30, 10).not_null())
                    .col(ColumnDef::new(Candles::Close).decimal_len(30, 10).not_null())
                    .col(ColumnDef::new(Candles::Volume).decimal_len(30, 10).not_null())
                    .col(ColumnDef::new(Candles::CreatedAt).timestamp().default(Expr::cust("CURRENT_TIMESTAMP")))
                    .col(ColumnDef::new(Candles::UpdatedAt).timestamp().default(Expr::cust("CURRENT_TIMESTAMP ON UPDATE CURRENT_TIMESTAMP")))
                    .index(
                        Index::create()
                            .name("uq_candle")
                            .table(Candles::Table)
                            .col(Candles::ExchangeSymbolId)
                            .col(Candles::Timeframe)
                            .col(Candles::Timestamp)
                            .unique()
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_candles_exchange_symbol")
                            .from(Candles::Table, Candles::ExchangeSymbolId)
                            .to(ExchangeSymbols::Table, ExchangeSymbols::Id)
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Candles::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Candles {
    Table,
    Id,
    ExchangeSymbolId,
    Timeframe,
    Timestamp,
    Open,
    High,
    Low,
    Close,
    Volume,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum ExchangeSymbols {
    Table,
    Id,
}
