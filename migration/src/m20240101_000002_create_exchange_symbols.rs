use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(ExchangeSymbols::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(ExchangeSymbols::Id).integer().auto_increment().primary_key())
                    .col(ColumnDef::new(ExchangeSymbols::ExchangeId).integer().not_null())
                    .col(ColumnDef::new(ExchangeSymbols::MarketTypeId).integer().not_null())
                    .col(ColumnDef::new(ExchangeSymbols::SymbolId).integer().not_null())
                    .col(ColumnDef::new(ExchangeSymbols::ExchangeSymbolName).string_len(64))
                    .col(ColumnDef::new(ExchangeSymbols::IsActive).boolean().not_null().default(true))
                    .col(ColumnDef::new(ExchangeSymbols::CreatedAt).timestamp().default(Expr::cust("CURRENT_TIMESTAMP")))
                    .col(ColumnDef::new(ExchangeSymbols::UpdatedAt).timestamp().default(Expr::cust("CURRENT_TIMESTAMP ON UPDATE CURRENT_TIMESTAMP")))
                    .index(
                        Index::create()
                            .name("uq_exchange_symbol")
                            .table(ExchangeSymbols::Table)
                            .col(ExchangeSymbols::ExchangeId)
                            .col(ExchangeSymbols::MarketTypeId)
                            .col(ExchangeSymbols::SymbolId)
                            .unique()
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_exchange_symbols_exchange")
                            .from(ExchangeSymbols::Table, ExchangeSymbols::ExchangeId)
                            .to(Exchanges::Table, Exchanges::Id)
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_exchange_symbols_market_type")
                            .from(ExchangeSymbols::Table, ExchangeSymbols::MarketTypeId)
                            .to(MarketTypes::Table, MarketTypes::Id)
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_exchange_symbols_symbol")
                            .from(ExchangeSymbols::Table, ExchangeSymbols::SymbolId)
                            .to(Symbols::Table, Symbols::Id)
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(ExchangeSymbols::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum ExchangeSymbols {
    Table,
    Id,
    ExchangeId,
    MarketTypeId,
    SymbolId,
    ExchangeSymbolName,
    IsActive,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Exchanges {
    Table,
    Id,
}

#[derive(DeriveIden)]
enum MarketTypes {
    Table,
    Id,
}

#[derive(DeriveIden)]
enum Symbols {
    Table,
    Id,
}
