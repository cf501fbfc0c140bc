use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let exchanges = Query::insert()
            .into_table(Exchanges::Table)
            .columns([Exchanges::Name])
            .values_panic(["binance".into()])
            .values_panic(["bybit".into()])
            .to_owned();
        manager.exec_stmt(exchanges).await?;

        let market_types = Query::insert()
            .into_table(MarketTypes::Table)
            .columns([MarketTypes::Name])
            .values_panic(["spot".into()])
            .values_panic(["futures".into()])
            .to_owned();
        manager.exec_stmt(market_types).await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let market_types = Query::delete()
            .from_table(MarketTypes::Table)
            .cond_where(Expr::col(MarketTypes::Name).is_in(["spot", "futures"]))
            .to_owned();
        manager.exec_stmt(market_types).await?;

        let exchanges = Query::delete()
            .from_table(Exchanges::Table)
            .cond_where(Expr::col(Exchanges::Name).is_in(["binance", "bybit"]))
            .to_owned();
        manager.exec_stmt(exchanges).await
    }
}

#[derive(DeriveIden)]
enum Exchanges {
    Table,
    Name,
}

#[derive(DeriveIden)]
enum MarketTypes {
    Table,
    Name,
}
