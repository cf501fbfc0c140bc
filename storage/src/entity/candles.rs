//! `SeaORM` Entity, @generated manually

use sea_orm::entity::prelude::*;

/// One OHLCV bar, unique per (instrument, timeframe, open time)
/// via the `uq_candle` constraint.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "candles")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub exchange_symbol_id: i32,
    pub timeframe: String,
    pub timestamp: DateTimeUtc,
    #[sea_orm(column_type = "Decimal(Some((30, 10)))")]
    pub open: Decimal,
    #[sea_orm(column_type = "Decimal(Some((30, 10)))")]
    pub high: Decimal,
    #[sea_orm(column_type = "Decimal(Some((30, 10)))")]
    pub low: Decimal,
    #[sea_orm(column_type = "Decimal(Some((30, 10)))")]
    pub close: Decimal,
    #[sea_orm(column_type = "Decimal(Some((30, 10)))")]
    pub volume: Decimal,
    pub created_at: Option<DateTimeUtc>,
    pub updated_at: Option<DateTimeUtc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::exchange_symbols::Entity",
        from = "Column::ExchangeSymbolId",
        to = "super::exchange_symbols::Column::Id",
        on_update = "NoAction",
        on_delete = "NoAction"
    )]
    ExchangeSymbols,
}

impl Related<super::exchange_symbols::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ExchangeSymbols.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
