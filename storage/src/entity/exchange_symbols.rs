//! `SeaORM` Entity, @generated manually

use sea_orm::entity::prelude::*;

/// One tradable instrument: a symbol listed on an exchange's market.
/// `is_active` is a soft flag; rows are never deleted so historical candles
/// keep a valid parent.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "exchange_symbols")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub exchange_id: i32,
    pub market_type_id: i32,
    pub symbol_id: i32,
    #[sea_orm(nullable)]
    pub exchange_symbol_name: Option<String>,
    pub is_active: bool,
    pub created_at: Option<DateTimeUtc>,
    pub updated_at: Option<DateTimeUtc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::exchanges::Entity",
        from = "Column::ExchangeId",
        to = "super::exchanges::Column::Id",
        on_update = "NoAction",
        on_delete = "NoAction"
    )]
    Exchanges,
    #[sea_orm(
        belongs_to = "super::market_types::Entity",
        from = "Column::MarketTypeId",
        to = "super::market_types::Column::Id",
        on_update = "NoAction",
        on_delete = "NoAction"
    )]
    MarketTypes,
    #[sea_orm(
        belongs_to = "super::symbols::Entity",
        from = "Column::SymbolId",
        to = "super::symbols::Column::Id",
        on_update = "NoAction",
        on_delete = "NoAction"
    )]
    Symbols,
    #[sea_orm(has_many = "super::candles::Entity")]
    Candles,
}

impl Related<super::exchanges::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Exchanges.def()
    }
}

impl Related<super::market_types::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::MarketTypes.def()
    }
}

impl Related<super::symbols::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Symbols.def()
    }
}

impl Related<super::candles::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Candles.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
