//! Sea-orm implementations of the collector's persistence traits.

pub mod klines;
pub mod symbols;

pub use klines::KlineRepository;
pub use symbols::SymbolRepository;

use crate::entity::{exchanges, market_types};
use anyhow::Context;
use collector::model::{Exchange, MarketType};
use sea_orm::{ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter};

/// Look up the seeded `exchanges` row for a normalized exchange name.
pub(crate) async fn find_exchange<C: ConnectionTrait>(
    db: &C,
    exchange: Exchange,
) -> anyhow::Result<Option<exchanges::Model>> {
    exchanges::Entity::find()
        .filter(exchanges::Column::Name.eq(exchange.as_str()))
        .one(db)
        .await
        .with_context(|| format!("looking up exchange {exchange}"))
}

/// Look up the seeded `market_types` row for a normalized market type name.
pub(crate) async fn find_market_type<C: ConnectionTrait>(
    db: &C,
    market_type: MarketType,
) -> anyhow::Result<Option<market_types::Model>> {
    market_types::Entity::find()
        .filter(market_types::Column::Name.eq(market_type.as_str()))
        .one(db)
        .await
        .with_context(|| format!("looking up market type {market_type}"))
}
