//! Symbol activation state backed by `symbols` and `exchange_symbols`.

use crate::entity::{exchange_symbols, symbols};
use crate::repository::{find_exchange, find_market_type};
use anyhow::Context;
use async_trait::async_trait;
use collector::collect::SymbolDiff;
use collector::model::{Exchange, MarketType};
use collector::store::SymbolStore;
use collector::CollectError;
use sea_orm::ActiveModelTrait;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter, Set,
    TransactionTrait,
};
use std::collections::HashMap;
use tracing::info;

/// [`SymbolStore`] implementation on top of a live database connection.
#[derive(Clone)]
pub struct SymbolRepository {
    db: DatabaseConnection,
}

impl SymbolRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl SymbolStore for SymbolRepository {
    async fn symbol_state(
        &self,
        exchange: Exchange,
        market_type: MarketType,
    ) -> collector::Result<HashMap<String, bool>> {
        let (exchange_id, market_type_id) = scope(&self.db, exchange, market_type).await?;

        let rows = exchange_symbols::Entity::find()
            .filter(exchange_symbols::Column::ExchangeId.eq(exchange_id))
            .filter(exchange_symbols::Column::MarketTypeId.eq(market_type_id))
            .find_also_related(symbols::Entity)
            .all(&self.db)
            .await
            .with_context(|| format!("loading symbol state for {exchange}/{market_type}"))?;

        Ok(rows
            .into_iter()
            .filter_map(|(listing, symbol)| symbol.map(|s| (s.name, listing.is_active)))
            .collect())
    }

    async fn apply(
        &self,
        exchange: Exchange,
        market_type: MarketType,
        diff: &SymbolDiff,
    ) -> collector::Result<()> {
        let (exchange_id, market_type_id) = scope(&self.db, exchange, market_type).await?;

        // One transaction per reconciliation pass: a half-applied diff would
        // leave the activation state inconsistent with the venue.
        let txn = self
            .db
            .begin()
            .await
            .context("starting symbol reconciliation transaction")?;

        for name in &diff.add {
            let symbol_id = get_or_create_symbol(&txn, name).await?;
            exchange_symbols::ActiveModel {
                exchange_id: Set(exchange_id),
                market_type_id: Set(market_type_id),
                symbol_id: Set(symbol_id),
                exchange_symbol_name: Set(Some(name.clone())),
                is_active: Set(true),
                ..Default::default()
            }
            .insert(&txn)
            .await
            .with_context(|| format!("listing new symbol {name}"))?;
        }

        set_active(&txn, exchange_id, market_type_id, &diff.activate, true).await?;
        set_active(&txn, exchange_id, market_type_id, &diff.deactivate, false).await?;

        txn.commit()
            .await
            .context("committing symbol reconciliation")?;

        info!(
            exchange = %exchange,
            market_type = %market_type,
            added = diff.add.len(),
            activated = diff.activate.len(),
            deactivated = diff.deactivate.len(),
            "applied symbol diff"
        );
        Ok(())
    }
}

/// Resolve the (exchange_id, market_type_id) scope; both rows are seeded by
/// migration, so a miss means the database was never initialized.
async fn scope(
    db: &DatabaseConnection,
    exchange: Exchange,
    market_type: MarketType,
) -> collector::Result<(i32, i32)> {
    let exchange_row = find_exchange(db, exchange).await?.ok_or_else(|| {
        CollectError::Config(format!("exchange {exchange} is not seeded in the database"))
    })?;
    let market_row = find_market_type(db, market_type).await?.ok_or_else(|| {
        CollectError::Config(format!(
            "market type {market_type} is not seeded in the database"
        ))
    })?;
    Ok((exchange_row.id, market_row.id))
}

async fn get_or_create_symbol<C: ConnectionTrait>(db: &C, name: &str) -> collector::Result<i32> {
    if let Some(existing) = symbols::Entity::find()
        .filter(symbols::Column::Name.eq(name))
        .one(db)
        .await
        .with_context(|| format!("looking up symbol {name}"))?
    {
        return Ok(existing.id);
    }

    let created = symbols::ActiveModel {
        name: Set(name.to_owned()),
        ..Default::default()
    }
    .insert(db)
    .await
    .with_context(|| format!("creating symbol {name}"))?;
    Ok(created.id)
}

async fn set_active<C: ConnectionTrait>(
    db: &C,
    exchange_id: i32,
    market_type_id: i32,
    names: &[String],
    active: bool,
) -> collector::Result<()> {
    if names.is_empty() {
        return Ok(());
    }

    let symbol_ids: Vec<i32> = symbols::Entity::find()
        .filter(symbols::Column::Name.is_in(names.iter().map(String::as_str)))
        .all(db)
        .await
        .context("looking up symbols for activation flip")?
        .into_iter()
        .map(|row| row.id)
        .collect();

    exchange_symbols::Entity::update_many()
        .col_expr(exchange_symbols::Column::IsActive, Expr::value(active))
        .filter(exchange_symbols::Column::ExchangeId.eq(exchange_id))
        .filter(exchange_symbols::Column::MarketTypeId.eq(market_type_id))
        .filter(exchange_symbols::Column::SymbolId.is_in(symbol_ids))
        .exec(db)
        .await
        .context("flipping symbol activation state")?;
    Ok(())
}
