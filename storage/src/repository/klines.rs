//! Candle persistence backed by the `candles` table.

use crate::entity::{candles, exchange_symbols, symbols};
use crate::repository::{find_exchange, find_market_type};
use anyhow::Context;
use async_trait::async_trait;
use collector::model::{Exchange, Kline, MarketType, Timeframe};
use collector::store::{InstrumentId, KlineStore};
use chrono::{DateTime, Utc};
use sea_orm::sea_query::OnConflict;
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, QuerySelect, Set,
};
use tracing::debug;

/// Batches above this size are split before insert so a single statement
/// stays under MySQL's placeholder limit.
const INSERT_CHUNK_SIZE: usize = 3000;

/// [`KlineStore`] implementation on top of a live database connection.
#[derive(Clone)]
pub struct KlineRepository {
    db: DatabaseConnection,
}

impl KlineRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// All active instruments for one (exchange, market type), with their
    /// symbol names, ordered by name.
    pub async fn active_instruments(
        &self,
        exchange: Exchange,
        market_type: MarketType,
    ) -> anyhow::Result<Vec<(InstrumentId, String)>> {
        let Some(exchange_row) = find_exchange(&self.db, exchange).await? else {
            return Ok(Vec::new());
        };
        let Some(market_row) = find_market_type(&self.db, market_type).await? else {
            return Ok(Vec::new());
        };

        let rows = exchange_symbols::Entity::find()
            .filter(exchange_symbols::Column::ExchangeId.eq(exchange_row.id))
            .filter(exchange_symbols::Column::MarketTypeId.eq(market_row.id))
            .filter(exchange_symbols::Column::IsActive.eq(true))
            .find_also_related(symbols::Entity)
            .all(&self.db)
            .await
            .with_context(|| format!("listing instruments for {exchange}/{market_type}"))?;

        let mut instruments: Vec<(InstrumentId, String)> = rows
            .into_iter()
            .filter_map(|(listing, symbol)| symbol.map(|s| (InstrumentId(listing.id), s.name)))
            .collect();
        instruments.sort_by(|a, b| a.1.cmp(&b.1));
        Ok(instruments)
    }

    /// Stored open times for one (instrument, timeframe), ascending.
    pub async fn kline_timestamps(
        &self,
        instrument: InstrumentId,
        timeframe: Timeframe,
    ) -> anyhow::Result<Vec<DateTime<Utc>>> {
        candles::Entity::find()
            .select_only()
            .column(candles::Column::Timestamp)
            .filter(candles::Column::ExchangeSymbolId.eq(instrument.0))
            .filter(candles::Column::Timeframe.eq(timeframe.as_str()))
            .order_by_asc(candles::Column::Timestamp)
            .into_tuple()
            .all(&self.db)
            .await
            .with_context(|| format!("loading timestamps for instrument {}", instrument.0))
    }
}

#[async_trait]
impl KlineStore for KlineRepository {
    async fn resolve_instrument(
        &self,
        exchange: Exchange,
        market_type: MarketType,
        symbol: &str,
    ) -> collector::Result<Option<InstrumentId>> {
        let Some(exchange_row) = find_exchange(&self.db, exchange).await? else {
            return Ok(None);
        };
        let Some(market_row) = find_market_type(&self.db, market_type).await? else {
            return Ok(None);
        };
        let Some(symbol_row) = symbols::Entity::find()
            .filter(symbols::Column::Name.eq(symbol))
            .one(&self.db)
            .await
            .with_context(|| format!("looking up symbol {symbol}"))?
        else {
            return Ok(None);
        };

        // Inactive instruments resolve to None; collection never writes
        // candles for delisted pairs.
        let instrument = exchange_symbols::Entity::find()
            .filter(exchange_symbols::Column::ExchangeId.eq(exchange_row.id))
            .filter(exchange_symbols::Column::MarketTypeId.eq(market_row.id))
            .filter(exchange_symbols::Column::SymbolId.eq(symbol_row.id))
            .filter(exchange_symbols::Column::IsActive.eq(true))
            .one(&self.db)
            .await
            .with_context(|| format!("resolving instrument {exchange}/{market_type}/{symbol}"))?;

        Ok(instrument.map(|row| InstrumentId(row.id)))
    }

    async fn insert_klines(
        &self,
        instrument: InstrumentId,
        timeframe: Timeframe,
        klines: &[Kline],
    ) -> collector::Result<u64> {
        if klines.is_empty() {
            return Ok(0);
        }

        let mut inserted = 0u64;
        for chunk in klines.chunks(INSERT_CHUNK_SIZE) {
            let rows = chunk.iter().map(|kline| candles::ActiveModel {
                exchange_symbol_id: Set(instrument.0),
                timeframe: Set(timeframe.as_str().to_owned()),
                timestamp: Set(kline.timestamp),
                open: Set(kline.open),
                high: Set(kline.high),
                low: Set(kline.low),
                close: Set(kline.close),
                volume: Set(kline.volume),
                ..Default::default()
            });

            let affected = candles::Entity::insert_many(rows)
                .on_conflict(
                    OnConflict::columns([
                        candles::Column::ExchangeSymbolId,
                        candles::Column::Timeframe,
                        candles::Column::Timestamp,
                    ])
                    .do_nothing()
                    .to_owned(),
                )
                .exec_without_returning(&self.db)
                .await
                .context("inserting candle batch")?;
            inserted += affected;
        }

        debug!(
            instrument = instrument.0,
            timeframe = %timeframe,
            fetched = klines.len(),
            inserted,
            "persisted candle batch"
        );
        Ok(inserted)
    }
}
