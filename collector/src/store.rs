//! Traits the persistence collaborator implements.
//!
//! The core consumes exactly two surfaces: instrument identity resolution
//! plus idempotent candle batch insert ([`KlineStore`]), and symbol
//! activation state read/write ([`SymbolStore`]). Implementations live
//! outside this crate (the `storage` crate provides the sea-orm ones);
//! tests use in-memory fakes.

use crate::collect::symbols::SymbolDiff;
use crate::model::{Exchange, Kline, MarketType, Timeframe};
use crate::Result;
use async_trait::async_trait;
use std::collections::HashMap;

/// Opaque identity of one (exchange, market type, symbol) instrument,
/// owned by the persistence layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct InstrumentId(pub i32);

/// Candle persistence surface.
#[async_trait]
pub trait KlineStore: Send + Sync {
    /// Resolve the identity of a tradable instrument.
    ///
    /// Returns `None` when the instrument is unknown or inactive; the core
    /// never creates instruments implicitly during candle collection.
    async fn resolve_instrument(
        &self,
        exchange: Exchange,
        market_type: MarketType,
        symbol: &str,
    ) -> Result<Option<InstrumentId>>;

    /// Idempotently store a batch of candles, keyed by
    /// (instrument, timeframe, timestamp). Duplicates are silently dropped;
    /// the return value counts only newly persisted rows.
    async fn insert_klines(
        &self,
        instrument: InstrumentId,
        timeframe: Timeframe,
        klines: &[Kline],
    ) -> Result<u64>;
}

/// Symbol activation state surface, scoped to one (exchange, market type).
#[async_trait]
pub trait SymbolStore: Send + Sync {
    /// All recorded symbols with their `is_active` flag
    async fn symbol_state(
        &self,
        exchange: Exchange,
        market_type: MarketType,
    ) -> Result<HashMap<String, bool>>;

    /// Apply a reconciliation diff: create `add` rows active, flip
    /// `activate` to active and `deactivate` to inactive. Never deletes.
    async fn apply(
        &self,
        exchange: Exchange,
        market_type: MarketType,
        diff: &SymbolDiff,
    ) -> Result<()>;
}
