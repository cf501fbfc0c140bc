//! Drives one paginated candle fetch end-to-end into the store

use crate::exchange::ExchangeClient;
use crate::model::KlineRequest;
use crate::store::KlineStore;
use crate::{CollectError, Result};
use futures::StreamExt;
use serde::Serialize;
use tracing::{debug, info};

/// Counters accumulated over one collection run.
///
/// `fetched` counts every row retrieved from the exchange; `inserted` counts
/// only rows newly persisted (duplicates are silently excluded by the store).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CollectReport {
    pub fetched: u64,
    pub inserted: u64,
}

/// Fetch candles for `request` from `client` and persist them through
/// `store`, batch by batch.
///
/// The instrument identity is resolved up front; an unknown or inactive
/// symbol fails with [`CollectError::InstrumentNotFound`] before any network
/// call. On a stream or storage error the remaining pagination is abandoned,
/// but batches committed before the failure stay persisted: a re-run over an
/// overlapping range relies on the store's dedup instead of rollback.
pub async fn collect_klines(
    client: &dyn ExchangeClient,
    store: &dyn KlineStore,
    request: KlineRequest,
) -> Result<CollectReport> {
    let exchange = client.exchange();
    let instrument = store
        .resolve_instrument(exchange, request.market_type, &request.symbol)
        .await?
        .ok_or_else(|| CollectError::InstrumentNotFound {
            exchange,
            market_type: request.market_type,
            symbol: request.symbol.clone(),
        })?;

    let timeframe = request.timeframe;
    let symbol = request.symbol.clone();
    let mut stream = client.stream_klines(request)?;

    let mut report = CollectReport::default();
    while let Some(batch) = stream.next().await {
        let batch = batch?;
        let inserted = store.insert_klines(instrument, timeframe, &batch).await?;
        report.fetched += batch.len() as u64;
        report.inserted += inserted;
        debug!(
            %exchange,
            symbol = %symbol,
            batch_size = batch.len(),
            inserted,
            "persisted candle batch"
        );
    }

    info!(
        %exchange,
        symbol = %symbol,
        %timeframe,
        fetched = report.fetched,
        inserted = report.inserted,
        "collection finished"
    );
    Ok(report)
}
