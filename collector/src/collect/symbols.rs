//! Reconciles exchange-reported symbols against stored activation state

use crate::exchange::ExchangeClient;
use crate::model::{Exchange, MarketType, QuoteAsset};
use crate::store::SymbolStore;
use crate::Result;
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use tracing::info;

/// Disjoint action sets computed by one reconciliation pass.
///
/// A symbol lands in at most one set: `add` for names never recorded,
/// `activate` for recorded-but-inactive names the exchange reports again,
/// `deactivate` for recorded-active names the exchange no longer reports.
/// Symbols already active and still reported need no write. Deactivation is
/// a soft flag; records are never deleted, so historical candles keyed on
/// the instrument identity stay reachable.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SymbolDiff {
    pub add: Vec<String>,
    pub activate: Vec<String>,
    pub deactivate: Vec<String>,
}

impl SymbolDiff {
    pub fn is_empty(&self) -> bool {
        self.add.is_empty() && self.activate.is_empty() && self.deactivate.is_empty()
    }
}

/// Per-action counts returned to callers for observability.
///
/// `total_active` is the size of the set the exchange currently reports.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SymbolSyncReport {
    pub added: u64,
    pub activated: u64,
    pub deactivated: u64,
    pub total_active: u64,
}

/// Diff the exchange-reported set against the stored activation state.
///
/// Pure function over the two inputs; applying the result is the store's
/// job. Output vectors are sorted for deterministic writes and logs.
pub fn reconcile(current: &HashSet<String>, stored: &HashMap<String, bool>) -> SymbolDiff {
    let mut diff = SymbolDiff::default();

    for symbol in current {
        match stored.get(symbol) {
            None => diff.add.push(symbol.clone()),
            Some(false) => diff.activate.push(symbol.clone()),
            Some(true) => {}
        }
    }
    for (symbol, is_active) in stored {
        if *is_active && !current.contains(symbol) {
            diff.deactivate.push(symbol.clone());
        }
    }

    diff.add.sort_unstable();
    diff.activate.sort_unstable();
    diff.deactivate.sort_unstable();
    diff
}

/// Fetch the exchange's current active symbols and reconcile them into the
/// store for one (exchange, market type) pair.
pub async fn sync_symbols(
    client: &dyn ExchangeClient,
    store: &dyn SymbolStore,
    market_type: MarketType,
    quote_asset: QuoteAsset,
) -> Result<SymbolSyncReport> {
    let exchange: Exchange = client.exchange();
    let current: HashSet<String> = client
        .active_symbols(market_type, quote_asset)
        .await?
        .into_iter()
        .collect();
    let stored = store.symbol_state(exchange, market_type).await?;

    let diff = reconcile(&current, &stored);
    if !diff.is_empty() {
        store.apply(exchange, market_type, &diff).await?;
    }

    let report = SymbolSyncReport {
        added: diff.add.len() as u64,
        activated: diff.activate.len() as u64,
        deactivated: diff.deactivate.len() as u64,
        total_active: current.len() as u64,
    };
    info!(
        %exchange,
        %market_type,
        added = report.added,
        activated = report.activated,
        deactivated = report.deactivated,
        total_active = report.total_active,
        "symbol sync finished"
    );
    Ok(report)
}
