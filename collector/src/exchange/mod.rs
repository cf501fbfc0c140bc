//! Per-exchange clients behind a common capability trait
//!
//! Each variant encodes one exchange's endpoint shapes, field mapping and
//! pagination direction; the shared pieces (request pacing, retry) live in
//! [`rate_limit`] and [`transport`] and are composed into the variants
//! rather than inherited.

pub mod binance;
pub mod bybit;
pub mod rate_limit;
pub mod transport;

use crate::model::{Exchange, Kline, KlineRequest, MarketType, QuoteAsset};
use crate::{CollectError, Result};
use async_trait::async_trait;
use futures::stream::BoxStream;
use std::collections::HashMap;
use std::sync::Arc;

pub use binance::BinanceClient;
pub use bybit::BybitClient;
pub use rate_limit::RateLimiter;
pub use transport::RestTransport;

/// Lazy sequence of candle batches, one per fetched page.
///
/// Finite and non-restartable once consumed. The consumer controls when the
/// next page is requested by pulling the next batch; nothing is buffered
/// beyond the page in flight, so multi-year backfills run in bounded memory.
/// Dropping the stream releases the request in flight.
pub type KlineStream = BoxStream<'static, Result<Vec<Kline>>>;

/// Capability set every exchange variant provides.
#[async_trait]
pub trait ExchangeClient: Send + Sync {
    /// Which exchange this client talks to
    fn exchange(&self) -> Exchange;

    /// List the symbols the exchange currently reports as tradable for
    /// `market_type`, filtered to names quoted in `quote_asset`.
    ///
    /// Pages through the instrument listing until the exchange signals no
    /// further page (cursor exhausted, or a single full document).
    async fn active_symbols(
        &self,
        market_type: MarketType,
        quote_asset: QuoteAsset,
    ) -> Result<Vec<String>>;

    /// Stream candle batches covering the request's half-open window.
    ///
    /// Validates the market type/timeframe combination and fails fast with
    /// [`CollectError::Config`] before any network call. Batches never
    /// exceed the exchange's page size.
    fn stream_klines(&self, request: KlineRequest) -> Result<KlineStream>;
}

/// Explicit exchange-to-client mapping built at the call site.
///
/// Replaces a global client registry: callers construct one, register the
/// clients they want (or take the defaults) and pass it where needed.
pub struct ClientRegistry {
    clients: HashMap<Exchange, Arc<dyn ExchangeClient>>,
}

impl ClientRegistry {
    /// Empty registry
    pub fn new() -> Self {
        Self {
            clients: HashMap::new(),
        }
    }

    /// Registry with one default client per supported exchange, each owning
    /// its own transport and rate limiter.
    pub fn with_defaults() -> Result<Self> {
        let mut registry = Self::new();
        registry.register(Arc::new(BinanceClient::new()?));
        registry.register(Arc::new(BybitClient::new()?));
        Ok(registry)
    }

    /// Register (or replace) the client for its exchange
    pub fn register(&mut self, client: Arc<dyn ExchangeClient>) -> &mut Self {
        self.clients.insert(client.exchange(), client);
        self
    }

    /// Look up the client for `exchange`
    pub fn get(&self, exchange: Exchange) -> Result<Arc<dyn ExchangeClient>> {
        self.clients.get(&exchange).cloned().ok_or_else(|| {
            CollectError::Config(format!("no client registered for exchange {exchange}"))
        })
    }
}

impl Default for ClientRegistry {
    fn default() -> Self {
        Self::new()
    }
}
