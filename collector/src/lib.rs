//! Exchange ingestion core: rate-limited, retrying, paginated retrieval of
//! historical OHLCV candles and active-symbol listings from crypto exchanges,
//! normalized into a common shape and handed to an idempotent store.
//!
//! The crate is split along the seams of the data flow:
//! - [`exchange`] — per-exchange HTTP clients behind the [`exchange::ExchangeClient`]
//!   trait, sharing a retrying transport and a per-client rate limiter
//! - [`model`] — normalized value types ([`model::Kline`], enums, fetch windows)
//! - [`store`] — traits the persistence collaborator implements
//! - [`collect`] — the candle ingestor, the symbol reconciler and series
//!   integrity checks
//!
//! # Example
//!
//! ```no_run
//! use collector::exchange::ClientRegistry;
//! use collector::model::{Exchange, FetchWindow, KlineRequest, MarketType, Timeframe};
//! use collector::collect::collect_klines;
//! # async fn run(store: impl collector::store::KlineStore) -> collector::Result<()> {
//! let registry = ClientRegistry::with_defaults()?;
//! let client = registry.get(Exchange::Binance)?;
//! let request = KlineRequest {
//!     symbol: "BTCUSDT".into(),
//!     timeframe: Timeframe::H1,
//!     market_type: MarketType::Futures,
//!     window: FetchWindow::since("2024-01-01T00:00:00Z".parse().unwrap()),
//! };
//! let report = collect_klines(client.as_ref(), &store, request).await?;
//! println!("fetched {} inserted {}", report.fetched, report.inserted);
//! # Ok(())
//! # }
//! ```

pub mod collect;
pub mod error;
pub mod exchange;
pub mod model;
pub mod store;

pub use error::CollectError;

/// Result type alias used across the crate
pub type Result<T> = std::result::Result<T, CollectError>;
