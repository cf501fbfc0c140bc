//! Backfills historical candles for a list of symbols.
//!
//! Configuration comes from the environment (a `.env` file is honored):
//!
//! - `EXCHANGE`      - "binance" or "bybit"
//! - `MARKET_TYPE`   - "spot" or "futures" (default "spot")
//! - `SYMBOLS`       - comma-separated, e.g. "BTCUSDT,ETHUSDT"
//! - `TIMEFRAME`     - "1h", "4h" or "1d" (default "1h")
//! - `START_TIME`    - RFC 3339, inclusive
//! - `END_TIME`      - RFC 3339, exclusive; omit to collect up to now

use anyhow::{Context, Result};
use collector::collect::{collect_klines, CollectReport};
use collector::exchange::ClientRegistry;
use collector::model::{Exchange, FetchWindow, KlineRequest, MarketType, Timeframe};
use collector::CollectError;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tracing::{error, info, warn};

/// Symbols fetched concurrently; each client still paces its own requests.
const MAX_CONCURRENT_SYMBOLS: usize = 5;

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();

    let exchange: Exchange = required_env("EXCHANGE")?.parse()?;
    let market_type: MarketType = env_or("MARKET_TYPE", "spot").parse()?;
    let timeframe: Timeframe = env_or("TIMEFRAME", "1h").parse()?;
    let symbols: Vec<String> = required_env("SYMBOLS")?
        .split(',')
        .map(|s| s.trim().to_owned())
        .filter(|s| !s.is_empty())
        .collect();
    anyhow::ensure!(!symbols.is_empty(), "SYMBOLS must name at least one symbol");

    let start = required_env("START_TIME")?
        .parse()
        .context("START_TIME must be RFC 3339, e.g. 2024-01-01T00:00:00Z")?;
    let window = match std::env::var("END_TIME") {
        Ok(raw) => {
            let end = raw
                .parse()
                .context("END_TIME must be RFC 3339, e.g. 2024-02-01T00:00:00Z")?;
            FetchWindow::new(start, end)?
        }
        Err(_) => FetchWindow::since(start),
    };

    let config = storage::Config::from_env()?;
    let db = storage::connect(&config.database_url).await?;
    let store = storage::KlineRepository::new(db);

    let registry = ClientRegistry::with_defaults()?;
    let client = registry.get(exchange)?;

    info!(
        %exchange,
        %market_type,
        %timeframe,
        symbols = symbols.len(),
        "starting backfill"
    );

    let semaphore = Arc::new(Semaphore::new(MAX_CONCURRENT_SYMBOLS));
    let mut handles = Vec::with_capacity(symbols.len());
    for symbol in symbols {
        let client = Arc::clone(&client);
        let store = store.clone();
        let semaphore = Arc::clone(&semaphore);
        handles.push(tokio::spawn(async move {
            let _permit = semaphore.acquire().await.expect("semaphore never closed");
            let request = KlineRequest {
                symbol: symbol.clone(),
                timeframe,
                market_type,
                window,
            };
            (symbol, collect_klines(client.as_ref(), &store, request).await)
        }));
    }

    let mut total = CollectReport::default();
    let mut failures = 0u32;
    for handle in handles {
        let (symbol, outcome) = handle.await.context("backfill task panicked")?;
        match outcome {
            Ok(report) => {
                total.fetched += report.fetched;
                total.inserted += report.inserted;
            }
            Err(CollectError::InstrumentNotFound { .. }) => {
                warn!(symbol = %symbol, "symbol not registered or inactive, skipping");
            }
            Err(err) => {
                failures += 1;
                error!(symbol = %symbol, error = %err, "backfill failed");
            }
        }
    }

    info!(
        fetched = total.fetched,
        inserted = total.inserted,
        failures,
        "backfill finished"
    );
    anyhow::ensure!(failures == 0, "{failures} symbol(s) failed to backfill");
    Ok(())
}

fn required_env(name: &str) -> Result<String> {
    std::env::var(name).with_context(|| format!("{name} must be set"))
}

fn env_or(name: &str, default: &str) -> String {
    std::env::var(name).unwrap_or_else(|_| default.to_owned())
}
