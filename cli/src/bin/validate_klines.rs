//! Checks stored candle series for gaps and duplicate open times.
//!
//! Walks every active instrument of one (exchange, market type) and flags
//! symbols whose series is not contiguous at the timeframe's step width.
//!
//! Configuration comes from the environment (a `.env` file is honored):
//!
//! - `EXCHANGE`      - "binance" or "bybit"
//! - `MARKET_TYPE`   - "spot" or "futures" (default "spot")
//! - `TIMEFRAME`     - "1h", "4h" or "1d" (default "1h")

use anyhow::{Context, Result};
use collector::collect::check_series;
use collector::model::{Exchange, MarketType, Timeframe};
use tracing::{info, warn};

/// Gaps printed per symbol before eliding the rest
const MAX_GAPS_SHOWN: usize = 5;

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();

    let exchange: Exchange = std::env::var("EXCHANGE")
        .context("EXCHANGE must be set")?
        .parse()?;
    let market_type: MarketType = std::env::var("MARKET_TYPE")
        .unwrap_or_else(|_| "spot".to_owned())
        .parse()?;
    let timeframe: Timeframe = std::env::var("TIMEFRAME")
        .unwrap_or_else(|_| "1h".to_owned())
        .parse()?;

    let config = storage::Config::from_env()?;
    let db = storage::connect(&config.database_url).await?;
    let store = storage::KlineRepository::new(db);

    let instruments = store.active_instruments(exchange, market_type).await?;
    info!(
        %exchange,
        %market_type,
        %timeframe,
        instruments = instruments.len(),
        "starting candle validation"
    );

    let mut checked = 0u64;
    let mut with_issues = 0u64;
    for (instrument, symbol) in instruments {
        checked += 1;
        let timestamps = store.kline_timestamps(instrument, timeframe).await?;
        let check = check_series(&timestamps, timeframe);
        if check.is_clean() {
            continue;
        }

        with_issues += 1;
        warn!(
            symbol = %symbol,
            candles = check.candles,
            gaps = check.gaps.len(),
            duplicates = check.duplicates,
            "series has integrity issues"
        );
        for gap in check.gaps.iter().take(MAX_GAPS_SHOWN) {
            warn!(
                symbol = %symbol,
                prev = %gap.prev,
                next = %gap.next,
                delta_minutes = gap.delta.num_minutes(),
                "gap"
            );
        }
        if check.gaps.len() > MAX_GAPS_SHOWN {
            warn!(
                symbol = %symbol,
                elided = check.gaps.len() - MAX_GAPS_SHOWN,
                "further gaps elided"
            );
        }
    }

    info!(checked, with_issues, "validation finished");
    Ok(())
}
