//! Reconciles the stored symbol universe against an exchange's live listing.
//!
//! Configuration comes from the environment (a `.env` file is honored):
//!
//! - `EXCHANGE`      - "binance" or "bybit"
//! - `MARKET_TYPE`   - "spot" or "futures" (default "spot")
//! - `QUOTE_ASSET`   - quote filter for tradable names (default "usdt")

use anyhow::{Context, Result};
use collector::collect::sync_symbols;
use collector::exchange::ClientRegistry;
use collector::model::{Exchange, MarketType, QuoteAsset};
use tracing::info;

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
    let quote_asset: QuoteAsset = std::env::var("QUOTE_ASSET")
        .unwrap_or_else(|_| "usdt".to_owned())
        .parse()?;

    let config = storage::Config::from_env()?;
    let db = storage::connect(&config.database_url).await?;
    let store = storage::SymbolRepository::new(db);

    let registry = ClientRegistry::with_defaults()?;
    let client = registry.get(exchange)?;

    let report = sync_symbols(client.as_ref(), &store, market_type, quote_asset).await?;
    info!(
        %exchange,
        %market_type,
        added = report.added,
        activated = report.activated,
        deactivated = report.deactivated,
        total_active = report.total_active,
        "symbol sync finished"
    );
    Ok(())
}
