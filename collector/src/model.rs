//! Normalized value types shared by all exchange client variants

use crate::CollectError;
use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Supported exchanges
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Exchange {
    Binance,
    Bybit,
}

impl Exchange {
    pub fn as_str(&self) -> &'static str {
        match self {
            Exchange::Binance => "binance",
            Exchange::Bybit => "bybit",
        }
    }
}

impl fmt::Display for Exchange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Exchange {
    type Err = CollectError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "binance" => Ok(Exchange::Binance),
            "bybit" => Ok(Exchange::Bybit),
            other => Err(CollectError::Config(format!(
                "unsupported exchange: {other}"
            ))),
        }
    }
}

/// Trading venue kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MarketType {
    Spot,
    Futures,
}

impl MarketType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MarketType::Spot => "spot",
            MarketType::Futures => "futures",
        }
    }
}

impl fmt::Display for MarketType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MarketType {
    type Err = CollectError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "spot" => Ok(MarketType::Spot),
            "futures" => Ok(MarketType::Futures),
            other => Err(CollectError::Config(format!(
                "unsupported market type: {other}"
            ))),
        }
    }
}

/// Quote asset used to filter tradable symbols
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuoteAsset {
    Usdt,
}

impl QuoteAsset {
    /// Upper-case form as it appears in symbol names ("BTCUSDT")
    pub fn code(&self) -> &'static str {
        match self {
            QuoteAsset::Usdt => "USDT",
        }
    }
}

impl fmt::Display for QuoteAsset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QuoteAsset::Usdt => f.write_str("usdt"),
        }
    }
}

impl FromStr for QuoteAsset {
    type Err = CollectError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "usdt" => Ok(QuoteAsset::Usdt),
            other => Err(CollectError::Config(format!(
                "unsupported quote asset: {other}"
            ))),
        }
    }
}

/// Candle timeframe
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Timeframe {
    #[serde(rename = "1h")]
    H1,
    #[serde(rename = "4h")]
    H4,
    #[serde(rename = "1d")]
    D1,
}

impl Timeframe {
    pub fn as_str(&self) -> &'static str {
        match self {
            Timeframe::H1 => "1h",
            Timeframe::H4 => "4h",
            Timeframe::D1 => "1d",
        }
    }

    /// Width of one candle at this timeframe
    pub fn duration(&self) -> Duration {
        match self {
            Timeframe::H1 => Duration::hours(1),
            Timeframe::H4 => Duration::hours(4),
            Timeframe::D1 => Duration::days(1),
        }
    }
}

impl fmt::Display for Timeframe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Timeframe {
    type Err = CollectError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "1h" => Ok(Timeframe::H1),
            "4h" => Ok(Timeframe::H4),
            "1d" => Ok(Timeframe::D1),
            other => Err(CollectError::Config(format!(
                "unsupported timeframe: {other}"
            ))),
        }
    }
}

/// One normalized OHLCV candle.
///
/// `timestamp` is the candle open time in UTC. Prices and volume keep the
/// exchange's decimal precision; string payloads are parsed with
/// [`rust_decimal`] rather than floats.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Kline {
    pub timestamp: DateTime<Utc>,
    pub open: Decimal,
    pub high: Decimal,
    pub low: Decimal,
    pub close: Decimal,
    pub volume: Decimal,
}

/// Time range of a candle fetch.
///
/// The range is half-open: `[start, end)`. An absent `end` means "up to now".
/// The window itself is never mutated during pagination; clients derive a
/// cursor from it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchWindow {
    pub start: DateTime<Utc>,
    pub end: Option<DateTime<Utc>>,
}

impl FetchWindow {
    /// Bounded window; fails fast when `start >= end`.
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> crate::Result<Self> {
        if start >= end {
            return Err(CollectError::Config(format!(
                "invalid fetch window: start {start} is not before end {end}"
            )));
        }
        Ok(Self {
            start,
            end: Some(end),
        })
    }

    /// Open-ended window from `start` up to "now"
    pub fn since(start: DateTime<Utc>) -> Self {
        Self { start, end: None }
    }
}

/// Parameters for one paginated candle fetch
#[derive(Debug, Clone)]
pub struct KlineRequest {
    pub symbol: String,
    pub timeframe: Timeframe,
    pub market_type: MarketType,
    pub window: FetchWindow,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn enum_string_round_trips() {
        assert_eq!("binance".parse::<Exchange>().unwrap(), Exchange::Binance);
        assert_eq!(Exchange::Bybit.to_string(), "bybit");
        assert_eq!("futures".parse::<MarketType>().unwrap(), MarketType::Futures);
        assert_eq!("4h".parse::<Timeframe>().unwrap(), Timeframe::H4);
        assert_eq!(Timeframe::D1.to_string(), "1d");
        assert_eq!(QuoteAsset::Usdt.code(), "USDT");
    }

    #[test]
    fn unknown_exchange_is_config_error() {
        let err = "kraken".parse::<Exchange>().unwrap_err();
        assert!(matches!(err, CollectError::Config(_)));
    }

    #[test]
    fn fetch_window_rejects_inverted_range() {
        let start = "2024-01-02T00:00:00Z".parse().unwrap();
        let end = "2024-01-01T00:00:00Z".parse().unwrap();
        assert!(FetchWindow::new(start, end).is_err());
        assert!(FetchWindow::new(start, start).is_err());
    }

    #[test]
    fn timeframe_durations() {
        assert_eq!(Timeframe::H1.duration(), Duration::hours(1));
        assert_eq!(Timeframe::D1.duration(), Duration::hours(24));
    }
}
