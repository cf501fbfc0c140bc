//! Binance public API client (spot + USD-M futures)

use crate::exchange::{transport::RestTransport, ExchangeClient, KlineStream};
use crate::model::{Exchange, Kline, KlineRequest, MarketType, QuoteAsset};
use crate::{CollectError, Result};
use async_trait::async_trait;
use chrono::{DateTime, TimeDelta, Utc};
use futures::stream;
use futures::StreamExt;
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::Value;
use std::str::FromStr;
use std::sync::Arc;
use tracing::{debug, info};

const SPOT_BASE_URL: &str = "https://api.binance.com";
const FUTURES_BASE_URL: &str = "https://fapi.binance.com";

/// Binance weight budget allows well above this; 20 req/s is comfortable
const REQUESTS_PER_SECOND: f64 = 20.0;

/// Maximum rows per klines page
const PAGE_LIMIT: usize = 1000;

/// Binance client paginating klines forward in time.
///
/// Spot and futures differ only in base URL and endpoint path; both return
/// klines oldest-first as positional JSON arrays with millisecond open times
/// and string-encoded prices.
#[derive(Clone)]
pub struct BinanceClient {
    transport: Arc<RestTransport>,
    spot_base_url: String,
    futures_base_url: String,
    page_limit: usize,
}

impl BinanceClient {
    /// Client against the production endpoints, owning its transport
    pub fn new() -> Result<Self> {
        Ok(Self {
            transport: Arc::new(RestTransport::new(REQUESTS_PER_SECOND)?),
            spot_base_url: SPOT_BASE_URL.to_string(),
            futures_base_url: FUTURES_BASE_URL.to_string(),
            page_limit: PAGE_LIMIT,
        })
    }

    /// Client with both market types pointed at `base_url`, for tests
    /// against a local mock server.
    pub fn with_base_url(base_url: impl Into<String>, transport: RestTransport) -> Self {
        let base_url = base_url.into();
        Self {
            transport: Arc::new(transport),
            spot_base_url: base_url.clone(),
            futures_base_url: base_url,
            page_limit: PAGE_LIMIT,
        }
    }

    /// Override the page size constant (small pages keep test fixtures small)
    pub fn with_page_limit(mut self, page_limit: usize) -> Self {
        self.page_limit = page_limit;
        self
    }

    fn base_url(&self, market_type: MarketType) -> &str {
        match market_type {
            MarketType::Spot => &self.spot_base_url,
            MarketType::Futures => &self.futures_base_url,
        }
    }

    fn klines_path(market_type: MarketType) -> &'static str {
        match market_type {
            MarketType::Spot => "/api/v3/klines",
            MarketType::Futures => "/fapi/v1/klines",
        }
    }

    fn exchange_info_path(market_type: MarketType) -> &'static str {
        match market_type {
            MarketType::Spot => "/api/v3/exchangeInfo",
            MarketType::Futures => "/fapi/v1/exchangeInfo",
        }
    }
}

#[derive(Debug, Deserialize)]
struct ExchangeInfo {
    symbols: Vec<SymbolInfo>,
}

#[derive(Debug, Deserialize)]
struct SymbolInfo {
    symbol: String,
    status: String,
}

/// Pagination cursor for one klines stream
struct PageState {
    transport: Arc<RestTransport>,
    url: String,
    symbol: String,
    interval: &'static str,
    page_limit: usize,
    cursor: DateTime<Utc>,
    end_param_ms: Option<i64>,
    end: Option<DateTime<Utc>>,
    done: bool,
}

#[async_trait]
impl ExchangeClient for BinanceClient {
    fn exchange(&self) -> Exchange {
        Exchange::Binance
    }

    async fn active_symbols(
        &self,
        market_type: MarketType,
        quote_asset: QuoteAsset,
    ) -> Result<Vec<String>> {
        let url = format!(
            "{}{}",
            self.base_url(market_type),
            Self::exchange_info_path(market_type)
        );
        let info: ExchangeInfo = self.transport.get_json(&url, &[]).await?;

        let symbols: Vec<String> = info
            .symbols
            .into_iter()
            .filter(|item| item.status == "TRADING" && item.symbol.ends_with(quote_asset.code()))
            .map(|item| item.symbol)
            .collect();
        info!(
            exchange = "binance",
            %market_type,
            count = symbols.len(),
            "listed active symbols"
        );
        Ok(symbols)
    }

    fn stream_klines(&self, request: KlineRequest) -> Result<KlineStream> {
        let window = request.window;
        if let Some(end) = window.end {
            if window.start >= end {
                return Err(CollectError::Config(format!(
                    "invalid fetch window: start {} is not before end {end}",
                    window.start
                )));
            }
        }

        info!(
            exchange = "binance",
            symbol = %request.symbol,
            timeframe = %request.timeframe,
            market_type = %request.market_type,
            start = %window.start,
            "starting klines pagination"
        );

        let state = PageState {
            transport: self.transport.clone(),
            url: format!(
                "{}{}",
                self.base_url(request.market_type),
                Self::klines_path(request.market_type)
            ),
            symbol: request.symbol.to_uppercase(),
            interval: request.timeframe.as_str(),
            page_limit: self.page_limit,
            cursor: window.start,
            // Binance treats endTime as inclusive; the window is half-open
            end_param_ms: window.end.map(|end| end.timestamp_millis() - 1),
            end: window.end,
            done: false,
        };

        Ok(stream::unfold(state, |mut state| async move {
            if state.done {
                return None;
            }

            let mut params = vec![
                ("symbol", state.symbol.clone()),
                ("interval", state.interval.to_string()),
                ("limit", state.page_limit.to_string()),
                ("startTime", state.cursor.timestamp_millis().to_string()),
            ];
            if let Some(end_ms) = state.end_param_ms {
                params.push(("endTime", end_ms.to_string()));
            }

            let rows: Vec<Vec<Value>> = match state.transport.get_json(&state.url, &params).await {
                Ok(rows) => rows,
                Err(err) => {
                    state.done = true;
                    return Some((Err(err), state));
                }
            };
            if rows.is_empty() {
                return None;
            }

            let batch: Vec<Kline> = match rows.iter().map(|row| parse_kline(row)).collect() {
                Ok(batch) => batch,
                Err(err) => {
                    state.done = true;
                    return Some((Err(err), state));
                }
            };

            if rows.len() < state.page_limit {
                // short page: nothing further upstream
                state.done = true;
            } else if let Some(last) = batch.last() {
                state.cursor = last.timestamp + TimeDelta::milliseconds(1);
                if state.end.is_some_and(|end| state.cursor >= end) {
                    state.done = true;
                }
            }

            debug!(
                batch_size = batch.len(),
                cursor = %state.cursor,
                done = state.done,
                "fetched klines page"
            );
            Some((Ok(batch), state))
        })
        .boxed())
    }
}

/// Parse one positional kline row:
/// `[open_time_ms, open, high, low, close, volume, close_time_ms, ...]`
/// with prices and volume string-encoded.
fn parse_kline(row: &[Value]) -> Result<Kline> {
    let open_time_ms = row
        .first()
        .and_then(Value::as_i64)
        .ok_or_else(|| CollectError::Parse(format!("missing kline open time in {row:?}")))?;
    let timestamp = DateTime::from_timestamp_millis(open_time_ms)
        .ok_or_else(|| CollectError::Parse(format!("invalid open time millis: {open_time_ms}")))?;

    Ok(Kline {
        timestamp,
        open: decimal_at(row, 1, "open")?,
        high: decimal_at(row, 2, "high")?,
        low: decimal_at(row, 3, "low")?,
        close: decimal_at(row, 4, "close")?,
        volume: decimal_at(row, 5, "volume")?,
    })
}

fn decimal_at(row: &[Value], index: usize, field: &str) -> Result<Decimal> {
    let raw = row
        .get(index)
        .and_then(Value::as_str)
        .ok_or_else(|| CollectError::Parse(format!("missing kline field '{field}'")))?;
    Decimal::from_str(raw)
        .map_err(|err| CollectError::Parse(format!("bad decimal in '{field}' ({raw}): {err}")))
}
