//! Bybit V5 public API client (spot + linear futures)

use crate::exchange::{transport::RestTransport, ExchangeClient, KlineStream};
use crate::model::{Exchange, Kline, KlineRequest, MarketType, QuoteAsset, Timeframe};
use crate::{CollectError, Result};
use async_trait::async_trait;
use chrono::DateTime;
use futures::stream;
use futures::StreamExt;
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::str::FromStr;
use std::sync::Arc;
use tracing::{debug, info};

const BASE_URL: &str = "https://api.bybit.com";

const REQUESTS_PER_SECOND: f64 = 10.0;

/// Maximum rows per page (both klines and instruments-info)
const PAGE_LIMIT: usize = 1000;

/// Bybit client.
///
/// Klines come back newest-first, so pagination walks backwards: each page is
/// reversed to chronological order before it is yielded and the end cursor
/// moves past the oldest row. Instrument listing uses an opaque
/// `nextPageCursor` token. Every response carries a `retCode` envelope that
/// must be zero.
#[derive(Clone)]
pub struct BybitClient {
    transport: Arc<RestTransport>,
    base_url: String,
    page_limit: usize,
}

impl BybitClient {
    /// Client against the production endpoint, owning its transport
    pub fn new() -> Result<Self> {
        Ok(Self {
            transport: Arc::new(RestTransport::new(REQUESTS_PER_SECOND)?),
            base_url: BASE_URL.to_string(),
            page_limit: PAGE_LIMIT,
        })
    }

    /// Client pointed at `base_url`, for tests against a local mock server
    pub fn with_base_url(base_url: impl Into<String>, transport: RestTransport) -> Self {
        Self {
            transport: Arc::new(transport),
            base_url: base_url.into(),
            page_limit: PAGE_LIMIT,
        }
    }

    /// Override the page size constant (small pages keep test fixtures small)
    pub fn with_page_limit(mut self, page_limit: usize) -> Self {
        self.page_limit = page_limit;
        self
    }

    fn category(market_type: MarketType) -> &'static str {
        match market_type {
            MarketType::Spot => "spot",
            MarketType::Futures => "linear",
        }
    }

    fn interval(timeframe: Timeframe) -> &'static str {
        match timeframe {
            Timeframe::H1 => "60",
            Timeframe::H4 => "240",
            Timeframe::D1 => "D",
        }
    }
}

#[derive(Debug, Deserialize)]
struct Envelope<T> {
    #[serde(rename = "retCode")]
    ret_code: i64,
    #[serde(rename = "retMsg", default)]
    ret_msg: String,
    result: Option<T>,
}

impl<T> Envelope<T> {
    /// Unwrap the payload, mapping a non-zero `retCode` to an API error
    fn into_result(self) -> Result<T> {
        if self.ret_code != 0 {
            return Err(CollectError::Api(format!(
                "bybit error (retCode {}): {}",
                self.ret_code, self.ret_msg
            )));
        }
        self.result
            .ok_or_else(|| CollectError::Parse("bybit response missing 'result'".to_string()))
    }
}

#[derive(Debug, Deserialize)]
struct InstrumentsPage {
    list: Vec<InstrumentInfo>,
    #[serde(rename = "nextPageCursor", default)]
    next_page_cursor: Option<String>,
}

#[derive(Debug, Deserialize)]
struct InstrumentInfo {
    symbol: String,
}

#[derive(Debug, Deserialize)]
struct KlinesPage {
    list: Vec<Vec<String>>,
}

async fn get_enveloped<T: DeserializeOwned>(
    transport: &RestTransport,
    url: &str,
    params: &[(&str, String)],
) -> Result<T> {
    let envelope: Envelope<T> = transport.get_json(url, params).await?;
    envelope.into_result()
}

/// Pagination cursor for one klines stream; walks backwards in time
struct PageState {
    transport: Arc<RestTransport>,
    url: String,
    category: &'static str,
    symbol: String,
    interval: &'static str,
    page_limit: usize,
    start_ms: i64,
    end_ms: Option<i64>,
    done: bool,
}

#[async_trait]
impl ExchangeClient for BybitClient {
    fn exchange(&self) -> Exchange {
        Exchange::Bybit
    }

    async fn active_symbols(
        &self,
        market_type: MarketType,
        quote_asset: QuoteAsset,
    ) -> Result<Vec<String>> {
        let url = format!("{}/v5/market/instruments-info", self.base_url);
        let category = Self::category(market_type);
        let mut symbols = Vec::new();
        let mut cursor: Option<String> = None;

        loop {
            let mut params = vec![
                ("category", category.to_string()),
                ("limit", self.page_limit.to_string()),
                ("status", "Trading".to_string()),
            ];
            if let Some(cursor) = &cursor {
                params.push(("cursor", cursor.clone()));
            }

            let page: InstrumentsPage = get_enveloped(&self.transport, &url, &params).await?;
            symbols.extend(
                page.list
                    .into_iter()
                    .map(|item| item.symbol)
                    .filter(|symbol| symbol.ends_with(quote_asset.code())),
            );

            match page.next_page_cursor {
                Some(next) if !next.is_empty() => cursor = Some(next),
                _ => break,
            }
        }

        info!(
            exchange = "bybit",
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
            exchange = "bybit",
            symbol = %request.symbol,
            timeframe = %request.timeframe,
            market_type = %request.market_type,
            start = %window.start,
            "starting klines pagination"
        );

        let state = PageState {
            transport: self.transport.clone(),
            url: format!("{}/v5/market/kline", self.base_url),
            category: Self::category(request.market_type),
            symbol: request.symbol.to_uppercase(),
            interval: Self::interval(request.timeframe),
            page_limit: self.page_limit,
            start_ms: window.start.timestamp_millis(),
            // Bybit treats `end` as inclusive; the window is half-open
            end_ms: window.end.map(|end| end.timestamp_millis() - 1),
            done: false,
        };

        Ok(stream::unfold(state, |mut state| async move {
            if state.done {
                return None;
            }

            let mut params = vec![
                ("category", state.category.to_string()),
                ("symbol", state.symbol.clone()),
                ("interval", state.interval.to_string()),
                ("limit", state.page_limit.to_string()),
                ("start", state.start_ms.to_string()),
            ];
            if let Some(end_ms) = state.end_ms {
                params.push(("end", end_ms.to_string()));
            }

            let page: KlinesPage =
                match get_enveloped(&state.transport, &state.url, &params).await {
                    Ok(page) => page,
                    Err(err) => {
                        state.done = true;
                        return Some((Err(err), state));
                    }
                };
            if page.list.is_empty() {
                return None;
            }

            // rows arrive newest-first; hand them to the caller oldest-first
            let batch: Vec<Kline> = match page.list.iter().rev().map(|row| parse_kline(row)).collect()
            {
                Ok(batch) => batch,
                Err(err) => {
                    state.done = true;
                    return Some((Err(err), state));
                }
            };

            if page.list.len() < state.page_limit {
                state.done = true;
            } else if let Some(oldest) = batch.first() {
                // next page ends just before the oldest row seen so far
                let next_end_ms = oldest.timestamp.timestamp_millis() - 1;
                if next_end_ms <= state.start_ms {
                    state.done = true;
                } else {
                    state.end_ms = Some(next_end_ms);
                }
            }

            debug!(
                batch_size = batch.len(),
                end_ms = state.end_ms,
                done = state.done,
                "fetched klines page"
            );
            Some((Ok(batch), state))
        })
        .boxed())
    }
}

/// Parse one kline row: `[startTime, open, high, low, close, volume, turnover]`,
/// every field string-encoded, `startTime` in milliseconds.
fn parse_kline(row: &[String]) -> Result<Kline> {
    let open_time_ms = row
        .first()
        .ok_or_else(|| CollectError::Parse("empty kline row".to_string()))?
        .parse::<i64>()
        .map_err(|err| CollectError::Parse(format!("bad kline open time: {err}")))?;
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

fn decimal_at(row: &[String], index: usize, field: &str) -> Result<Decimal> {
    let raw = row
        .get(index)
        .ok_or_else(|| CollectError::Parse(format!("missing kline field '{field}'")))?;
    Decimal::from_str(raw)
        .map_err(|err| CollectError::Parse(format!("bad decimal in '{field}' ({raw}): {err}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn parse_kline_row() {
        let kline = parse_kline(&row(&[
            "1670608800000",
            "17071",
            "17073",
            "17027",
            "17055.5",
            "268.276",
            "4577505.64",
        ]))
        .unwrap();
        assert_eq!(
            kline.timestamp,
            DateTime::from_timestamp_millis(1670608800000).unwrap()
        );
        assert_eq!(kline.close, Decimal::from_str("17055.5").unwrap());
        assert_eq!(kline.volume, Decimal::from_str("268.276").unwrap());
    }

    #[test]
    fn parse_kline_rejects_short_row() {
        let err = parse_kline(&row(&["1670608800000", "17071"])).unwrap_err();
        assert!(matches!(err, CollectError::Parse(_)));
    }

    #[test]
    fn envelope_maps_ret_code_to_api_error() {
        let envelope: Envelope<KlinesPage> = serde_json::from_str(
            r#"{"retCode": 10001, "retMsg": "params error", "result": null}"#,
        )
        .unwrap();
        let err = envelope.into_result().unwrap_err();
        assert!(matches!(err, CollectError::Api(_)));
        assert!(err.to_string().contains("10001"));
        assert!(err.to_string().contains("params error"));
    }

    #[test]
    fn category_and_interval_mapping() {
        assert_eq!(BybitClient::category(MarketType::Spot), "spot");
        assert_eq!(BybitClient::category(MarketType::Futures), "linear");
        assert_eq!(BybitClient::interval(Timeframe::H1), "60");
        assert_eq!(BybitClient::interval(Timeframe::H4), "240");
        assert_eq!(BybitClient::interval(Timeframe::D1), "D");
    }
}
