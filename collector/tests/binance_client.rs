//! Binance client tests against a mock server

use collector::exchange::{BinanceClient, ExchangeClient, RestTransport};
use collector::model::{FetchWindow, KlineRequest, MarketType, QuoteAsset, Timeframe};
use collector::CollectError;
use chrono::{DateTime, Utc};
use futures::StreamExt;
use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn setup() -> (MockServer, BinanceClient) {
    let server = MockServer::start().await;
    let client = BinanceClient::with_base_url(server.uri(), RestTransport::new(10_000.0).unwrap());
    (server, client)
}

fn ts(s: &str) -> DateTime<Utc> {
    s.parse().unwrap()
}

fn kline_row(open_time_ms: i64, open: &str, close: &str) -> serde_json::Value {
    json!([
        open_time_ms,
        open,
        "30000.00",
        "28000.00",
        close,
        "1000.00",
        open_time_ms + 3_599_999,
        "29000000.00",
        5000,
        "500.00",
        "14500000.00",
        "0"
    ])
}

fn hourly_request(start: &str, end: &str) -> KlineRequest {
    KlineRequest {
        symbol: "BTCUSDT".to_string(),
        timeframe: Timeframe::H1,
        market_type: MarketType::Spot,
        window: FetchWindow::new(ts(start), ts(end)).unwrap(),
    }
}

#[tokio::test]
async fn active_symbols_filters_status_and_quote_asset() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/fapi/v1/exchangeInfo"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "symbols": [
                {"symbol": "BTCUSDT", "status": "TRADING"},
                {"symbol": "ETHUSDT", "status": "TRADING"},
                {"symbol": "DOGEUSDT", "status": "BREAK"},
                {"symbol": "BTCBUSD", "status": "TRADING"}
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let symbols = client
        .active_symbols(MarketType::Futures, QuoteAsset::Usdt)
        .await
        .unwrap();
    assert_eq!(symbols, vec!["BTCUSDT", "ETHUSDT"]);
}

#[tokio::test]
async fn three_hour_window_yields_three_ascending_klines() {
    let (server, client) = setup().await;

    // start 2024-01-01T00:00:00Z, end 2024-01-01T03:00:00Z (exclusive):
    // endTime sent to Binance is end - 1ms
    Mock::given(method("GET"))
        .and(path("/api/v3/klines"))
        .and(query_param("symbol", "BTCUSDT"))
        .and(query_param("interval", "1h"))
        .and(query_param("startTime", "1704067200000"))
        .and(query_param("endTime", "1704077999999"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            kline_row(1704067200000, "42000.0", "42100.0"),
            kline_row(1704070800000, "42100.0", "42200.0"),
            kline_row(1704074400000, "42200.0", "42300.0")
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let request = hourly_request("2024-01-01T00:00:00Z", "2024-01-01T03:00:00Z");
    let batches: Vec<_> = client.stream_klines(request).unwrap().collect().await;

    // one short page, one batch, no second request
    assert_eq!(batches.len(), 1);
    let batch = batches[0].as_ref().unwrap();
    assert_eq!(batch.len(), 3);
    let timestamps: Vec<_> = batch.iter().map(|k| k.timestamp).collect();
    assert_eq!(
        timestamps,
        vec![
            ts("2024-01-01T00:00:00Z"),
            ts("2024-01-01T01:00:00Z"),
            ts("2024-01-01T02:00:00Z"),
        ]
    );
}

#[tokio::test]
async fn full_pages_advance_the_start_cursor() {
    let (server, client) = setup().await;
    let client = client.with_page_limit(2);

    // first page is full: cursor moves to last open time + 1ms
    Mock::given(method("GET"))
        .and(path("/api/v3/klines"))
        .and(query_param("startTime", "1704067200000"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            kline_row(1704067200000, "42000.0", "42100.0"),
            kline_row(1704070800000, "42100.0", "42200.0")
        ])))
        .expect(1)
        .mount(&server)
        .await;
    // second page is short: pagination terminates
    Mock::given(method("GET"))
        .and(path("/api/v3/klines"))
        .and(query_param("startTime", "1704070800001"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            kline_row(1704074400000, "42200.0", "42300.0")
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let request = hourly_request("2024-01-01T00:00:00Z", "2024-01-01T06:00:00Z");
    let batches: Vec<_> = client.stream_klines(request).unwrap().collect().await;

    assert_eq!(batches.len(), 2);
    assert_eq!(batches[0].as_ref().unwrap().len(), 2);
    assert_eq!(batches[1].as_ref().unwrap().len(), 1);

    let all: Vec<_> = batches
        .iter()
        .flat_map(|b| b.as_ref().unwrap().iter().map(|k| k.timestamp))
        .collect();
    assert!(all.windows(2).all(|w| w[0] < w[1]), "ascending across pages");
}

#[tokio::test]
async fn full_page_reaching_end_stops_without_extra_request() {
    let (server, client) = setup().await;
    let client = client.with_page_limit(2);

    // page is full AND the advanced cursor passes the window end:
    // no further request may be issued
    Mock::given(method("GET"))
        .and(path("/api/v3/klines"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            kline_row(1704067200000, "42000.0", "42100.0"),
            kline_row(1704070800000, "42100.0", "42200.0")
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let request = hourly_request("2024-01-01T00:00:00Z", "2024-01-01T02:00:00Z");
    let batches: Vec<_> = client.stream_klines(request).unwrap().collect().await;
    assert_eq!(batches.len(), 1);
}

#[tokio::test]
async fn upstream_error_is_yielded_then_stream_ends() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/v3/klines"))
        .respond_with(
            ResponseTemplate::new(400)
                .set_body_string(r#"{"code":-1121,"msg":"Invalid symbol."}"#),
        )
        .expect(1)
        .mount(&server)
        .await;

    let request = hourly_request("2024-01-01T00:00:00Z", "2024-01-01T03:00:00Z");
    let mut stream = client.stream_klines(request).unwrap();

    let first = stream.next().await.unwrap();
    match first.unwrap_err() {
        CollectError::UpstreamStatus { status, body } => {
            assert_eq!(status.as_u16(), 400);
            assert!(body.contains("Invalid symbol"));
        }
        other => panic!("expected UpstreamStatus, got {other:?}"),
    }
    assert!(stream.next().await.is_none(), "stream ends after an error");
}

#[tokio::test]
async fn inverted_window_fails_before_any_request() {
    let (_server, client) = setup().await;

    let request = KlineRequest {
        symbol: "BTCUSDT".to_string(),
        timeframe: Timeframe::H1,
        market_type: MarketType::Spot,
        window: FetchWindow {
            start: ts("2024-02-01T00:00:00Z"),
            end: Some(ts("2024-01-01T00:00:00Z")),
        },
    };
    let err = match client.stream_klines(request) {
        Ok(_) => panic!("expected an error before any request"),
        Err(err) => err,
    };
    assert!(matches!(err, CollectError::Config(_)));
}
