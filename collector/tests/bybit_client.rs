//! Bybit client tests against a mock server

use collector::exchange::{BybitClient, ExchangeClient, RestTransport};
use collector::model::{FetchWindow, KlineRequest, MarketType, QuoteAsset, Timeframe};
use collector::CollectError;
use chrono::{DateTime, Utc};
use futures::StreamExt;
use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn setup() -> (MockServer, BybitClient) {
    let server = MockServer::start().await;
    let client = BybitClient::with_base_url(server.uri(), RestTransport::new(10_000.0).unwrap());
    (server, client)
}

fn ts(s: &str) -> DateTime<Utc> {
    s.parse().unwrap()
}

fn kline_row(open_time_ms: i64, open: &str, close: &str) -> serde_json::Value {
    json!([
        open_time_ms.to_string(),
        open,
        "17100",
        "17000",
        close,
        "268.276",
        "4577505.64"
    ])
}

fn ok_klines(rows: Vec<serde_json::Value>) -> serde_json::Value {
    json!({
        "retCode": 0,
        "retMsg": "OK",
        "result": {"category": "spot", "symbol": "BTCUSDT", "list": rows}
    })
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
async fn active_symbols_follows_the_page_cursor() {
    let (server, client) = setup().await;

    // first page carries a continuation cursor
    Mock::given(method("GET"))
        .and(path("/v5/market/instruments-info"))
        .and(query_param("category", "linear"))
        .and(query_param("status", "Trading"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "retCode": 0,
            "retMsg": "OK",
            "result": {
                "list": [{"symbol": "BTCUSDT"}, {"symbol": "ETHUSDC"}],
                "nextPageCursor": "cursor-1"
            }
        })))
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;
    // second page signals the end with an empty cursor
    Mock::given(method("GET"))
        .and(path("/v5/market/instruments-info"))
        .and(query_param("cursor", "cursor-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "retCode": 0,
            "retMsg": "OK",
            "result": {
                "list": [{"symbol": "SOLUSDT"}],
                "nextPageCursor": ""
            }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let symbols = client
        .active_symbols(MarketType::Futures, QuoteAsset::Usdt)
        .await
        .unwrap();
    assert_eq!(symbols, vec!["BTCUSDT", "SOLUSDT"]);
}

#[tokio::test]
async fn non_zero_ret_code_is_an_api_error() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/v5/market/instruments-info"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "retCode": 10001,
            "retMsg": "params error",
            "result": null
        })))
        .expect(1)
        .mount(&server)
        .await;

    let err = client
        .active_symbols(MarketType::Spot, QuoteAsset::Usdt)
        .await
        .unwrap_err();
    match err {
        CollectError::Api(message) => {
            assert!(message.contains("10001"));
            assert!(message.contains("params error"));
        }
        other => panic!("expected Api error, got {other:?}"),
    }
}

#[tokio::test]
async fn newest_first_pages_are_reversed_and_walk_backwards() {
    let (server, client) = setup().await;
    let client = client.with_page_limit(2);

    // window [00:00, 03:00): the initial end parameter is end - 1ms.
    // Bybit returns newest first; the first (full) page holds 02:00 and 01:00.
    Mock::given(method("GET"))
        .and(path("/v5/market/kline"))
        .and(query_param("symbol", "BTCUSDT"))
        .and(query_param("interval", "60"))
        .and(query_param("start", "1704067200000"))
        .and(query_param("end", "1704077999999"))
        .respond_with(ResponseTemplate::new(200).set_body_json(ok_klines(vec![
            kline_row(1704074400000, "17060", "17065"),
            kline_row(1704070800000, "17050", "17060"),
        ])))
        .expect(1)
        .mount(&server)
        .await;
    // second request ends just before the oldest row seen (01:00 - 1ms)
    Mock::given(method("GET"))
        .and(path("/v5/market/kline"))
        .and(query_param("end", "1704070799999"))
        .respond_with(ResponseTemplate::new(200).set_body_json(ok_klines(vec![
            kline_row(1704067200000, "17040", "17050"),
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let request = hourly_request("2024-01-01T00:00:00Z", "2024-01-01T03:00:00Z");
    let batches: Vec<_> = client.stream_klines(request).unwrap().collect().await;

    assert_eq!(batches.len(), 2);
    let first = batches[0].as_ref().unwrap();
    let second = batches[1].as_ref().unwrap();

    // each yielded batch is chronological even though the page was newest-first
    assert_eq!(
        first.iter().map(|k| k.timestamp).collect::<Vec<_>>(),
        vec![ts("2024-01-01T01:00:00Z"), ts("2024-01-01T02:00:00Z")]
    );
    assert_eq!(second[0].timestamp, ts("2024-01-01T00:00:00Z"));
}

#[tokio::test]
async fn short_page_terminates_after_one_request() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/v5/market/kline"))
        .respond_with(ResponseTemplate::new(200).set_body_json(ok_klines(vec![
            kline_row(1704070800000, "17050", "17060"),
            kline_row(1704067200000, "17040", "17050"),
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let request = hourly_request("2024-01-01T00:00:00Z", "2024-01-01T03:00:00Z");
    let batches: Vec<_> = client.stream_klines(request).unwrap().collect().await;

    assert_eq!(batches.len(), 1);
    let batch = batches[0].as_ref().unwrap();
    assert_eq!(batch.len(), 2);
    assert!(batch[0].timestamp < batch[1].timestamp);
}

#[tokio::test]
async fn backwards_cursor_stops_at_window_start() {
    let (server, client) = setup().await;
    let client = client.with_page_limit(2);

    // full page whose oldest row sits at the window start: the next end
    // cursor would fall before start, so no second request is made
    Mock::given(method("GET"))
        .and(path("/v5/market/kline"))
        .respond_with(ResponseTemplate::new(200).set_body_json(ok_klines(vec![
            kline_row(1704070800000, "17050", "17060"),
            kline_row(1704067200000, "17040", "17050"),
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let request = hourly_request("2024-01-01T00:00:00Z", "2024-01-01T02:00:00Z");
    let batches: Vec<_> = client.stream_klines(request).unwrap().collect().await;
    assert_eq!(batches.len(), 1);
}
