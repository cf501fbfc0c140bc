//! Retry/backoff behavior of the shared REST transport

use collector::exchange::RestTransport;
use collector::CollectError;
use serde_json::{json, Value};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn transport() -> RestTransport {
    // high rate so the limiter never delays the test
    RestTransport::new(10_000.0).unwrap()
}

#[tokio::test]
async fn succeeds_on_third_attempt_after_two_rate_limits() {
    let server = MockServer::start().await;

    // first two attempts are rejected; Retry-After keeps the test fast
    Mock::given(method("GET"))
        .and(path("/data"))
        .respond_with(
            ResponseTemplate::new(429).insert_header("Retry-After", "0"),
        )
        .up_to_n_times(2)
        .expect(2)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/data"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true})))
        .expect(1)
        .mount(&server)
        .await;

    let url = format!("{}/data", server.uri());
    let body: Value = transport().get_json(&url, &[]).await.unwrap();
    assert_eq!(body["ok"], json!(true));
}

#[tokio::test]
async fn honors_retry_after_delay() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/data"))
        .respond_with(
            ResponseTemplate::new(503).insert_header("Retry-After", "1"),
        )
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/data"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(1)
        .mount(&server)
        .await;

    let url = format!("{}/data", server.uri());
    let started = std::time::Instant::now();
    let _: Value = transport().get_json(&url, &[]).await.unwrap();
    assert!(
        started.elapsed() >= std::time::Duration::from_secs(1),
        "retry should have waited for the Retry-After delay"
    );
}

#[tokio::test]
async fn non_retryable_status_fails_immediately() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/data"))
        .respond_with(
            ResponseTemplate::new(400).set_body_string(r#"{"code":-1121,"msg":"Invalid symbol."}"#),
        )
        .expect(1)
        .mount(&server)
        .await;

    let url = format!("{}/data", server.uri());
    let err = transport().get_json::<Value>(&url, &[]).await.unwrap_err();

    match err {
        CollectError::UpstreamStatus { status, body } => {
            assert_eq!(status.as_u16(), 400);
            assert!(body.contains("-1121"), "body should carry the cause: {body}");
        }
        other => panic!("expected UpstreamStatus, got {other:?}"),
    }
}

#[tokio::test]
async fn retry_budget_exhaustion_propagates_last_status() {
    let server = MockServer::start().await;

    // MAX_RETRIES = 3 means 4 attempts in total, then the error propagates
    Mock::given(method("GET"))
        .and(path("/data"))
        .respond_with(
            ResponseTemplate::new(429)
                .insert_header("Retry-After", "0")
                .set_body_string("slow down"),
        )
        .expect(4)
        .mount(&server)
        .await;

    let url = format!("{}/data", server.uri());
    let err = transport().get_json::<Value>(&url, &[]).await.unwrap_err();

    match err {
        CollectError::UpstreamStatus { status, body } => {
            assert_eq!(status.as_u16(), 429);
            assert_eq!(body, "slow down");
        }
        other => panic!("expected UpstreamStatus, got {other:?}"),
    }
}
