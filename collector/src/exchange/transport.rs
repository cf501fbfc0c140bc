//! Shared retrying HTTP transport used by every exchange client

use crate::exchange::rate_limit::RateLimiter;
use crate::{CollectError, Result};
use reqwest::header::{HeaderMap, RETRY_AFTER};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, warn};

/// Maximum number of retries after the initial attempt
pub const MAX_RETRIES: u32 = 3;

/// Fixed per-request timeout; a multi-page fetch has no overall deadline
const HTTP_TIMEOUT: Duration = Duration::from_secs(30);

/// Rate-limited GET transport with bounded retry.
///
/// Retry policy:
/// - the rate limiter is acquired before every attempt, retries included
/// - statuses 429/500/502/503/504 back off by the `Retry-After` header when
///   present, otherwise `2^attempt` seconds (attempt zero-indexed)
/// - transport-level failures (connect, timeout, DNS) use the same backoff
/// - at most [`MAX_RETRIES`] retries; the final attempt propagates its error
/// - any other non-2xx status is terminal and carries the response body
#[derive(Debug)]
pub struct RestTransport {
    http: reqwest::Client,
    limiter: RateLimiter,
    max_retries: u32,
}

impl RestTransport {
    /// Transport owning its own connection pool, paced at
    /// `requests_per_second`.
    pub fn new(requests_per_second: f64) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(HTTP_TIMEOUT)
            .build()
            .map_err(CollectError::Transport)?;
        Ok(Self::with_client(http, requests_per_second))
    }

    /// Transport over an externally supplied client, sharing its connection
    /// pool. The rate limiter still belongs to this instance alone.
    pub fn with_client(http: reqwest::Client, requests_per_second: f64) -> Self {
        Self {
            http,
            limiter: RateLimiter::per_second(requests_per_second),
            max_retries: MAX_RETRIES,
        }
    }

    /// GET `url` with `params` and decode the JSON body into `T`.
    pub async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        params: &[(&str, String)],
    ) -> Result<T> {
        let mut attempt = 0u32;
        loop {
            self.limiter.acquire().await;
            debug!(url, attempt, "sending request");

            match self.http.get(url).query(params).send().await {
                Ok(response) => {
                    let status = response.status();
                    if status.is_success() {
                        return response
                            .json::<T>()
                            .await
                            .map_err(|err| CollectError::Parse(err.to_string()));
                    }
                    if CollectError::is_retryable_status(status) && attempt < self.max_retries {
                        let delay =
                            retry_after(response.headers()).unwrap_or_else(|| backoff(attempt));
                        warn!(
                            %status,
                            attempt,
                            delay_ms = delay.as_millis() as u64,
                            "retryable upstream status, backing off"
                        );
                        sleep(delay).await;
                    } else {
                        let body = response.text().await.unwrap_or_default();
                        return Err(CollectError::UpstreamStatus { status, body });
                    }
                }
                Err(err) if attempt < self.max_retries => {
                    let delay = backoff(attempt);
                    warn!(
                        error = %err,
                        attempt,
                        delay_ms = delay.as_millis() as u64,
                        "transport failure, backing off"
                    );
                    sleep(delay).await;
                }
                Err(err) => return Err(err.into()),
            }
            attempt += 1;
        }
    }
}

/// Exponential backoff: `2^attempt` seconds, attempt zero-indexed
fn backoff(attempt: u32) -> Duration {
    Duration::from_secs(1u64 << attempt)
}

/// Delay requested by the server, when it sent one
fn retry_after(headers: &HeaderMap) -> Option<Duration> {
    headers
        .get(RETRY_AFTER)?
        .to_str()
        .ok()?
        .parse::<u64>()
        .ok()
        .map(Duration::from_secs)
}
