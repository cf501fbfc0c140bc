//! Error taxonomy for the ingestion core

use crate::model::{Exchange, MarketType};
use reqwest::StatusCode;

/// Errors surfaced by exchange clients, the ingestor and the reconciler.
///
/// The variants separate caller-input problems (`Config`,
/// `InstrumentNotFound`) from upstream failures (`Transport`,
/// `UpstreamStatus`, `Api`, `Parse`) and from persistence failures
/// (`Storage`), so callers can map them to distinct responses.
#[derive(Debug, thiserror::Error)]
pub enum CollectError {
    /// Unsupported market type/timeframe combination or malformed request.
    /// Raised before any network call is made.
    #[error("configuration error: {0}")]
    Config(String),

    /// Transport-level failure (connect, timeout, DNS), after retries.
    #[error("http transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// Non-retryable HTTP status, or a retryable one after the retry budget
    /// was exhausted. Carries the response body for diagnosis.
    #[error("upstream returned {status}: {body}")]
    UpstreamStatus { status: StatusCode, body: String },

    /// Exchange-reported application error (e.g. Bybit `retCode != 0`).
    #[error("exchange api error: {0}")]
    Api(String),

    /// Malformed or unexpected response payload.
    #[error("failed to parse exchange response: {0}")]
    Parse(String),

    /// The requested instrument is unknown or inactive in the store.
    #[error("symbol '{symbol}' not found or inactive for {exchange}/{market_type}")]
    InstrumentNotFound {
        exchange: Exchange,
        market_type: MarketType,
        symbol: String,
    },

    /// Persistence failure, surfaced as-is.
    #[error("storage error: {0}")]
    Storage(#[from] anyhow::Error),
}

impl CollectError {
    /// Statuses worth retrying with backoff; everything else is terminal.
    pub(crate) fn is_retryable_status(status: StatusCode) -> bool {
        matches!(
            status,
            StatusCode::TOO_MANY_REQUESTS
                | StatusCode::INTERNAL_SERVER_ERROR
                | StatusCode::BAD_GATEWAY
                | StatusCode::SERVICE_UNAVAILABLE
                | StatusCode::GATEWAY_TIMEOUT
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn retryable_statuses() {
        for code in [429u16, 500, 502, 503, 504] {
            let status = StatusCode::from_u16(code).unwrap();
            assert!(CollectError::is_retryable_status(status), "{code}");
        }
    }

    #[test]
    fn non_retryable_statuses() {
        for code in [400u16, 401, 403, 404, 418] {
            let status = StatusCode::from_u16(code).unwrap();
            assert!(!CollectError::is_retryable_status(status), "{code}");
        }
    }
}
