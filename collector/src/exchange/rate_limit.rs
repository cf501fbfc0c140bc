//! Per-client request pacing

use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::{sleep_until, Instant};

/// Enforces a minimum interval between request completions on one client
/// instance.
///
/// A single mutex gates every request the owning client makes, across all of
/// its endpoints; waiters are released in FIFO order. This trades parallelism
/// for simplicity and keeps a client comfortably inside exchange bans.
/// `acquire` cannot fail, it can only delay.
#[derive(Debug)]
pub struct RateLimiter {
    interval: Duration,
    next_slot: Mutex<Option<Instant>>,
}

impl RateLimiter {
    /// Limiter allowing `rate` requests per second
    pub fn per_second(rate: f64) -> Self {
        debug_assert!(rate > 0.0);
        Self {
            interval: Duration::from_secs_f64(1.0 / rate),
            next_slot: Mutex::new(None),
        }
    }

    /// Suspends until the next request slot is available.
    ///
    /// No two `acquire` calls on the same instance complete less than
    /// `1/rate` seconds apart.
    pub async fn acquire(&self) {
        let mut next_slot = self.next_slot.lock().await;
        let now = Instant::now();
        if let Some(at) = *next_slot {
            if at > now {
                sleep_until(at).await;
            }
        }
        *next_slot = Some(Instant::now() + self.interval);
    }
}
