// Pacing for real network calls. Cache hits never reach this.

use std::time::Duration;

use tokio::time::Instant;
use tracing::debug;

/// Minimum spacing between consecutive real calls to the archive.
pub const DEFAULT_INTERVAL: Duration = Duration::from_millis(5000);

/// Spaces consecutive real fetches at least `interval` apart.
///
/// Owned by a single run and driven sequentially, so there is no locking:
/// the limiter paces calls, it does not arbitrate concurrent ones.
#[derive(Debug)]
pub struct RateLimiter {
    interval: Duration,
    last_call: Option<Instant>,
}

impl RateLimiter {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last_call: None,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Sleep until `interval` has passed since the previous real call, then
    /// mark now as the start of the next one. Call only right before a real
    /// network request.
    pub async fn await_turn(&mut self) {
        if let Some(last) = self.last_call {
            let ready_at = last + self.interval;
            let now = Instant::now();
            if now < ready_at {
                debug!(wait_ms = (ready_at - now).as_millis() as u64, "Throttling");
                tokio::time::sleep_until(ready_at).await;
            }
        }
        self.last_call = Some(Instant::now());
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new(DEFAULT_INTERVAL)
    }
}
