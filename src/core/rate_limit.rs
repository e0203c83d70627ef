//! Per-instance request rate limiting

use std::sync::{Mutex, PoisonError};
use std::time::Duration;
use tokio::time::Instant;
use tracing::debug;

/// Longest interval a limiter enforces: one request per day
pub const MAX_INTERVAL: Duration = Duration::from_secs(24 * 60 * 60);

/// Interval between requests at `requests_per_second`.
///
/// `None` when the rate is not a positive number or is slower than one
/// request per [`MAX_INTERVAL`].
pub fn interval_for(requests_per_second: f64) -> Option<Duration> {
    if !requests_per_second.is_finite() || requests_per_second <= 0.0 {
        return None;
    }
    Duration::try_from_secs_f64(1.0 / requests_per_second)
        .ok()
        .filter(|interval| *interval <= MAX_INTERVAL)
}

/// Enforces a minimum interval between requests made through one provider instance.
///
/// Each caller reserves the next free slot under the lock and then sleeps until
/// that slot outside of it, so concurrent callers queue up one interval apart
/// instead of racing on a stale last-request time.
#[derive(Debug)]
pub struct RateLimiter {
    min_interval: Duration,
    last_slot: Mutex<Option<Instant>>,
}

impl RateLimiter {
    /// Create a limiter allowing `requests_per_second` requests per second.
    ///
    /// Rates [`interval_for`] rejects are clamped to [`MAX_INTERVAL`];
    /// [`TranslationConfig::validate`] rejects them for configured providers.
    ///
    /// [`TranslationConfig::validate`]: crate::core::config::TranslationConfig::validate
    pub fn new(requests_per_second: f64) -> Self {
        Self {
            min_interval: interval_for(requests_per_second).unwrap_or(MAX_INTERVAL),
            last_slot: Mutex::new(None),
        }
    }

    /// Minimum time between two requests
    pub fn min_interval(&self) -> Duration {
        self.min_interval
    }

    /// Reserve the next slot and return how long to wait for it
    fn reserve(&self) -> Duration {
        let now = Instant::now();
        let mut last = self.last_slot.lock().unwrap_or_else(PoisonError::into_inner);
        let slot = match *last {
            Some(previous) => previous
                .checked_add(self.min_interval)
                .map_or(now, |next| next.max(now)),
            None => now,
        };
        *last = Some(slot);
        slot.saturating_duration_since(now)
    }

    /// Wait until a request may be issued, suspending the current task
    pub async fn acquire(&self) {
        let wait = self.reserve();
        if !wait.is_zero() {
            debug!("Rate limiting: waiting {:.2}s", wait.as_secs_f64());
            tokio::time::sleep(wait).await;
        }
    }

    /// Wait until a request may be issued, blocking the current thread
    pub fn acquire_blocking(&self) {
        let wait = self.reserve();
        if !wait.is_zero() {
            debug!("Rate limiting: waiting {:.2}s", wait.as_secs_f64());
            std::thread::sleep(wait);
        }
    }
}
