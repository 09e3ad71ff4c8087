//! Call spacing for the LLM scorer
//!
//! Free-tier model endpoints allow a fixed number of calls per minute. The
//! limiter keeps the time of the next free slot and makes callers wait until
//! it arrives, the same way domain state spaces page requests.

use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;

/// Spaces calls at a fixed minimum interval
#[derive(Debug)]
pub struct RateLimiter {
    interval: Duration,
    next_slot: Mutex<Option<Instant>>,
}

impl RateLimiter {
    /// Creates a limiter allowing `calls_per_minute` calls (at least one)
    pub fn per_minute(calls_per_minute: u32) -> Self {
        let calls = calls_per_minute.max(1);
        Self {
            interval: Duration::from_secs(60) / calls,
            next_slot: Mutex::new(None),
        }
    }

    /// Minimum spacing between two calls
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Waits until a call is allowed, then reserves the following slot
    pub async fn acquire(&self) {
        let mut next_slot = self.next_slot.lock().await;
        let now = Instant::now();

        let start = match *next_slot {
            Some(slot) if slot > now => {
                tracing::trace!("Scorer rate limit: waiting {:?}", slot - now);
                tokio::time::sleep_until(slot).await;
                slot
            }
            _ => now,
        };

        *next_slot = Some(start + self.interval);
    }
}
