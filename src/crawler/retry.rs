//! Bounded retry with exponential backoff and a one-shot `www.` host toggle

use crate::config::RetryConfig;
use crate::crawler::fetcher::{FetchError, FetchResponse, Fetcher};
use crate::url::toggle_www;
use std::time::Duration;

/// How many times, and how patiently, a URL is fetched
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Attempts on the original URL, including the first
    pub max_attempts: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
    /// Try the `www.`-toggled host once after a timeout or DNS failure
    pub toggle_www: bool,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from(&RetryConfig::default())
    }
}

impl From<&RetryConfig> for RetryPolicy {
    fn from(config: &RetryConfig) -> Self {
        Self {
            max_attempts: config.max_attempts.max(1),
            base_delay: Duration::from_millis(config.base_delay_ms),
            max_delay: Duration::from_millis(config.max_delay_ms),
            toggle_www: config.toggle_www,
        }
    }
}

impl RetryPolicy {
    /// Wait after failed attempt number `attempt` (1-based)
    ///
    /// `base_delay * 2^(attempt-1)`, capped at `max_delay`.
    ///
    /// # Examples
    ///
    /// ```
    /// use linkscout::RetryPolicy;
    /// use std::time::Duration;
    ///
    /// let policy = RetryPolicy {
    ///     max_attempts: 5,
    ///     base_delay: Duration::from_millis(100),
    ///     max_delay: Duration::from_millis(350),
    ///     toggle_www: false,
    /// };
    /// assert_eq!(policy.delay_for(1), Duration::from_millis(100));
    /// assert_eq!(policy.delay_for(2), Duration::from_millis(200));
    /// assert_eq!(policy.delay_for(3), Duration::from_millis(350));
    /// ```
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let factor = 2u32.saturating_pow(attempt.saturating_sub(1));
        self.base_delay.saturating_mul(factor).min(self.max_delay)
    }

    /// Fetches `url`, retrying transient failures
    ///
    /// # Behavior
    ///
    /// 1. Attempt the URL as given
    /// 2. On a timeout or DNS failure, try the `www.`-toggled URL once per
    ///    call; this attempt does not count against `max_attempts`
    /// 3. On a transient failure, sleep for [`delay_for`](Self::delay_for)
    ///    and try the original URL again, up to `max_attempts`
    /// 4. Permanent failures return immediately
    ///
    /// # Returns
    ///
    /// * `Ok(FetchResponse)` - Some attempt succeeded
    /// * `Err(FetchError)` - The last error observed on the original URL
    pub async fn fetch_with_retry(
        &self,
        fetcher: &dyn Fetcher,
        url: &str,
    ) -> Result<FetchResponse, FetchError> {
        let mut attempt = 1;
        let mut variant_tried = false;

        loop {
            let err = match fetcher.fetch(url).await {
                Ok(response) => return Ok(response),
                Err(err) => err,
            };

            if self.toggle_www && !variant_tried && err.suggests_host_variant() {
                variant_tried = true;
                if let Some(variant) = toggle_www(url) {
                    tracing::warn!("{} for {}, trying {}", err.kind, url, variant);
                    match fetcher.fetch(&variant).await {
                        Ok(response) => return Ok(response),
                        Err(variant_err) => {
                            tracing::debug!("Host variant failed: {}", variant_err);
                        }
                    }
                }
            }

            if !err.is_transient() || attempt >= self.max_attempts {
                return Err(err);
            }

            let delay = self.delay_for(attempt);
            tracing::debug!(
                "Attempt {}/{} for {} failed ({}), retrying in {:?}",
                attempt,
                self.max_attempts,
                url,
                err.kind,
                delay
            );
            tokio::time::sleep(delay).await;
            attempt += 1;
        }
    }
}
