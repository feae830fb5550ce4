//! Shared retry utilities for provider operations.
//!
//! Every network call made by the provider adapters (GitHub, GitLab,
//! Bitbucket) goes through [`with_retry`], so there is exactly one retry
//! policy point in the crate.

use std::future::Future;
use std::time::Duration;

use rand::Rng;

/// Configuration for retry operations.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Maximum number of retries after the initial attempt.
    pub max_retries: u32,
    /// Delay before the first retry; doubles each attempt.
    pub base_delay: Duration,
    /// Upper bound on the computed delay.
    pub max_delay: Duration,
    /// Whether to scale delays by a uniform random factor in `[0.5, 1.0]`.
    pub jitter: bool,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_delay: Duration::from_millis(1000),
            max_delay: Duration::from_millis(10_000),
            jitter: true,
        }
    }
}

impl RetryPolicy {
    /// Create a policy with custom values and jitter enabled.
    #[must_use]
    pub fn new(max_retries: u32, base_delay: Duration, max_delay: Duration) -> Self {
        Self {
            max_retries,
            base_delay,
            max_delay,
            jitter: true,
        }
    }

    /// Set whether to use jitter.
    #[must_use]
    pub fn with_jitter(mut self, jitter: bool) -> Self {
        self.jitter = jitter;
        self
    }

    /// Delay before the retry following failed attempt `attempt` (0-based).
    fn delay_for(&self, attempt: u32) -> Duration {
        let exponential = self
            .base_delay
            .saturating_mul(2u32.saturating_pow(attempt));
        let capped = exponential.min(self.max_delay);
        if self.jitter {
            capped.mul_f64(rand::thread_rng().gen_range(0.5..=1.0))
        } else {
            capped
        }
    }
}

/// Whether an error with the given HTTP status should be retried.
///
/// Server errors and 429 are transient; errors without a recognizable status
/// (connection resets, timeouts, truncated bodies) are retried too, failing
/// open toward availability.
#[must_use]
pub fn retryable_status(status: Option<u16>) -> bool {
    match status {
        Some(status) => status >= 500 || status == 429,
        None => true,
    }
}

/// Execute an operation, retrying failures that `should_retry` accepts.
///
/// The operation runs at most `1 + max_retries` times, strictly sequentially.
/// Between attempts the task sleeps for `min(base_delay * 2^attempt,
/// max_delay)`, jittered when the policy enables it. The last error is
/// propagated unchanged, never re-wrapped.
pub async fn with_retry<T, E, F, Fut, P>(
    policy: &RetryPolicy,
    mut operation: F,
    should_retry: P,
) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: std::fmt::Display,
    P: Fn(&E) -> bool,
{
    let mut attempt = 0u32;
    loop {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(err) => {
                if attempt >= policy.max_retries || !should_retry(&err) {
                    return Err(err);
                }
                let delay = policy.delay_for(attempt);
                tracing::debug!(
                    attempt = attempt + 1,
                    max_retries = policy.max_retries,
                    delay_ms = delay.as_millis() as u64,
                    error = %err,
                    "operation failed, backing off before retry"
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
        }
    }
}
