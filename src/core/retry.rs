//! Retry policy with exponential backoff for transient Sleeper API failures.
//!
//! [`RetryPolicy`] configures the backoff curve and [`execute_with_retry`]
//! drives an async operation until it succeeds, fails with a non-retryable
//! [`SyncError`], or runs out of attempts.

use rand::Rng;
use std::future::Future;
use std::time::Duration;
use tokio::time::sleep;
use tracing::debug;

use crate::error::SyncError;

/// Configuration for retry behavior.
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    /// Maximum number of retry attempts (0 means no retries, just the initial attempt).
    pub max_retries: u32,
    /// Initial delay before the first retry, in milliseconds.
    pub initial_delay_ms: u64,
    /// Maximum delay cap, in milliseconds.
    pub max_delay_ms: u64,
    /// Multiplier for exponential backoff.
    pub backoff_multiplier: f64,
    /// Jitter factor (0.0-1.0) to randomize delays.
    pub jitter_factor: f64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_delay_ms: 500,
            max_delay_ms: 30_000,
            backoff_multiplier: 2.0,
            jitter_factor: 0.1,
        }
    }
}

impl RetryPolicy {
    #[must_use]
    pub fn new(
        max_retries: u32,
        initial_delay_ms: u64,
        max_delay_ms: u64,
        backoff_multiplier: f64,
        jitter_factor: f64,
    ) -> Self {
        Self {
            max_retries,
            initial_delay_ms,
            max_delay_ms,
            backoff_multiplier,
            jitter_factor: jitter_factor.clamp(0.0, 1.0),
        }
    }

    /// Creates a policy with no retries (fail fast).
    #[must_use]
    pub fn no_retry() -> Self {
        Self {
            max_retries: 0,
            ..Default::default()
        }
    }

    /// Calculates the delay for a given attempt number (0-indexed).
    ///
    /// `min(initial_delay * (multiplier ^ attempt), max_delay)`
    #[must_use]
    pub fn calculate_delay(&self, attempt: u32) -> Duration {
        let base_delay =
            self.initial_delay_ms as f64 * self.backoff_multiplier.powi(attempt as i32);
        let capped_delay = base_delay.min(self.max_delay_ms as f64);
        Duration::from_millis(capped_delay as u64)
    }

    /// Calculates the delay with jitter applied: `delay * (1 - jitter_factor * random())`.
    #[must_use]
    pub fn calculate_delay_with_jitter(&self, attempt: u32) -> Duration {
        let base_delay = self.calculate_delay(attempt);
        if self.jitter_factor <= 0.0 {
            return base_delay;
        }

        let jitter: f64 = rand::rng().random();
        let jitter_multiplier = 1.0 - (self.jitter_factor * jitter);
        let jittered_ms = base_delay.as_millis() as f64 * jitter_multiplier;
        Duration::from_millis(jittered_ms.max(1.0) as u64)
    }

    /// Delay before retrying after `error` on the given attempt (0-indexed).
    ///
    /// A server `Retry-After` hint wins over the computed backoff when it is
    /// longer, but never beyond `max_delay_ms`.
    #[must_use]
    pub fn delay_for(&self, error: &SyncError, attempt: u32) -> Duration {
        let backoff = self.calculate_delay_with_jitter(attempt);
        match error.retry_after() {
            Some(hint) => hint.min(Duration::from_millis(self.max_delay_ms)).max(backoff),
            None => backoff,
        }
    }

    /// Returns true if more retries are allowed for the given attempt count.
    #[must_use]
    pub fn should_retry(&self, attempts_made: u32) -> bool {
        attempts_made <= self.max_retries
    }
}

/// Run `operation` until it succeeds or the policy gives up.
///
/// Returns the last error together with the number of attempts made. See
/// [`RetryPolicy::delay_for`] for how the wait between attempts is chosen.
pub async fn execute_with_retry<F, Fut, T>(
    policy: &RetryPolicy,
    mut operation: F,
) -> Result<T, (SyncError, u32)>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, SyncError>>,
{
    let mut attempts = 0u32;

    loop {
        attempts = attempts.saturating_add(1);

        match operation().await {
            Ok(result) => return Ok(result),
            Err(error) => {
                if !error.is_retryable() || !policy.should_retry(attempts) {
                    return Err((error, attempts));
                }

                let delay = policy.delay_for(&error, attempts.saturating_sub(1));
                debug!(attempt = attempts, delay_ms = delay.as_millis() as u64, %error, "retrying");
                sleep(delay).await;
            }
        }
    }
}
