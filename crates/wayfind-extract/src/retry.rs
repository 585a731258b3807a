//! Retry with exponential back-off for calls to the model service.
//!
//! [`retry_with_backoff`] wraps any fallible async operation and re-invokes it
//! only when the error is classified as transient (see [`Transient`]).
//! Permanent failures such as bad credentials or malformed requests are
//! returned on the first attempt. After the last attempt the final error is
//! returned unchanged so callers can still inspect its status.
//!
//! Delays go through the [`Sleep`] trait so tests can record them instead of
//! waiting. Dropping the returned future abandons any pending delay.

use std::fmt::Display;
use std::future::Future;
use std::time::Duration;

use wayfind_core::AppConfig;

use crate::error::GenerateError;

/// Upper bound for a single back-off delay.
const MAX_DELAY: Duration = Duration::from_secs(60);

/// Classifies an error as worth retrying.
pub trait Transient {
    fn is_transient(&self) -> bool;
}

impl Transient for GenerateError {
    /// **Retriable:**
    /// - network timeouts and connection failures,
    /// - HTTP 500 / 503 surfaced by `reqwest`,
    /// - API errors whose status or message marks an overload or internal error.
    ///
    /// **Not retriable:** malformed envelopes, empty responses, bad base URLs,
    /// and every other API error (401, 403, 400, 429 quota, …).
    fn is_transient(&self) -> bool {
        match self {
            GenerateError::Http(e) => {
                e.is_timeout()
                    || e.is_connect()
                    || e
                        .status()
                        .is_some_and(|s| s.as_u16() == 500 || s.as_u16() == 503)
            }
            GenerateError::Api(upstream) => upstream.is_transient(),
            GenerateError::Deserialize { .. }
            | GenerateError::EmptyResponse
            | GenerateError::InvalidBaseUrl { .. } => false,
        }
    }
}

/// Source of back-off delays.
pub trait Sleep {
    fn sleep(&self, duration: Duration) -> impl Future<Output = ()> + Send;
}

/// Real delays on the tokio timer.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioSleep;

impl Sleep for TokioSleep {
    fn sleep(&self, duration: Duration) -> impl Future<Output = ()> + Send {
        tokio::time::sleep(duration)
    }
}

/// How many times to call and how long to wait in between.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts including the first. `0` behaves like `1`.
    pub max_attempts: u32,
    /// Delay before the second attempt; doubles after each further failure.
    pub initial_delay: Duration,
    /// Apply ±25 % random jitter to each delay.
    pub jitter: bool,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(3, Duration::from_secs(1))
    }
}

impl RetryPolicy {
    #[must_use]
    pub fn new(max_attempts: u32, initial_delay: Duration) -> Self {
        Self {
            max_attempts,
            initial_delay,
            jitter: false,
        }
    }

    #[must_use]
    pub fn with_jitter(mut self, jitter: bool) -> Self {
        self.jitter = jitter;
        self
    }

    #[must_use]
    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(
            config.retry_max_attempts,
            Duration::from_millis(config.retry_initial_delay_ms),
        )
        .with_jitter(config.retry_jitter)
    }

    /// Delay after the `failed_attempts`-th failure (1-based).
    ///
    /// | Failure | Delay                      |
    /// |---------|----------------------------|
    /// | 1       | `initial_delay` × 2⁰       |
    /// | 2       | `initial_delay` × 2¹       |
    /// | 3       | `initial_delay` × 2²       |
    ///
    /// Capped at 60 s before jitter.
    #[must_use]
    pub fn delay_after(&self, failed_attempts: u32) -> Duration {
        let exponent = failed_attempts.saturating_sub(1).min(20);
        let capped = self
            .initial_delay
            .saturating_mul(1u32 << exponent)
            .min(MAX_DELAY);
        if self.jitter {
            capped.mul_f64(rand::random::<f64>() * 0.5 + 0.75)
        } else {
            capped
        }
    }
}

/// Runs `operation` until it succeeds, fails permanently, or runs out of attempts.
///
/// # Errors
///
/// Returns the operation's own error: immediately when it is not transient,
/// otherwise the last one once `policy.max_attempts` calls have failed.
pub async fn retry_with_backoff<T, E, F, Fut, S>(
    policy: &RetryPolicy,
    sleeper: &S,
    mut operation: F,
) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Transient + Display,
    S: Sleep,
{
    let max_attempts = policy.max_attempts.max(1);
    let mut attempt = 1u32;
    loop {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(err) => {
                if !err.is_transient() || attempt >= max_attempts {
                    return Err(err);
                }
                let delay = policy.delay_after(attempt);
                tracing::warn!(
                    attempt,
                    max_attempts,
                    delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                    error = %err,
                    "transient model error, retrying after back-off"
                );
                sleeper.sleep(delay).await;
                attempt += 1;
            }
        }
    }
}

/// [`retry_with_backoff`] with real delays and no jitter.
///
/// # Errors
///
/// Same as [`retry_with_backoff`].
pub async fn with_retry<T, E, F, Fut>(
    operation: F,
    max_attempts: u32,
    initial_delay_ms: u64,
) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Transient + Display,
{
    let policy = RetryPolicy::new(max_attempts, Duration::from_millis(initial_delay_ms));
    retry_with_backoff(&policy, &TokioSleep, operation).await
}

#[cfg(test)]
#[path = "retry_test.rs"]
mod tests;
