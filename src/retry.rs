// ABOUTME: Explicit retry policy with exponential backoff and jitter
// ABOUTME: Generic retry helper that only retries errors classified transient
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Adbridge Contributors

use crate::config::RetryConfig;
use crate::errors::{AppError, AppResult};
use rand::Rng;
use std::future::Future;
use std::time::Duration;
use tokio::time::sleep;
use tracing::warn;

/// Retry policy for transient provider failures
///
/// Backoff math lives here, separate from any network code, so it can be
/// tested in isolation. With jitter disabled the delay sequence is exact:
/// `base_delay_ms * 2^attempt`, capped at `max_delay_ms`.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    /// Maximum attempts, first try included
    pub max_attempts: u32,
    /// Base delay in milliseconds
    pub base_delay_ms: u64,
    /// Ceiling on a single delay in milliseconds
    pub max_delay_ms: u64,
    /// Whether to scale delays by a random factor in [0.5, 1.0)
    pub use_jitter: bool,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: crate::constants::retries::DEFAULT_MAX_ATTEMPTS,
            base_delay_ms: crate::constants::retries::DEFAULT_BASE_DELAY_MS,
            max_delay_ms: crate::constants::retries::DEFAULT_MAX_DELAY_MS,
            use_jitter: true,
        }
    }
}

impl From<RetryConfig> for RetryPolicy {
    fn from(config: RetryConfig) -> Self {
        Self {
            max_attempts: config.max_attempts,
            base_delay_ms: config.base_delay_ms,
            max_delay_ms: config.max_delay_ms,
            use_jitter: true,
        }
    }
}

impl RetryPolicy {
    /// Policy that never retries
    #[must_use]
    pub const fn no_retry() -> Self {
        Self {
            max_attempts: 1,
            base_delay_ms: 0,
            max_delay_ms: 0,
            use_jitter: false,
        }
    }

    /// Delay before retrying after the given 0-indexed failed attempt
    ///
    /// The jittered delay is `base * 2^attempt * (0.5 + random(0, 0.5))`, so
    /// it is always bounded above by the undithered exponential value.
    #[must_use]
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let exponential = self
            .base_delay_ms
            .saturating_mul(2_u64.saturating_pow(attempt));
        let capped = exponential.min(self.max_delay_ms);

        if self.use_jitter {
            let factor: f64 = 0.5 + rand::thread_rng().gen_range(0.0..0.5);
            Duration::from_millis((capped as f64 * factor) as u64)
        } else {
            Duration::from_millis(capped)
        }
    }

    /// Whether another attempt is allowed after the given 0-indexed attempt
    #[must_use]
    pub const fn should_retry(&self, attempt: u32) -> bool {
        attempt + 1 < self.max_attempts
    }
}

/// Run an operation under a retry policy
///
/// Only errors for which [`AppError::is_transient`] holds are retried; any
/// other error propagates on first occurrence. When the attempt budget is
/// spent the last transient error is wrapped in
/// [`AppError::RetriesExhausted`].
///
/// # Errors
///
/// Returns the first non-transient error, or `RetriesExhausted` wrapping the
/// last transient one.
pub async fn retry_with_policy<T, F, Fut>(
    policy: RetryPolicy,
    operation_name: &str,
    mut operation: F,
) -> AppResult<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = AppResult<T>>,
{
    let mut attempt = 0_u32;
    loop {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(err) if err.is_transient() && policy.should_retry(attempt) => {
                let delay = policy.delay_for_attempt(attempt);
                warn!(
                    operation = operation_name,
                    attempt = attempt + 1,
                    delay_ms = delay.as_millis() as u64,
                    error = %err,
                    "Transient provider failure, backing off before retry"
                );
                sleep(delay).await;
                attempt += 1;
            }
            Err(err) if err.is_transient() => {
                return Err(AppError::RetriesExhausted {
                    attempts: attempt + 1,
                    source: Box::new(err),
                });
            }
            Err(err) => return Err(err),
        }
    }
}
