//! Bounded retry with exponential backoff, jitter and per-attempt timeouts
//! for calls against external services.
use derive_builder::Builder;
use log::*;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::{future::Future, time::Duration};

use crate::{Result, error::ReleaseScribeError};

/// Retry settings shared by every external call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Builder)]
#[builder(setter(into), default)]
#[serde(default)]
pub struct RetryPolicy {
    /// Total attempts including the first one.
    pub max_attempts: u32,
    /// Delay before the second attempt.
    pub initial_delay_ms: u64,
    /// Upper bound for the exponential part of the delay.
    pub max_delay_ms: u64,
    /// Upper bound for the random delay added to each backoff.
    pub jitter_ms: u64,
    /// Wall-clock limit for a single attempt.
    pub timeout_secs: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_delay_ms: 1_000,
            max_delay_ms: 8_000,
            jitter_ms: 250,
            timeout_secs: 60,
        }
    }
}

impl RetryPolicy {
    /// Backoff before the attempt following `attempt` (1-based), without
    /// jitter.
    pub fn base_delay(&self, attempt: u32) -> Duration {
        let factor = 2u64.saturating_pow(attempt.saturating_sub(1));
        let millis = self
            .initial_delay_ms
            .saturating_mul(factor)
            .min(self.max_delay_ms);
        Duration::from_millis(millis)
    }

    fn delay_with_jitter(&self, attempt: u32) -> Duration {
        let jitter = if self.jitter_ms == 0 {
            0
        } else {
            rand::thread_rng().gen_range(0..=self.jitter_ms)
        };
        self.base_delay(attempt) + Duration::from_millis(jitter)
    }

    /// Run `op` until it succeeds, fails with a non-transient error, or the
    /// attempts are exhausted. The last error is returned unchanged.
    pub async fn run<T, F, Fut>(&self, operation: &str, op: F) -> Result<T>
    where
        F: Fn() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let max_attempts = self.max_attempts.max(1);
        let timeout = Duration::from_secs(self.timeout_secs);
        let mut attempt = 1;

        loop {
            let result = match tokio::time::timeout(timeout, op()).await {
                Ok(result) => result,
                Err(_elapsed) => Err(ReleaseScribeError::Timeout {
                    operation: operation.to_string(),
                    secs: self.timeout_secs,
                }),
            };

            match result {
                Ok(value) => return Ok(value),
                Err(err) if err.is_transient() && attempt < max_attempts => {
                    let delay = self.delay_with_jitter(attempt);
                    warn!(
                        "{operation} failed (attempt {attempt}/{max_attempts}): {err}: retrying in {}ms",
                        delay.as_millis()
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(err) => {
                    if err.is_transient() {
                        error!(
                            "{operation} failed after {attempt} attempt(s): {err}"
                        );
                    }
                    return Err(err);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{
        Arc,
        atomic::{AtomicU32, Ordering},
    };

    use super::*;

    fn fast_policy(max_attempts: u32) -> RetryPolicy {
        RetryPolicyBuilder::default()
            .max_attempts(max_attempts)
            .initial_delay_ms(1u64)
            .max_delay_ms(4u64)
            .jitter_ms(0u64)
            .timeout_secs(5u64)
            .build()
            .unwrap()
    }

    #[test]
    fn backoff_grows_exponentially_and_caps() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.base_delay(1), Duration::from_millis(1_000));
        assert_eq!(policy.base_delay(2), Duration::from_millis(2_000));
        assert_eq!(policy.base_delay(3), Duration::from_millis(4_000));
        assert_eq!(policy.base_delay(4), Duration::from_millis(8_000));
        assert_eq!(policy.base_delay(10), Duration::from_millis(8_000));
    }

    #[tokio::test]
    async fn retries_transient_errors_until_success() {
        let calls = Arc::new(AtomicU32::new(0));
        let policy = fast_policy(3);

        let result = policy
            .run("flaky", || {
                let calls = Arc::clone(&calls);
                async move {
                    if calls.fetch_add(1, Ordering::SeqCst) < 2 {
                        Err(ReleaseScribeError::RateLimitExceeded)
                    } else {
                        Ok(42)
                    }
                }
            })
            .await
            .unwrap();

        assert_eq!(result, 42);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn reraises_final_transient_error_unchanged() {
        let calls = Arc::new(AtomicU32::new(0));
        let policy = fast_policy(3);

        let result: Result<()> = policy
            .run("always-busy", || {
                let calls = Arc::clone(&calls);
                async move {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Err(ReleaseScribeError::TransientApi("503".into()))
                }
            })
            .await;

        assert!(
            matches!(result, Err(ReleaseScribeError::TransientApi(msg)) if msg == "503")
        );
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn does_not_retry_permanent_errors() {
        let calls = Arc::new(AtomicU32::new(0));
        let policy = fast_policy(3);

        let result: Result<()> = policy
            .run("missing", || {
                let calls = Arc::clone(&calls);
                async move {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Err(ReleaseScribeError::not_found("release v9.9.9"))
                }
            })
            .await;

        assert!(matches!(result, Err(ReleaseScribeError::NotFound { .. })));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn attempts_time_out() {
        let policy = RetryPolicy {
            timeout_secs: 0,
            ..fast_policy(2)
        };

        let result: Result<()> = policy
            .run("slow", || async {
                tokio::time::sleep(Duration::from_millis(200)).await;
                Ok(())
            })
            .await;

        assert!(matches!(result, Err(ReleaseScribeError::Timeout { .. })));
    }
}
