use std::future::Future;
use std::time::Duration;

use tracing::{debug, warn};

use super::source::LoadFailure;

/// Retry schedule for dataset loads. Only retryable failures (transport
/// errors) are retried; backend errors surface immediately.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 2,
            base_delay: Duration::from_millis(200),
        }
    }
}

impl RetryPolicy {
    pub const fn none() -> Self {
        Self {
            max_retries: 0,
            base_delay: Duration::ZERO,
        }
    }

    /// Delay before retry number `attempt` (1-based): `base * 2^(attempt-1)`.
    pub fn delay_for(&self, attempt: u32) -> Duration {
        if attempt == 0 {
            return Duration::ZERO;
        }
        let factor = 2u32.saturating_pow(attempt - 1);
        self.base_delay.saturating_mul(factor)
    }

    /// Run `operation` until it succeeds, fails with a non-retryable error,
    /// or the retry budget is spent. Returns the last failure.
    pub async fn run<F, Fut, T>(&self, mut operation: F) -> Result<T, LoadFailure>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, LoadFailure>>,
    {
        let mut attempt = 0;
        loop {
            if attempt > 0 {
                let delay = self.delay_for(attempt);
                debug!(attempt, ?delay, "retrying dataset load");
                tokio::time::sleep(delay).await;
            }

            match operation().await {
                Ok(value) => return Ok(value),
                Err(failure) if failure.is_retryable() && attempt < self.max_retries => {
                    warn!(attempt, error = %failure, "dataset load attempt failed");
                    attempt += 1;
                }
                Err(failure) => return Err(failure),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn quick(max_retries: u32) -> RetryPolicy {
        RetryPolicy {
            max_retries,
            base_delay: Duration::from_millis(1),
        }
    }

    #[test]
    fn delays_double_per_attempt() {
        let policy = RetryPolicy {
            max_retries: 3,
            base_delay: Duration::from_millis(100),
        };
        assert_eq!(policy.delay_for(0), Duration::ZERO);
        assert_eq!(policy.delay_for(1), Duration::from_millis(100));
        assert_eq!(policy.delay_for(2), Duration::from_millis(200));
        assert_eq!(policy.delay_for(3), Duration::from_millis(400));
    }

    #[tokio::test]
    async fn network_failures_are_retried_until_success() {
        let calls = AtomicU32::new(0);
        let result = quick(2)
            .run(|| {
                let call = calls.fetch_add(1, Ordering::SeqCst);
                async move {
                    if call < 2 {
                        Err(LoadFailure::Network("connection refused".to_string()))
                    } else {
                        Ok(call)
                    }
                }
            })
            .await;
        assert_eq!(result, Ok(2));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn retry_budget_is_bounded() {
        let calls = AtomicU32::new(0);
        let result: Result<(), _> = quick(1)
            .run(|| {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Err(LoadFailure::Network("timeout".to_string())) }
            })
            .await;
        assert_eq!(result, Err(LoadFailure::Network("timeout".to_string())));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn backend_failures_are_not_retried() {
        let calls = AtomicU32::new(0);
        let result: Result<(), _> = quick(5)
            .run(|| {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Err(LoadFailure::Backend("Invalid dataset".to_string())) }
            })
            .await;
        assert!(matches!(result, Err(LoadFailure::Backend(_))));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
