//! Retry with exponential backoff for transient source failures.

use std::future::Future;
use std::time::Duration;

use tokio::time::sleep;

use crate::error::{SourceError, SourceResult};

// Transient-failure defaults: 3 total attempts, 200ms initial delay
// doubling each time, capped at 5s, with +/-50% jitter so synchronized
// callers do not retry in lockstep.
const DEFAULT_INITIAL_DELAY_MS: u64 = 200;
const DEFAULT_MAX_DELAY_SECS: u64 = 5;
const DEFAULT_MULTIPLIER: f64 = 2.0;

/// Backoff policy for retrying transient failures.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Total attempts (1 initial + retries).
    pub max_attempts: u32,
    /// Delay before the first retry.
    pub initial_delay: Duration,
    /// Cap on the delay between retries.
    pub max_delay: Duration,
    /// Backoff multiplier applied after each attempt.
    pub multiplier: f64,
    /// Whether to randomize delays.
    pub jitter: bool,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_delay: Duration::from_millis(DEFAULT_INITIAL_DELAY_MS),
            max_delay: Duration::from_secs(DEFAULT_MAX_DELAY_SECS),
            multiplier: DEFAULT_MULTIPLIER,
            jitter: true,
        }
    }
}

impl RetryPolicy {
    /// Creates a policy with the given attempt budget and the default
    /// delay curve.
    #[must_use]
    pub fn with_attempts(max_attempts: u32) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            ..Self::default()
        }
    }

    /// Returns the backoff that follows `delay`, capped at `max_delay`.
    #[must_use]
    pub fn next_delay(&self, delay: Duration) -> Duration {
        Duration::from_secs_f64(
            (delay.as_secs_f64() * self.multiplier).min(self.max_delay.as_secs_f64()),
        )
    }
}

/// Runs an operation, retrying while it fails with a retryable error.
///
/// Only [`SourceError::is_retryable`] failures are retried; a
/// `NotFound` or `Validation` error returns immediately.
///
/// ## Errors
///
/// Returns the last error once the attempt budget is exhausted.
pub async fn with_retry<T, F, Fut>(
    policy: &RetryPolicy,
    operation: &str,
    mut op: F,
) -> SourceResult<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = SourceResult<T>>,
{
    let mut attempts = 0;
    let mut delay = policy.initial_delay;

    loop {
        attempts += 1;

        match op().await {
            Ok(value) => {
                if attempts > 1 {
                    tracing::info!(operation, attempts, "succeeded after retry");
                }
                return Ok(value);
            }
            Err(err) => {
                if !err.is_retryable() || attempts >= policy.max_attempts {
                    if err.is_retryable() {
                        tracing::warn!(operation, attempts, error = %err, "giving up");
                    }
                    return Err(err);
                }

                let actual = if policy.jitter {
                    let factor = 0.5 + rand::random::<f64>(); // 0.5 to 1.5
                    Duration::from_secs_f64(delay.as_secs_f64() * factor)
                } else {
                    delay
                };

                tracing::debug!(
                    operation,
                    attempts,
                    error = %err,
                    delay_ms = actual.as_millis() as u64,
                    "retrying transient failure"
                );

                sleep(actual).await;
                delay = policy.next_delay(delay);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    use its_model::ItsId;

    use super::*;

    #[test]
    fn delay_curve_doubles_and_caps() {
        let policy = RetryPolicy::default();
        let d1 = policy.initial_delay;
        let d2 = policy.next_delay(d1);
        let d3 = policy.next_delay(d2);
        assert_eq!(d2, Duration::from_millis(400));
        assert_eq!(d3, Duration::from_millis(800));
        assert_eq!(policy.next_delay(Duration::from_secs(60)), policy.max_delay);
    }

    #[tokio::test(start_paused = true)]
    async fn retries_transient_failures_until_success() {
        let calls = Arc::new(AtomicU32::new(0));
        let counter = Arc::clone(&calls);

        let policy = RetryPolicy::with_attempts(5);
        let result = with_retry(&policy, "fetch", move || {
            let counter = Arc::clone(&counter);
            async move {
                if counter.fetch_add(1, Ordering::SeqCst) < 2 {
                    Err(SourceError::timeout("503"))
                } else {
                    Ok(42)
                }
            }
        })
        .await;

        assert_eq!(result.unwrap(), 42);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn exhausts_attempt_budget() {
        let calls = Arc::new(AtomicU32::new(0));
        let counter = Arc::clone(&calls);

        let policy = RetryPolicy::with_attempts(3);
        let result: SourceResult<()> = with_retry(&policy, "fetch", move || {
            let counter = Arc::clone(&counter);
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Err(SourceError::timeout("unreachable"))
            }
        })
        .await;

        assert!(matches!(result, Err(SourceError::Timeout(_))));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn never_retries_not_found() {
        let calls = Arc::new(AtomicU32::new(0));
        let counter = Arc::clone(&calls);
        let id = ItsId::new("12345678").unwrap();

        let policy = RetryPolicy::with_attempts(5);
        let result: SourceResult<()> = with_retry(&policy, "fetch", move || {
            let counter = Arc::clone(&counter);
            let id = id.clone();
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Err(SourceError::NotFound(id))
            }
        })
        .await;

        assert!(matches!(result, Err(SourceError::NotFound(_))));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
