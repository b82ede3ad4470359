use std::future::Future;
use std::time::Duration;

use rand::Rng;

use super::client::Result;

/// Exponential backoff for the login and registration calls.
///
/// The delay before retry `n` (0-based) is `base_delay * 2^n` plus uniform
/// jitter in `[0, max_jitter)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BackoffPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
    pub max_jitter: Duration,
}

impl Default for BackoffPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_millis(1000),
            max_jitter: Duration::from_millis(1000),
        }
    }
}

impl BackoffPolicy {
    pub fn new(max_attempts: u32, base_delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            base_delay,
            ..Self::default()
        }
    }

    /// Delay before retrying after failed attempt `attempt`, given a jitter fraction in `[0, 1)`.
    pub fn delay_for(&self, attempt: u32, jitter: f64) -> Duration {
        let factor = 1u32.checked_shl(attempt.min(16)).unwrap_or(u32::MAX);
        self.base_delay.saturating_mul(factor) + self.max_jitter.mul_f64(jitter.clamp(0.0, 1.0))
    }
}

/// Run `op` until it succeeds, fails with a non-retryable error, or attempts run out.
pub async fn with_backoff<T, F, Fut>(policy: BackoffPolicy, mut op: F) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let mut attempt = 0;
    loop {
        match op().await {
            Ok(v) => return Ok(v),
            Err(e) if e.is_retryable() && attempt + 1 < policy.max_attempts => {
                let delay = policy.delay_for(attempt, rand::rng().random::<f64>());
                tracing::debug!(
                    error = %e,
                    retry = attempt + 1,
                    delay_ms = delay.as_millis() as u64,
                    "Retrying after transport error"
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
            Err(e) => {
                if e.is_retryable() {
                    tracing::warn!(error = %e, attempts = attempt + 1, "Giving up after retries");
                }
                return Err(e);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::ApiError;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[test]
    fn test_delay_doubles_per_attempt() {
        let p = BackoffPolicy::default();
        assert_eq!(p.delay_for(0, 0.0), Duration::from_millis(1000));
        assert_eq!(p.delay_for(1, 0.0), Duration::from_millis(2000));
        assert_eq!(p.delay_for(2, 0.5), Duration::from_millis(4500));
    }

    #[test]
    fn test_new_keeps_at_least_one_attempt() {
        assert_eq!(BackoffPolicy::new(0, Duration::ZERO).max_attempts, 1);
    }

    #[tokio::test]
    async fn test_status_errors_are_not_retried() {
        let calls = AtomicU32::new(0);
        let result: Result<()> = with_backoff(BackoffPolicy::default(), || {
            calls.fetch_add(1, Ordering::SeqCst);
            async {
                Err(ApiError::Status {
                    status: 500,
                    message: "boom".into(),
                })
            }
        })
        .await;
        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_transport_errors_retry_until_attempts_run_out() {
        let calls = AtomicU32::new(0);
        let http = reqwest::Client::new();
        let result: Result<()> = with_backoff(BackoffPolicy::default(), || {
            calls.fetch_add(1, Ordering::SeqCst);
            let request = http.get("http://127.0.0.1:9/api/login");
            async move { request.send().await.map(|_| ()).map_err(ApiError::from) }
        })
        .await;
        assert!(matches!(result, Err(ApiError::Network(_))));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_success_returns_immediately() {
        let calls = AtomicU32::new(0);
        let result = with_backoff(BackoffPolicy::default(), || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Ok::<_, ApiError>(42) }
        })
        .await;
        assert_eq!(result.unwrap(), 42);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
