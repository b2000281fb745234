use crate::utils::error::Result;
use std::future::Future;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Backoff {
    #[default]
    None,
}

/// Retry settings applied to each workflow step; step bodies never retry themselves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub delay: Duration,
    pub backoff: Backoff,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 4,
            delay: Duration::from_secs(60),
            backoff: Backoff::None,
        }
    }
}

impl RetryPolicy {
    pub fn new(retries: u32, delay: Duration) -> Self {
        Self {
            max_attempts: retries + 1,
            delay,
            backoff: Backoff::None,
        }
    }

    /// One attempt, no retry.
    pub fn single_attempt() -> Self {
        Self {
            max_attempts: 1,
            delay: Duration::ZERO,
            backoff: Backoff::None,
        }
    }

    pub fn delay_for(&self, _attempt: u32) -> Duration {
        match self.backoff {
            Backoff::None => self.delay,
        }
    }
}

/// 依重試策略執行，用盡後記錄告警並回傳最後一個錯誤
pub async fn run_with_retry<T, F, Fut>(policy: &RetryPolicy, label: &str, mut task: F) -> Result<T>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let max_attempts = policy.max_attempts.max(1);
    let mut attempt = 1;

    loop {
        match task(attempt).await {
            Ok(value) => {
                if attempt > 1 {
                    tracing::info!("🔁 {} succeeded on attempt {}", label, attempt);
                }
                return Ok(value);
            }
            Err(e) if e.is_retryable() && attempt < max_attempts => {
                let delay = policy.delay_for(attempt);
                tracing::warn!(
                    "⚠️ {} attempt {}/{} failed: {} (retrying in {:?})",
                    label,
                    attempt,
                    max_attempts,
                    e,
                    delay
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
            Err(e) => {
                tracing::error!(
                    category = ?e.category(),
                    severity = ?e.severity(),
                    "🚨 ALERT: {} failed after {} attempt(s): {}",
                    label,
                    attempt,
                    e
                );
                tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());
                return Err(e);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::error::WorkflowError;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn fast_policy(retries: u32) -> RetryPolicy {
        RetryPolicy::new(retries, Duration::from_millis(1))
    }

    #[tokio::test]
    async fn test_retries_until_success() {
        let calls = AtomicU32::new(0);
        let result = run_with_retry(&fast_policy(3), "scrape", |attempt| {
            calls.fetch_add(1, Ordering::SeqCst);
            async move {
                if attempt < 3 {
                    Err(WorkflowError::transport("timeout"))
                } else {
                    Ok(attempt)
                }
            }
        })
        .await;

        assert_eq!(result.unwrap(), 3);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_gives_up_after_max_attempts() {
        let calls = AtomicU32::new(0);
        let result: Result<()> = run_with_retry(&fast_policy(3), "scrape", |_| {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err(WorkflowError::transport("request timed out after 120s")) }
        })
        .await;

        assert!(matches!(result, Err(WorkflowError::TransportError { .. })));
        assert_eq!(calls.load(Ordering::SeqCst), 4);
    }

    #[tokio::test]
    async fn test_configuration_errors_are_not_retried() {
        let calls = AtomicU32::new(0);
        let result: Result<()> = run_with_retry(&fast_policy(3), "scrape", |_| {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err(WorkflowError::config("no endpoint")) }
        })
        .await;

        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_fixed_delay_between_attempts() {
        let policy = RetryPolicy::new(2, Duration::from_secs(60));
        let started = tokio::time::Instant::now();

        let result: Result<()> = run_with_retry(&policy, "scrape", |_| async {
            Err(WorkflowError::transport("down"))
        })
        .await;

        assert!(result.is_err());
        let elapsed = started.elapsed();
        assert!(elapsed >= Duration::from_secs(120));
        assert!(elapsed < Duration::from_secs(121));
    }

    #[test]
    fn test_default_policy() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.max_attempts, 4);
        assert_eq!(policy.delay, Duration::from_secs(60));
        assert_eq!(policy.backoff, Backoff::None);
        assert_eq!(policy.delay_for(3), Duration::from_secs(60));
    }

    #[tokio::test]
    async fn test_single_attempt_never_retries() {
        let calls = AtomicU32::new(0);
        let result: Result<()> = run_with_retry(&RetryPolicy::single_attempt(), "scrape", |_| {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err(WorkflowError::transport("down")) }
        })
        .await;

        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
