//! Bounded exponential backoff, shared by the embedding, chat, and vector
//! store clients. Generalizes the doubling-with-cap reconnect loop from the
//! teacher's Signal daemon into a small reusable wrapper.

use std::future::Future;
use std::time::Duration;

#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub max_attempts: usize,
    pub base_delay: Duration,
    pub max_delay: Duration,
}

impl RetryPolicy {
    pub const fn new(max_attempts: usize, base_delay: Duration, max_delay: Duration) -> Self {
        Self {
            max_attempts,
            base_delay,
            max_delay,
        }
    }
}

impl Default for RetryPolicy {
    /// Three retries, matching the StoreError/EmbedError/ChatError policy in
    /// spec section 7.
    fn default() -> Self {
        Self::new(3, Duration::from_millis(250), Duration::from_secs(8))
    }
}

/// Retry `f` up to `policy.max_attempts` times with doubling backoff,
/// capped at `policy.max_delay`. `should_retry` decides whether a given
/// error is transient; non-transient errors return immediately.
pub async fn retry_with_backoff<T, E, F, Fut>(
    policy: RetryPolicy,
    mut should_retry: impl FnMut(&E) -> bool,
    mut f: F,
) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    let mut backoff = policy.base_delay;
    let mut last_err = None;

    for attempt in 0..policy.max_attempts {
        match f().await {
            Ok(value) => return Ok(value),
            Err(e) => {
                let retryable = should_retry(&e);
                last_err = Some(e);
                if !retryable || attempt + 1 == policy.max_attempts {
                    break;
                }
                tracing::warn!(
                    attempt = attempt + 1,
                    max_attempts = policy.max_attempts,
                    delay_ms = backoff.as_millis() as u64,
                    "retrying after transient error"
                );
                tokio::time::sleep(backoff).await;
                backoff = (backoff * 2).min(policy.max_delay);
            }
        }
    }

    Err(last_err.expect("loop ran at least once"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[tokio::test]
    async fn succeeds_after_transient_failures() {
        let attempts = AtomicUsize::new(0);
        let policy = RetryPolicy::new(5, Duration::from_millis(1), Duration::from_millis(5));

        let result: Result<&str, &str> = retry_with_backoff(
            policy,
            |_e: &&str| true,
            || {
                let n = attempts.fetch_add(1, Ordering::SeqCst);
                async move {
                    if n < 2 {
                        Err("transient")
                    } else {
                        Ok("ok")
                    }
                }
            },
        )
        .await;

        assert_eq!(result, Ok("ok"));
        assert_eq!(attempts.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn gives_up_on_non_transient_errors() {
        let attempts = AtomicUsize::new(0);
        let policy = RetryPolicy::new(5, Duration::from_millis(1), Duration::from_millis(5));

        let result: Result<&str, &str> = retry_with_backoff(
            policy,
            |_e: &&str| false,
            || {
                attempts.fetch_add(1, Ordering::SeqCst);
                async { Err("fatal") }
            },
        )
        .await;

        assert_eq!(result, Err("fatal"));
        assert_eq!(attempts.load(Ordering::SeqCst), 1);
    }
}
