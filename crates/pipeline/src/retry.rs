use crate::config::RetryConfig;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{info, warn};

/// Exponential-backoff retry for the long-latency calls the driver owns
/// (the extraction model, store connects). The retried operations are
/// idempotent or side-effect-free, so repeating them is safe.
pub struct RetryPolicy {
    max_retries: usize,
    initial_backoff: Duration,
    max_backoff: Duration,
}

impl RetryPolicy {
    pub fn new(config: &RetryConfig) -> Self {
        Self {
            max_retries: config.max_retries,
            initial_backoff: Duration::from_millis(config.initial_backoff_ms),
            max_backoff: Duration::from_millis(config.max_backoff_ms),
        }
    }

    /// Never retries: for callers that want the policy seam without the
    /// repeats.
    pub fn none() -> Self {
        Self {
            max_retries: 0,
            initial_backoff: Duration::ZERO,
            max_backoff: Duration::ZERO,
        }
    }

    pub async fn run<F, Fut, T, E>(&self, operation: &str, mut f: F) -> Result<T, E>
    where
        F: FnMut() -> Fut,
        Fut: std::future::Future<Output = Result<T, E>>,
        E: std::fmt::Display,
    {
        let mut attempt = 0;
        let mut backoff = self.initial_backoff;

        loop {
            match f().await {
                Ok(result) => {
                    if attempt > 0 {
                        info!(operation, attempts = attempt + 1, "operation succeeded after retries");
                    }
                    return Ok(result);
                }
                Err(e) => {
                    attempt += 1;
                    if attempt > self.max_retries {
                        warn!(
                            operation,
                            attempts = attempt,
                            error = %e,
                            "operation failed after max retries"
                        );
                        return Err(e);
                    }

                    warn!(
                        operation,
                        attempt,
                        max_retries = self.max_retries,
                        backoff_ms = backoff.as_millis() as u64,
                        error = %e,
                        "operation failed, retrying"
                    );

                    sleep(backoff).await;
                    backoff = std::cmp::min(backoff * 2, self.max_backoff);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[tokio::test]
    async fn succeeds_after_transient_failures() {
        let policy = RetryPolicy::new(&RetryConfig {
            max_retries: 3,
            initial_backoff_ms: 1,
            max_backoff_ms: 2,
        });
        let calls = AtomicUsize::new(0);

        let result: Result<&str, String> = policy
            .run("flaky", || async {
                if calls.fetch_add(1, Ordering::SeqCst) < 2 {
                    Err("transient".to_string())
                } else {
                    Ok("done")
                }
            })
            .await;

        assert_eq!(result.unwrap(), "done");
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn gives_up_after_max_retries() {
        let policy = RetryPolicy::new(&RetryConfig {
            max_retries: 2,
            initial_backoff_ms: 1,
            max_backoff_ms: 2,
        });
        let calls = AtomicUsize::new(0);

        let result: Result<(), String> = policy
            .run("doomed", || async {
                calls.fetch_add(1, Ordering::SeqCst);
                Err("permanent".to_string())
            })
            .await;

        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn none_policy_tries_exactly_once() {
        let calls = AtomicUsize::new(0);
        let result: Result<(), String> = RetryPolicy::none()
            .run("single", || async {
                calls.fetch_add(1, Ordering::SeqCst);
                Err("nope".to_string())
            })
            .await;

        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
