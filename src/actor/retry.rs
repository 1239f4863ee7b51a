//! Exponential-backoff retry for backend calls.

use std::future::Future;
use std::time::Duration;

/// Retry policy: how many retries are allowed and how the delay grows.
#[derive(Debug, Clone)]
pub struct RetryConfig {
    pub max_retries: u32,
    pub initial_delay: Duration,
    pub max_delay: Duration,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 2,
            initial_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(5),
        }
    }
}

impl RetryConfig {
    pub fn new(max_retries: u32, initial_delay: Duration, max_delay: Duration) -> Self {
        Self {
            max_retries,
            initial_delay,
            max_delay,
        }
    }
}

/// Run `operation` until it succeeds or the allowed retries are spent.
///
/// The delay doubles between attempts, capped at `max_delay`. Returns the
/// first success, or the last error once retries are exhausted.
pub async fn with_retry<F, Fut, T, E>(config: &RetryConfig, mut operation: F) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: std::fmt::Display,
{
    let mut attempts = 0;
    let mut delay = config.initial_delay;

    loop {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(e) => {
                attempts += 1;
                if attempts > config.max_retries {
                    return Err(e);
                }

                tracing::warn!(
                    "Attempt {}/{} failed: {}. Retrying in {:?}",
                    attempts,
                    config.max_retries + 1,
                    e,
                    delay
                );

                tokio::time::sleep(delay).await;
                delay = (delay * 2).min(config.max_delay);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    fn fast_config() -> RetryConfig {
        RetryConfig::new(2, Duration::from_millis(5), Duration::from_millis(20))
    }

    #[tokio::test]
    async fn first_success_short_circuits() {
        let calls = Cell::new(0u32);
        let result: Result<&str, &str> = with_retry(&fast_config(), || {
            calls.set(calls.get() + 1);
            async { Ok("done") }
        })
        .await;

        assert_eq!(result, Ok("done"));
        assert_eq!(calls.get(), 1);
    }

    #[tokio::test]
    async fn recovers_from_transient_failures() {
        let calls = Cell::new(0u32);
        let result: Result<u32, &str> = with_retry(&fast_config(), || {
            calls.set(calls.get() + 1);
            let n = calls.get();
            async move {
                if n < 3 { Err("unavailable") } else { Ok(n) }
            }
        })
        .await;

        assert_eq!(result, Ok(3));
    }

    #[tokio::test]
    async fn gives_up_once_retries_are_spent() {
        let calls = Cell::new(0u32);
        let result: Result<u32, &str> = with_retry(&fast_config(), || {
            calls.set(calls.get() + 1);
            async { Err("down") }
        })
        .await;

        assert_eq!(result, Err("down"));
        // One initial attempt plus two retries.
        assert_eq!(calls.get(), 3);
    }
}
