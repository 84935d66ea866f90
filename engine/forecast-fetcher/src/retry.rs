//! Caller-side retry for forecast fetches

use std::future::Future;
use tokio::time::sleep;
use tracing::warn;

use crate::config::RetryConfig;
use crate::error::{FetchError, Result};

/// Run `f` until it succeeds, the error is not retryable, or attempts run out
pub async fn retry_with_backoff<F, Fut, T>(mut f: F, retry: &RetryConfig) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let attempts = retry.max_attempts.max(1);
    let mut delay = retry.initial_delay();
    let mut attempt = 1;

    loop {
        match f().await {
            Ok(value) => return Ok(value),
            Err(e) if attempt >= attempts || !e.is_retryable() => return Err(e),
            Err(e) => {
                warn!("Attempt {} failed: {}, retrying in {:?}", attempt, e, delay);
                sleep(delay).await;
                delay = retry.next_delay(delay);
                attempt += 1;
            }
        }
    }
}

/// Convenience for callers that already hold an error and want the user-facing text
pub fn describe(err: &FetchError) -> String {
    format!("{} ({})", err.user_message(), err)
}
