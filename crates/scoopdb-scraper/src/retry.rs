//! Retry with exponential backoff for transient scrape failures.
//!
//! Only 429 responses and network-level failures are retried; 404s and
//! parse failures would return the same result and are propagated
//! immediately.

use std::future::Future;
use std::time::Duration;

use crate::error::ScrapeError;

fn is_retriable(err: &ScrapeError) -> bool {
    matches!(err, ScrapeError::RateLimited { .. } | ScrapeError::Http(_))
}

/// Executes `operation`, sleeping `backoff_base_secs * 2^attempt` seconds
/// between attempts on retriable errors, up to `max_retries` additional
/// attempts after the first try. The last error is returned when retries
/// are exhausted.
pub(crate) async fn retry_with_backoff<T, F, Fut>(
    max_retries: u32,
    backoff_base_secs: u64,
    mut operation: F,
) -> Result<T, ScrapeError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, ScrapeError>>,
{
    let mut attempt = 0u32;

    loop {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(err) => {
                if !is_retriable(&err) || attempt >= max_retries {
                    return Err(err);
                }

                // Cap the shift to avoid overflow on extreme configs.
                let delay_secs = backoff_base_secs.saturating_mul(1u64 << attempt.min(62));
                tracing::warn!(
                    attempt,
                    max_retries,
                    delay_secs,
                    error = %err,
                    "transient scrape error, retrying after backoff"
                );
                tokio::time::sleep(Duration::from_secs(delay_secs)).await;
                attempt += 1;
            }
        }
    }
}
