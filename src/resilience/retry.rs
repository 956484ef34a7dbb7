//! Exponential-backoff retry for rate-limited upstream calls.
//!
//! Only errors classified as rate limiting are retried; everything else
//! surfaces immediately so the breaker and fallback logic can react.
//! Classification is a case-insensitive substring match on the error
//! message ("429" / "rate limit"). That mirrors how the upstream SDKs
//! report throttling and is deliberately left as-is; the fallback path is
//! the safety net if the upstream message format drifts.

use crate::config::RetryConfig;
use crate::error::{InsightError, InsightResult};
use std::future::Future;
use tracing::{debug, warn};

/// Whether an error counts as upstream throttling
pub fn is_rate_limited(error: &InsightError) -> bool {
    let message = error.to_string().to_lowercase();
    message.contains("429") || message.contains("rate limit")
}

/// Run `operation`, retrying rate-limited failures once per schedule slot.
///
/// The delays in `config.schedule` are slept in order before each retry.
/// When the schedule is exhausted the last error is wrapped as
/// [`InsightError::RateLimited`] so callers can see the retries happened.
pub async fn retry_with_backoff<T, F, Fut>(config: &RetryConfig, mut operation: F) -> InsightResult<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = InsightResult<T>>,
{
    let mut last_error = match operation().await {
        Ok(value) => return Ok(value),
        Err(error) => error,
    };

    if !is_rate_limited(&last_error) {
        return Err(last_error);
    }

    for (attempt, delay) in config.schedule.iter().enumerate() {
        warn!(
            attempt = attempt + 1,
            delay_ms = delay.as_millis() as u64,
            error = %last_error,
            "⏳ Rate limited, backing off before retry"
        );
        tokio::time::sleep(*delay).await;

        match operation().await {
            Ok(value) => {
                debug!(attempt = attempt + 1, "Retry succeeded");
                return Ok(value);
            }
            Err(error) => {
                if !is_rate_limited(&error) {
                    return Err(error);
                }
                last_error = error;
            }
        }
    }

    Err(InsightError::RateLimited(format!(
        "retries exhausted after {} attempts: {last_error}",
        config.schedule.len() + 1
    )))
}
