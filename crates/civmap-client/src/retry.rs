//! Retry with exponential back-off and jitter for a single relay endpoint.
//!
//! The relay already falls through to the next endpoint on failure, so
//! retries are off by default (`CIVMAP_MAX_RETRIES=0`) and only apply to
//! transient errors.

use std::future::Future;
use std::time::Duration;

use crate::error::ClientError;

/// Returns `true` for errors that are worth retrying after a back-off delay:
/// timeouts, connection failures, and 5xx statuses. Everything else is
/// returned immediately.
pub(crate) fn is_retriable(err: &ClientError) -> bool {
    match err {
        ClientError::Http(e) => {
            e.is_timeout() || e.is_connect() || e.status().is_some_and(|s| s.is_server_error())
        }
        ClientError::UnexpectedStatus { status, .. } => (500..600).contains(status),
        ClientError::InvalidBaseUrl { .. }
        | ClientError::Relay { .. }
        | ClientError::Normalization { .. }
        | ClientError::AllEndpointsFailed { .. } => false,
    }
}

/// Upper bound on a single back-off sleep.
const MAX_DELAY: Duration = Duration::from_secs(30);

/// Sleep before retry number `retry` (1-based): `backoff_base_ms` doubled per
/// earlier retry, capped at [`MAX_DELAY`], then scaled by `jitter` (expected
/// in `0.75..1.25`).
pub(crate) fn backoff_delay(retry: u32, backoff_base_ms: u64, jitter: f64) -> Duration {
    let doubled = backoff_base_ms.saturating_mul(1u64 << retry.saturating_sub(1).min(10));
    Duration::from_millis(doubled)
        .min(MAX_DELAY)
        .mul_f64(jitter.max(0.0))
}

/// Calls `request` against one relay endpoint, retrying transient failures up
/// to `max_retries` times before the relay moves on to the next endpoint.
/// Non-transient failures are returned at once so fallback is not delayed.
pub(crate) async fn retry_with_backoff<T, F, Fut>(
    endpoint: &str,
    max_retries: u32,
    backoff_base_ms: u64,
    mut request: F,
) -> Result<T, ClientError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, ClientError>>,
{
    let mut retries = 0u32;
    loop {
        let err = match request().await {
            Ok(value) => {
                if retries > 0 {
                    tracing::info!(endpoint, retries, "endpoint recovered after retry");
                }
                return Ok(value);
            }
            Err(err) => err,
        };

        if !is_retriable(&err) {
            return Err(err);
        }
        if retries >= max_retries {
            if max_retries > 0 {
                tracing::warn!(endpoint, retries, error = %err, "endpoint retries exhausted");
            }
            return Err(err);
        }

        retries += 1;
        let delay = backoff_delay(retries, backoff_base_ms, 0.75 + rand::random::<f64>() * 0.5);
        tracing::warn!(
            endpoint,
            retry = retries,
            max_retries,
            delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
            error = %err,
            "transient endpoint error, retrying same endpoint"
        );
        tokio::time::sleep(delay).await;
    }
}
