//! Retry with exponential back-off for record API requests.
//!
//! Transient failures (429, network errors, 5xx) are retried; everything
//! else is returned on the first attempt. A missing record in particular is
//! an answer, not a failure, and is never retried.

use std::future::Future;
use std::time::Duration;

use crate::error::ClientError;

const MAX_DELAY_SECS: u64 = 30;

/// Returns `true` if `err` is worth retrying after a back-off delay.
///
/// Retriable:
/// - [`ClientError::RateLimited`]: the API asked us to back off.
/// - [`ClientError::Http`]: timeout or connection failure.
/// - [`ClientError::Api`] / [`ClientError::UnexpectedStatus`] with a 5xx status.
pub(crate) fn is_retriable(err: &ClientError) -> bool {
    match err {
        ClientError::RateLimited { .. } => true,
        ClientError::Http(e) => {
            e.is_timeout() || e.is_connect() || e.status().is_some_and(|s| s.is_server_error())
        }
        ClientError::Api { status, .. } | ClientError::UnexpectedStatus { status, .. } => {
            *status >= 500
        }
        ClientError::NotFound { .. }
        | ClientError::Deserialize { .. }
        | ClientError::EmptyBody { .. }
        | ClientError::InvalidBaseUrl { .. } => false,
    }
}

/// Executes `operation`, retrying transient errors up to `max_retries`
/// additional times.
///
/// The wait before retry `n` is `backoff_base_secs * 2^(n-1)` seconds with
/// ±25 % jitter, capped at 30 s. With `backoff_base_secs = 0` retries are
/// immediate, which keeps tests fast.
pub(crate) async fn retry_with_backoff<T, F, Fut>(
    max_retries: u32,
    backoff_base_secs: u64,
    mut operation: F,
) -> Result<T, ClientError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, ClientError>>,
{
    let mut attempt = 0u32;

    loop {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(err) => {
                if !is_retriable(&err) || attempt >= max_retries {
                    return Err(err);
                }
                attempt += 1;

                let base_ms = backoff_base_secs
                    .saturating_mul(1u64 << (attempt - 1).min(10))
                    .min(MAX_DELAY_SECS)
                    .saturating_mul(1_000);
                #[allow(
                    clippy::cast_possible_truncation,
                    clippy::cast_sign_loss,
                    clippy::cast_precision_loss
                )]
                let delay_ms = (base_ms as f64 * (rand::random::<f64>() * 0.5 + 0.75)) as u64;

                tracing::warn!(
                    attempt,
                    max_retries,
                    delay_ms,
                    error = %err,
                    "transient record API error, retrying after backoff"
                );
                tokio::time::sleep(Duration::from_millis(delay_ms)).await;
            }
        }
    }
}
