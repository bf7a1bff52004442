//! Retry with exponential back-off and jitter for Search Console calls.
//!
//! [`retry_with_backoff`] wraps any fallible async operation and retries on
//! transient errors (network failures, 5xx). Application-level errors — a
//! rejected token refresh, a 4xx from the API, a malformed body — are
//! returned immediately; retrying cannot fix them.

use std::future::Future;
use std::time::Duration;

use crate::error::GscError;

/// Returns `true` for errors that are worth retrying after a back-off delay.
///
/// **Retriable:**
/// - Network-level failures: timeout, connection reset.
/// - HTTP 5xx responses: transient server/infrastructure errors.
///
/// **Not retriable (hard stop):**
/// - 4xx API errors — auth and quota problems need intervention, not retries.
/// - [`GscError::TokenRefresh`] — the grant itself was rejected.
/// - [`GscError::Deserialize`] / [`GscError::InvalidResponse`] — malformed
///   response; retrying won't fix it.
pub fn is_retriable(err: &GscError) -> bool {
    match err {
        GscError::Http(e) => {
            e.is_timeout() || e.is_connect() || e.status().is_some_and(|s| s.is_server_error())
        }
        GscError::Api { status, .. } => *status >= 500,
        GscError::TokenRefresh(_)
        | GscError::Deserialize { .. }
        | GscError::InvalidResponse(_) => false,
    }
}

/// Runs `operation` with up to `max_retries` additional attempts on transient errors.
///
/// Back-off doubles from `backoff_base_ms` per attempt with ±25 % jitter and
/// a 60 s cap. Non-retriable errors are returned immediately.
pub async fn retry_with_backoff<T, F, Fut>(
    max_retries: u32,
    backoff_base_ms: u64,
    mut operation: F,
) -> Result<T, GscError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, GscError>>,
{
    const MAX_DELAY_MS: u64 = 60_000;
    let mut attempt = 0u32;
    loop {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(err) => {
                if !is_retriable(&err) || attempt >= max_retries {
                    return Err(err);
                }
                attempt += 1;
                let computed = backoff_base_ms.saturating_mul(1u64 << (attempt - 1).min(10));
                let capped = computed.min(MAX_DELAY_MS);
                #[allow(
                    clippy::cast_possible_truncation,
                    clippy::cast_sign_loss,
                    clippy::cast_precision_loss
                )]
                let delay_ms = (capped as f64 * (rand::random::<f64>() * 0.5 + 0.75)) as u64;
                tracing::warn!(
                    attempt,
                    max_retries,
                    delay_ms,
                    error = %err,
                    "Search Console transient error, retrying after back-off"
                );
                tokio::time::sleep(Duration::from_millis(delay_ms)).await;
            }
        }
    }
}
