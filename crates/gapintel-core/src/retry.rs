//! Exponential back-off with jitter shared by the outbound API clients.

use std::fmt::Display;
use std::future::Future;
use std::time::Duration;

const MAX_DELAY_MS: u64 = 30_000;

/// Delay before retry number `attempt` (1-based): `base * 2^(attempt-1)`,
/// capped at 30 s, then scaled by a random factor in `[0.75, 1.25)`.
#[must_use]
pub fn backoff_delay(backoff_base_ms: u64, attempt: u32) -> Duration {
    let capped = backoff_base_ms
        .saturating_mul(1u64 << attempt.saturating_sub(1).min(10))
        .min(MAX_DELAY_MS);
    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        clippy::cast_precision_loss
    )]
    let delay_ms = (capped as f64 * (rand::random::<f64>() * 0.5 + 0.75)) as u64;
    Duration::from_millis(delay_ms)
}

/// Runs `operation`, retrying up to `max_retries` extra times while
/// `is_retriable` accepts the error. `service` names the upstream in logs.
///
/// # Errors
///
/// Returns the first non-retriable error, or the last error once retries
/// are exhausted.
pub async fn retry_with_backoff<T, E, F, Fut>(
    service: &str,
    max_retries: u32,
    backoff_base_ms: u64,
    is_retriable: fn(&E) -> bool,
    mut operation: F,
) -> Result<T, E>
where
    E: Display,
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    let mut attempt = 0u32;
    loop {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(err) if is_retriable(&err) && attempt < max_retries => {
                attempt += 1;
                let delay = backoff_delay(backoff_base_ms, attempt);
                tracing::warn!(
                    service,
                    attempt,
                    max_retries,
                    delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                    error = %err,
                    "transient upstream error, retrying after back-off"
                );
                tokio::time::sleep(delay).await;
            }
            Err(err) => return Err(err),
        }
    }
}
