use std::future::Future;

use crate::error::StripeError;

/// Stripe asks clients to retry on connection failures, 409 lock timeouts,
/// 429 and 5xx. Everything else is a caller error.
pub(crate) fn is_retriable(err: &StripeError) -> bool {
    match err {
        StripeError::Http(e) => {
            e.is_timeout() || e.is_connect() || e.status().is_some_and(|s| s.is_server_error())
        }
        StripeError::Api { status, .. } => matches!(*status, 409 | 429) || *status >= 500,
        StripeError::InvalidBaseUrl { .. }
        | StripeError::Deserialize { .. }
        | StripeError::MissingCheckoutUrl(_) => false,
    }
}

/// Runs `operation`, retrying transient Stripe failures with back-off.
pub(crate) async fn retry_with_backoff<T, F, Fut>(
    max_retries: u32,
    backoff_base_ms: u64,
    operation: F,
) -> Result<T, StripeError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, StripeError>>,
{
    gapintel_core::retry_with_backoff("stripe", max_retries, backoff_base_ms, is_retriable, operation)
        .await
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    use super::*;

    fn api(status: u16) -> StripeError {
        StripeError::Api {
            status,
            code: None,
            message: "x".to_owned(),
        }
    }

    #[test]
    fn lock_timeouts_and_throttling_retry() {
        assert!(is_retriable(&api(409)));
        assert!(is_retriable(&api(429)));
        assert!(is_retriable(&api(500)));
    }

    #[test]
    fn card_and_request_errors_do_not_retry() {
        assert!(!is_retriable(&api(400)));
        assert!(!is_retriable(&api(402)));
        assert!(!is_retriable(&api(401)));
        assert!(!is_retriable(&StripeError::MissingCheckoutUrl("cs_1".into())));
    }

    #[tokio::test]
    async fn connect_error_is_retried_until_exhausted() {
        let calls = Arc::new(AtomicU32::new(0));
        let c = Arc::clone(&calls);
        let client = reqwest::Client::new();
        let result: Result<(), _> = retry_with_backoff(2, 0, || {
            let c = Arc::clone(&c);
            let client = client.clone();
            async move {
                c.fetch_add(1, Ordering::SeqCst);
                client.get("http://0.0.0.0:1").send().await?;
                Ok(())
            }
        })
        .await;
        assert!(matches!(result, Err(StripeError::Http(_))));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }
}
