//! Retry with exponential back-off and jitter for Data API calls.

use std::future::Future;

use crate::error::YoutubeError;

/// Network failures, 429 and 5xx are worth another attempt. Quota, key and
/// not-found errors are returned immediately so retries never burn quota.
pub(crate) fn is_retriable(err: &YoutubeError) -> bool {
    match err {
        YoutubeError::Http(e) => {
            e.is_timeout() || e.is_connect() || e.status().is_some_and(|s| s.is_server_error())
        }
        YoutubeError::Api { status, .. } => *status == 429 || *status >= 500,
        YoutubeError::ChannelNotFound(_)
        | YoutubeError::InvalidBaseUrl { .. }
        | YoutubeError::Deserialize { .. } => false,
    }
}

/// Runs `operation`, retrying transient Data API failures with back-off.
pub(crate) async fn retry_with_backoff<T, F, Fut>(
    max_retries: u32,
    backoff_base_ms: u64,
    operation: F,
) -> Result<T, YoutubeError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, YoutubeError>>,
{
    gapintel_core::retry_with_backoff("youtube", max_retries, backoff_base_ms, is_retriable, operation)
        .await
}
