use thiserror::Error;

/// Errors returned by the YouTube Data API client.
#[derive(Debug, Error)]
pub enum YoutubeError {
    /// Network or TLS failure from the underlying HTTP client.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The API answered with a non-2xx status and an error envelope.
    #[error("YouTube API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// No channel matched the input.
    #[error("channel not found: {0}")]
    ChannelNotFound(String),

    /// The client was constructed with an unusable base URL.
    #[error("invalid base URL '{url}': {reason}")]
    InvalidBaseUrl { url: String, reason: String },

    /// The response body could not be deserialized into the expected type.
    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },
}

impl YoutubeError {
    /// `true` for quota and key problems, which retrying cannot fix.
    #[must_use]
    pub fn is_quota_or_auth(&self) -> bool {
        matches!(self, YoutubeError::Api { status: 400 | 401 | 403, .. })
    }
}
