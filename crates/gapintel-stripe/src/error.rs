use thiserror::Error;

/// Errors returned by the Stripe client.
#[derive(Debug, Error)]
pub enum StripeError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Stripe answered with a non-2xx status. `code` is Stripe's machine code
    /// (for example `resource_missing`) when one was sent.
    #[error("Stripe API error ({status}): {message}")]
    Api {
        status: u16,
        code: Option<String>,
        message: String,
    },

    #[error("invalid base URL '{url}': {reason}")]
    InvalidBaseUrl { url: String, reason: String },

    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    /// A checkout session came back without a redirect URL.
    #[error("checkout session {0} has no url")]
    MissingCheckoutUrl(String),
}
