use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum WorkerError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The health endpoint answered with a non-2xx status.
    #[error("worker unhealthy: HTTP {status}")]
    Unhealthy { status: u16 },

    #[error("invalid worker URL '{url}': {reason}")]
    InvalidBaseUrl { url: String, reason: String },

    /// The watched report no longer exists or is not visible to the caller.
    #[error("report {0} not found")]
    ReportNotFound(Uuid),

    /// Reading status from the backing store failed.
    #[error("status source error: {0}")]
    Source(String),
}
