pub mod app_config;
pub mod channel_input;
pub mod config;
pub mod retry;
pub mod status;
pub mod tiers;

use thiserror::Error;

pub use app_config::{AppConfig, Environment, StripePrices};
pub use channel_input::ChannelInput;
pub use config::{load_app_config, load_app_config_from_env};
pub use retry::retry_with_backoff;
pub use status::ReportStatus;
pub use tiers::Tier;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CoreError {
    #[error("invalid report status: {0}")]
    InvalidStatus(String),

    #[error("invalid tier: {0}")]
    InvalidTier(String),

    #[error("channel input is empty")]
    EmptyChannelInput,
}
