use std::net::SocketAddr;

use crate::Tier;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

/// Stripe price IDs, one per purchasable product.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StripePrices {
    pub starter: Option<String>,
    pub pro: Option<String>,
    pub enterprise: Option<String>,
    /// One-off purchase of a single channel report.
    pub single_report: Option<String>,
}

impl StripePrices {
    /// Price ID for a subscription tier. `Free` has no price.
    #[must_use]
    pub fn for_tier(&self, tier: Tier) -> Option<&str> {
        match tier {
            Tier::Free => None,
            Tier::Starter => self.starter.as_deref(),
            Tier::Pro => self.pro.as_deref(),
            Tier::Enterprise => self.enterprise.as_deref(),
        }
    }

    /// Reverse lookup used when syncing a Stripe subscription back to a tier.
    #[must_use]
    pub fn tier_for_price(&self, price_id: &str) -> Option<Tier> {
        [Tier::Starter, Tier::Pro, Tier::Enterprise]
            .into_iter()
            .find(|tier| self.for_tier(*tier) == Some(price_id))
    }
}

#[derive(Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub env: Environment,
    pub bind_addr: SocketAddr,
    pub log_level: String,
    pub app_url: String,
    pub api_key_hash_salt: Option<String>,
    pub db_max_connections: u32,
    pub db_min_connections: u32,
    pub db_acquire_timeout_secs: u64,
    pub http_timeout_secs: u64,
    pub http_max_retries: u32,
    pub http_retry_backoff_base_ms: u64,
    pub poll_interval_secs: u64,
    pub worker_url: Option<String>,
    pub worker_keepalive_cron: String,
    pub youtube_api_key: Option<String>,
    pub stripe_secret_key: Option<String>,
    pub stripe_prices: StripePrices,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("env", &self.env)
            .field("bind_addr", &self.bind_addr)
            .field("log_level", &self.log_level)
            .field("app_url", &self.app_url)
            .field("database_url", &"[redacted]")
            .field(
                "api_key_hash_salt",
                &self.api_key_hash_salt.as_ref().map(|_| "[redacted]"),
            )
            .field("db_max_connections", &self.db_max_connections)
            .field("db_min_connections", &self.db_min_connections)
            .field("db_acquire_timeout_secs", &self.db_acquire_timeout_secs)
            .field("http_timeout_secs", &self.http_timeout_secs)
            .field("http_max_retries", &self.http_max_retries)
            .field(
                "http_retry_backoff_base_ms",
                &self.http_retry_backoff_base_ms,
            )
            .field("poll_interval_secs", &self.poll_interval_secs)
            .field("worker_url", &self.worker_url)
            .field("worker_keepalive_cron", &self.worker_keepalive_cron)
            .field(
                "youtube_api_key",
                &self.youtube_api_key.as_ref().map(|_| "[redacted]"),
            )
            .field(
                "stripe_secret_key",
                &self.stripe_secret_key.as_ref().map(|_| "[redacted]"),
            )
            .field("stripe_prices", &self.stripe_prices)
            .finish()
    }
}
