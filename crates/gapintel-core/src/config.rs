use crate::app_config::{AppConfig, Environment, StripePrices};
use crate::ConfigError;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Decoupled from the real environment so tests can drive it from a `HashMap`.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::net::SocketAddr;

    let require = |var: &str| -> Result<String, ConfigError> {
        lookup(var).map_err(|_| ConfigError::MissingEnvVar(var.to_string()))
    };

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    // Blank values count as unset so `.env` templates with `KEY=` stay harmless.
    let optional = |var: &str| -> Option<String> {
        lookup(var)
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    };

    let parse_addr = |var: &str, default: &str| -> Result<SocketAddr, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<SocketAddr>()
            .map_err(|e| ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: e.to_string(),
            })
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u32>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u64>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let database_url = require("DATABASE_URL")?;
    let env = parse_environment(&or_default("GAPINTEL_ENV", "development"))?;

    let bind_addr = parse_addr("GAPINTEL_BIND_ADDR", "0.0.0.0:3000")?;
    let log_level = or_default("GAPINTEL_LOG_LEVEL", "info");
    let app_url = or_default("GAPINTEL_APP_URL", "http://localhost:3000")
        .trim_end_matches('/')
        .to_string();
    let api_key_hash_salt = optional("GAPINTEL_API_KEY_HASH_SALT");

    let db_max_connections = parse_u32("GAPINTEL_DB_MAX_CONNECTIONS", "10")?;
    let db_min_connections = parse_u32("GAPINTEL_DB_MIN_CONNECTIONS", "1")?;
    let db_acquire_timeout_secs = parse_u64("GAPINTEL_DB_ACQUIRE_TIMEOUT_SECS", "10")?;

    let http_timeout_secs = parse_u64("GAPINTEL_HTTP_TIMEOUT_SECS", "30")?;
    let http_max_retries = parse_u32("GAPINTEL_HTTP_MAX_RETRIES", "2")?;
    let http_retry_backoff_base_ms = parse_u64("GAPINTEL_HTTP_RETRY_BACKOFF_BASE_MS", "500")?;

    let poll_interval_secs = parse_u64("GAPINTEL_POLL_INTERVAL_SECS", "30")?;
    if poll_interval_secs == 0 {
        return Err(ConfigError::InvalidEnvVar {
            var: "GAPINTEL_POLL_INTERVAL_SECS".to_string(),
            reason: "must be at least 1".to_string(),
        });
    }

    let worker_url = optional("GAPINTEL_WORKER_URL");
    let worker_keepalive_cron = or_default("GAPINTEL_WORKER_KEEPALIVE_CRON", "0 */10 * * * *");

    let youtube_api_key = optional("YOUTUBE_API_KEY");
    let stripe_secret_key = optional("STRIPE_SECRET_KEY");
    let stripe_prices = StripePrices {
        starter: optional("STRIPE_PRICE_STARTER"),
        pro: optional("STRIPE_PRICE_PRO"),
        enterprise: optional("STRIPE_PRICE_ENTERPRISE"),
        single_report: optional("STRIPE_PRICE_SINGLE_REPORT"),
    };

    Ok(AppConfig {
        database_url,
        env,
        bind_addr,
        log_level,
        app_url,
        api_key_hash_salt,
        db_max_connections,
        db_min_connections,
        db_acquire_timeout_secs,
        http_timeout_secs,
        http_max_retries,
        http_retry_backoff_base_ms,
        poll_interval_secs,
        worker_url,
        worker_keepalive_cron,
        youtube_api_key,
        stripe_secret_key,
        stripe_prices,
    })
}

fn parse_environment(s: &str) -> Result<Environment, ConfigError> {
    match s {
        "development" => Ok(Environment::Development),
        "test" => Ok(Environment::Test),
        "production" => Ok(Environment::Production),
        other => Err(ConfigError::InvalidEnvVar {
            var: "GAPINTEL_ENV".to_string(),
            reason: format!("expected development, test, or production; got '{other}'"),
        }),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
