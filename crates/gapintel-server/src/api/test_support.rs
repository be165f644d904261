use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use axum::Router;
use gapintel_core::{AppConfig, Environment, StripePrices};
use tower::ServiceExt;

use super::{build_app, default_rate_limit_state, AppState};
use crate::middleware::AuthState;

pub(super) fn test_config() -> AppConfig {
    AppConfig {
        database_url: "postgres://unused".to_string(),
        env: Environment::Test,
        bind_addr: "127.0.0.1:0".parse().expect("addr"),
        log_level: "debug".to_string(),
        app_url: "https://gapintel.test".to_string(),
        api_key_hash_salt: None,
        db_max_connections: 2,
        db_min_connections: 1,
        db_acquire_timeout_secs: 5,
        http_timeout_secs: 5,
        http_max_retries: 0,
        http_retry_backoff_base_ms: 0,
        poll_interval_secs: 1,
        worker_url: None,
        worker_keepalive_cron: "0 */10 * * * *".to_string(),
        youtube_api_key: None,
        stripe_secret_key: None,
        stripe_prices: StripePrices::default(),
    }
}

pub(super) fn state_with(pool: sqlx::PgPool, config: AppConfig) -> AppState {
    AppState::from_config(pool, Arc::new(config)).expect("state")
}

pub(super) fn app(pool: sqlx::PgPool) -> Router {
    app_with(state_with(pool, test_config()))
}

pub(super) fn app_with(state: AppState) -> Router {
    let auth = AuthState::from_keys("", None, true).expect("auth");
    build_app(state, auth, default_rate_limit_state())
}

/// Sends one request as `user` and returns status plus parsed JSON body.
pub(super) async fn send(
    app: Router,
    method: &str,
    uri: &str,
    user: Option<&str>,
    body: Option<serde_json::Value>,
) -> (StatusCode, serde_json::Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(user) = user {
        builder = builder.header("x-user-id", user);
    }
    let request = match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(json.to_string())),
        None => builder.body(Body::empty()),
    }
    .expect("request");

    let response = app.oneshot(request).await.expect("response");
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body bytes");
    let json = if bytes.is_empty() {
        serde_json::Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null)
    };
    (status, json)
}
