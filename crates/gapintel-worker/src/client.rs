//! Keep-alive client for the worker's `/health` endpoint.

use std::time::{Duration, Instant};

use reqwest::{Client, Url};
use serde::{Deserialize, Serialize};

use crate::error::WorkerError;

#[derive(Debug, Clone)]
pub struct WorkerClient {
    client: Client,
    health_url: Url,
}

/// Result of one health probe.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WorkerHealth {
    /// The worker's self-reported status, `ok` when it sends no body.
    pub status: String,
    pub latency_ms: u64,
}

#[derive(Debug, Deserialize)]
struct HealthBody {
    #[serde(default)]
    status: Option<String>,
}

impl WorkerClient {
    /// # Errors
    ///
    /// Returns [`WorkerError::InvalidBaseUrl`] if `base_url` does not parse,
    /// or [`WorkerError::Http`] if the HTTP client cannot be built.
    pub fn new(base_url: &str, timeout_secs: u64) -> Result<Self, WorkerError> {
        let invalid = |reason: String| WorkerError::InvalidBaseUrl {
            url: base_url.to_string(),
            reason,
        };
        let base = Url::parse(&format!("{}/", base_url.trim_end_matches('/')))
            .map_err(|e| invalid(e.to_string()))?;
        let health_url = base.join("health").map_err(|e| invalid(e.to_string()))?;

        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent("gapintel/0.1 (keep-alive)")
            .build()?;

        Ok(Self { client, health_url })
    }

    #[must_use]
    pub fn health_url(&self) -> &str {
        self.health_url.as_str()
    }

    /// Probes `GET /health`. Any 2xx counts as healthy.
    ///
    /// # Errors
    ///
    /// Returns [`WorkerError::Unhealthy`] on a non-2xx answer or
    /// [`WorkerError::Http`] when the worker is unreachable.
    pub async fn health(&self) -> Result<WorkerHealth, WorkerError> {
        let started = Instant::now();
        let response = self.client.get(self.health_url.clone()).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(WorkerError::Unhealthy {
                status: status.as_u16(),
            });
        }
        let body = response.text().await.unwrap_or_default();
        let latency_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);

        let reported = serde_json::from_str::<HealthBody>(&body)
            .ok()
            .and_then(|b| b.status)
            .unwrap_or_else(|| "ok".to_string());

        tracing::debug!(status = %reported, latency_ms, "worker health probe");
        Ok(WorkerHealth {
            status: reported,
            latency_ms,
        })
    }

    /// Best-effort keep-alive. Failures are logged, never returned.
    pub async fn keep_alive(&self) {
        if let Err(e) = self.health().await {
            tracing::warn!(error = %e, url = %self.health_url, "worker keep-alive ping failed");
        }
    }
}
