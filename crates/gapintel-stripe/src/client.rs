//! HTTP plumbing shared by the Stripe resources.

use std::time::Duration;

use reqwest::{Client, RequestBuilder, Url};
use serde::de::DeserializeOwned;

use crate::error::StripeError;
use crate::retry::retry_with_backoff;

const DEFAULT_BASE_URL: &str = "https://api.stripe.com/v1/";

/// Client for the Stripe REST API.
///
/// Requests are form-encoded and authenticated with the secret key as a
/// bearer token. POSTs carry an `Idempotency-Key` that stays fixed across
/// retries, so a retried create never produces a second object.
pub struct StripeClient {
    client: Client,
    secret_key: String,
    base_url: Url,
    max_retries: u32,
    backoff_base_ms: u64,
}

impl std::fmt::Debug for StripeClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StripeClient")
            .field("base_url", &self.base_url.as_str())
            .field("secret_key", &"[redacted]")
            .field("max_retries", &self.max_retries)
            .finish_non_exhaustive()
    }
}

impl StripeClient {
    /// Creates a client pointed at `api.stripe.com`.
    ///
    /// # Errors
    ///
    /// Returns [`StripeError::Http`] if the `reqwest::Client` cannot be built.
    pub fn new(
        secret_key: &str,
        timeout_secs: u64,
        max_retries: u32,
        backoff_base_ms: u64,
    ) -> Result<Self, StripeError> {
        Self::with_base_url(
            secret_key,
            timeout_secs,
            max_retries,
            backoff_base_ms,
            DEFAULT_BASE_URL,
        )
    }

    /// Creates a client with a custom base URL (for testing with wiremock).
    ///
    /// # Errors
    ///
    /// Returns [`StripeError::Http`] if the `reqwest::Client` cannot be built,
    /// or [`StripeError::InvalidBaseUrl`] if `base_url` does not parse.
    pub fn with_base_url(
        secret_key: &str,
        timeout_secs: u64,
        max_retries: u32,
        backoff_base_ms: u64,
        base_url: &str,
    ) -> Result<Self, StripeError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent("gapintel/0.1 (billing)")
            .build()?;

        let normalised = format!("{}/", base_url.trim_end_matches('/'));
        let base_url = Url::parse(&normalised).map_err(|e| StripeError::InvalidBaseUrl {
            url: base_url.to_string(),
            reason: e.to_string(),
        })?;

        Ok(Self {
            client,
            secret_key: secret_key.to_owned(),
            base_url,
            max_retries,
            backoff_base_ms,
        })
    }

    pub(crate) fn build_url(&self, path: &str) -> Url {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map(|mut segments| {
                segments.pop_if_empty().extend(path.split('/'));
            })
            .ok();
        url
    }

    pub(crate) async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<T, StripeError> {
        let url = self.build_url(path);
        retry_with_backoff(self.max_retries, self.backoff_base_ms, || {
            self.send(self.client.get(url.clone()).query(query), path)
        })
        .await
    }

    pub(crate) async fn post_form<T: DeserializeOwned>(
        &self,
        path: &str,
        form: &[(String, String)],
    ) -> Result<T, StripeError> {
        let url = self.build_url(path);
        let idempotency_key = uuid::Uuid::new_v4().to_string();
        retry_with_backoff(self.max_retries, self.backoff_base_ms, || {
            let request = self
                .client
                .post(url.clone())
                .header("Idempotency-Key", &idempotency_key)
                .form(form);
            self.send(request, path)
        })
        .await
    }

    async fn send<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        context: &str,
    ) -> Result<T, StripeError> {
        let response = request.bearer_auth(&self.secret_key).send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            let (code, message) = api_error_fields(&body);
            return Err(StripeError::Api {
                status: status.as_u16(),
                code,
                message,
            });
        }

        serde_json::from_str(&body).map_err(|e| StripeError::Deserialize {
            context: context.to_string(),
            source: e,
        })
    }
}

/// Stripe's error envelope: `{"error": {"code": "...", "message": "..."}}`.
fn api_error_fields(body: &str) -> (Option<String>, String) {
    let parsed: Option<serde_json::Value> = serde_json::from_str(body).ok();
    let error = parsed.as_ref().and_then(|v| v.get("error"));
    let code = error
        .and_then(|e| e.get("code"))
        .and_then(serde_json::Value::as_str)
        .map(str::to_string);
    let message = error
        .and_then(|e| e.get("message"))
        .and_then(serde_json::Value::as_str)
        .map_or_else(|| "unknown error".to_string(), str::to_string);
    (code, message)
}
