//! HTTP client for the YouTube Data API v3.

use std::time::Duration;

use gapintel_core::ChannelInput;
use reqwest::{Client, Url};
use serde::de::DeserializeOwned;

use crate::error::YoutubeError;
use crate::retry::retry_with_backoff;
use crate::types::{ChannelInfo, ChannelItem, ListResponse, SearchItem};

const DEFAULT_BASE_URL: &str = "https://www.googleapis.com/youtube/v3/";
const CHANNEL_PARTS: &str = "snippet,statistics";

/// Client for the YouTube Data API.
///
/// Use [`YoutubeClient::new`] for production or
/// [`YoutubeClient::with_base_url`] to point at a mock server in tests.
pub struct YoutubeClient {
    client: Client,
    api_key: String,
    base_url: Url,
    max_retries: u32,
    backoff_base_ms: u64,
}

impl YoutubeClient {
    /// Creates a client pointed at the production API.
    ///
    /// # Errors
    ///
    /// Returns [`YoutubeError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(
        api_key: &str,
        timeout_secs: u64,
        max_retries: u32,
        backoff_base_ms: u64,
    ) -> Result<Self, YoutubeError> {
        Self::with_base_url(
            api_key,
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
    /// Returns [`YoutubeError::Http`] if the `reqwest::Client` cannot be
    /// constructed, or [`YoutubeError::InvalidBaseUrl`] if `base_url` does
    /// not parse.
    pub fn with_base_url(
        api_key: &str,
        timeout_secs: u64,
        max_retries: u32,
        backoff_base_ms: u64,
        base_url: &str,
    ) -> Result<Self, YoutubeError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent("gapintel/0.1 (channel-lookup)")
            .build()?;

        // Exactly one trailing slash so `join` appends the resource name.
        let normalised = format!("{}/", base_url.trim_end_matches('/'));
        let base_url = Url::parse(&normalised).map_err(|e| YoutubeError::InvalidBaseUrl {
            url: base_url.to_string(),
            reason: e.to_string(),
        })?;

        Ok(Self {
            client,
            api_key: api_key.to_owned(),
            base_url,
            max_retries,
            backoff_base_ms,
        })
    }

    /// Resolves parsed user input to a single channel.
    ///
    /// IDs, handles and usernames use the `channels` resource directly; free
    /// text runs a one-result channel search first.
    ///
    /// # Errors
    ///
    /// - [`YoutubeError::ChannelNotFound`] if nothing matches.
    /// - [`YoutubeError::Api`] for quota, key or server errors.
    /// - [`YoutubeError::Http`] on network failure.
    /// - [`YoutubeError::Deserialize`] if the response has an unexpected shape.
    pub async fn lookup_channel(&self, input: &ChannelInput) -> Result<ChannelInfo, YoutubeError> {
        let (filter, value) = match input {
            ChannelInput::ChannelId(id) => ("id", id.clone()),
            ChannelInput::Handle(handle) => ("forHandle", format!("@{handle}")),
            ChannelInput::Username(name) => ("forUsername", name.clone()),
            ChannelInput::Search(query) => ("id", self.search_channel_id(query).await?),
        };

        let url = self.build_url(
            "channels",
            &[("part", CHANNEL_PARTS), (filter, &value), ("maxResults", "1")],
        );
        let response: ListResponse<ChannelItem> = self.get_json(&url, "channels").await?;
        let info = response
            .items
            .into_iter()
            .next()
            .map(ChannelInfo::from)
            .ok_or_else(|| YoutubeError::ChannelNotFound(value.clone()))?;

        tracing::debug!(channel_id = %info.channel_id, lookup = filter, "channel resolved");
        Ok(info)
    }

    async fn search_channel_id(&self, query: &str) -> Result<String, YoutubeError> {
        let url = self.build_url(
            "search",
            &[
                ("part", "snippet"),
                ("type", "channel"),
                ("maxResults", "1"),
                ("q", query),
            ],
        );
        let response: ListResponse<SearchItem> = self.get_json(&url, "search").await?;
        response
            .items
            .into_iter()
            .find_map(|item| item.id.channel_id)
            .ok_or_else(|| YoutubeError::ChannelNotFound(query.to_string()))
    }

    /// Builds `<base>/<resource>?key=...&<params>` with encoded values.
    fn build_url(&self, resource: &str, params: &[(&str, &str)]) -> Url {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map(|mut segments| {
                segments.pop_if_empty().push(resource);
            })
            .ok();
        {
            let mut pairs = url.query_pairs_mut();
            for (k, v) in params {
                pairs.append_pair(k, v);
            }
            pairs.append_pair("key", &self.api_key);
        }
        url
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        url: &Url,
        context: &str,
    ) -> Result<T, YoutubeError> {
        let body = retry_with_backoff(self.max_retries, self.backoff_base_ms, || {
            self.request_json(url)
        })
        .await?;
        serde_json::from_value(body).map_err(|e| YoutubeError::Deserialize {
            context: context.to_string(),
            source: e,
        })
    }

    /// Sends a GET and parses the body as JSON, surfacing the API's error
    /// envelope on non-2xx responses.
    async fn request_json(&self, url: &Url) -> Result<serde_json::Value, YoutubeError> {
        let response = self.client.get(url.clone()).send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(YoutubeError::Api {
                status: status.as_u16(),
                message: api_error_message(&body),
            });
        }

        serde_json::from_str(&body).map_err(|e| YoutubeError::Deserialize {
            context: redact_key(url),
            source: e,
        })
    }
}

/// Google's error envelope is `{"error": {"code": 403, "message": "..."}}`.
fn api_error_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| {
            v.pointer("/error/message")
                .and_then(serde_json::Value::as_str)
                .map(str::to_string)
        })
        .unwrap_or_else(|| "unknown error".to_string())
}

fn redact_key(url: &Url) -> String {
    let mut redacted = url.clone();
    let pairs: Vec<(String, String)> = url
        .query_pairs()
        .filter(|(k, _)| k != "key")
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();
    redacted.query_pairs_mut().clear().extend_pairs(pairs);
    redacted.to_string()
}

#[cfg(test)]
#[path = "client_test.rs"]
mod tests;
