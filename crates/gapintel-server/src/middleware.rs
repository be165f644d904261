use std::{
    collections::HashMap,
    sync::Arc,
    time::{Duration, Instant},
};

use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, HeaderMap, HeaderValue},
    middleware::Next,
    response::{IntoResponse, Response},
};
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::api::ApiError;

pub const USER_ID_HEADER: &str = "x-user-id";
const MAX_USER_ID_LEN: usize = 128;
/// Expired windows are swept once the table grows past this many clients.
const RATE_LIMIT_SWEEP_THRESHOLD: usize = 10_000;

/// Newtype wrapping a request ID string, stored as a request extension.
#[derive(Debug, Clone)]
pub struct RequestId(pub String);

/// The signed-in user the request acts for, from the `x-user-id` header.
#[derive(Debug, Clone)]
pub struct UserId(pub String);

/// API key auth settings used by middleware.
///
/// Keys are held only as salted SHA-256 digests and compared in constant
/// time.
#[derive(Clone)]
pub struct AuthState {
    key_hashes: Arc<Vec<[u8; 32]>>,
    salt: Arc<str>,
    pub enabled: bool,
}

impl std::fmt::Debug for AuthState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthState")
            .field("keys", &self.key_hashes.len())
            .field("enabled", &self.enabled)
            .finish_non_exhaustive()
    }
}

impl AuthState {
    /// Builds auth config from `GAPINTEL_API_KEYS` (comma-separated bearer tokens).
    ///
    /// In development, empty/missing keys disable auth for local iteration.
    /// In non-development envs, empty/missing keys fail startup.
    pub fn from_env(is_development: bool, salt: Option<&str>) -> anyhow::Result<Self> {
        let raw = std::env::var("GAPINTEL_API_KEYS").unwrap_or_default();
        Self::from_keys(&raw, salt, is_development)
    }

    pub fn from_keys(raw: &str, salt: Option<&str>, is_development: bool) -> anyhow::Result<Self> {
        let salt: Arc<str> = salt.unwrap_or_default().into();
        let key_hashes: Vec<[u8; 32]> = raw
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|key| hash_key(&salt, key))
            .collect();

        if key_hashes.is_empty() {
            if is_development {
                tracing::warn!(
                    "GAPINTEL_API_KEYS not set; bearer auth disabled in development environment"
                );
                return Ok(Self {
                    key_hashes: Arc::new(Vec::new()),
                    salt,
                    enabled: false,
                });
            }

            anyhow::bail!(
                "GAPINTEL_API_KEYS is required outside development; provide comma-separated bearer tokens"
            );
        }

        Ok(Self {
            key_hashes: Arc::new(key_hashes),
            salt,
            enabled: true,
        })
    }

    fn allows(&self, token: &str) -> bool {
        let candidate = hash_key(&self.salt, token);
        self.key_hashes
            .iter()
            .fold(subtle::Choice::from(0), |acc, known| {
                acc | known.as_slice().ct_eq(candidate.as_slice())
            })
            .into()
    }
}

fn hash_key(salt: &str, key: &str) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(salt.as_bytes());
    hasher.update(key.as_bytes());
    hasher.finalize().into()
}

#[derive(Debug, Clone, Copy)]
struct RateLimitWindow {
    started_at: Instant,
    count: usize,
}

/// Fixed-window limiter keyed per client.
#[derive(Debug, Clone)]
pub struct RateLimitState {
    max_requests: usize,
    window: Duration,
    clients: Arc<Mutex<HashMap<String, RateLimitWindow>>>,
}

impl RateLimitState {
    #[must_use]
    pub fn new(max_requests: usize, window: Duration) -> Self {
        Self {
            max_requests,
            window,
            clients: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Counts one request for `client`; `false` once its window is spent.
    async fn admit(&self, client: String) -> bool {
        let now = Instant::now();
        let mut clients = self.clients.lock().await;

        if clients.len() > RATE_LIMIT_SWEEP_THRESHOLD {
            let window = self.window;
            clients.retain(|_, w| now.duration_since(w.started_at) < window);
        }

        let entry = clients.entry(client).or_insert(RateLimitWindow {
            started_at: now,
            count: 0,
        });
        if now.duration_since(entry.started_at) >= self.window {
            *entry = RateLimitWindow {
                started_at: now,
                count: 0,
            };
        }
        if entry.count >= self.max_requests {
            return false;
        }
        entry.count += 1;
        true
    }
}

fn request_id_of(req: &Request) -> String {
    req.extensions()
        .get::<RequestId>()
        .map_or_else(String::new, |id| id.0.clone())
}

/// Axum middleware that extracts or generates a request ID.
///
/// If the incoming request has an `x-request-id` header, that value is used.
/// Otherwise a new `UUIDv4` is generated. The ID is:
/// - Inserted into request extensions as [`RequestId`]
/// - Set on the response as the `x-request-id` header
pub async fn request_id(mut req: Request, next: Next) -> Response {
    let id = req
        .headers()
        .get("x-request-id")
        .and_then(|v| v.to_str().ok())
        .map_or_else(|| Uuid::new_v4().to_string(), String::from);

    req.extensions_mut().insert(RequestId(id.clone()));

    let mut res = next.run(req).await;

    if let Ok(val) = HeaderValue::from_str(&id) {
        res.headers_mut().insert("x-request-id", val);
    }

    res
}

/// Middleware enforcing Bearer token auth when enabled.
pub async fn require_bearer_auth(
    State(auth): State<AuthState>,
    req: Request,
    next: Next,
) -> Response {
    if !auth.enabled {
        return next.run(req).await;
    }

    match extract_bearer_token(req.headers().get(AUTHORIZATION)) {
        Some(token) if auth.allows(token) => next.run(req).await,
        _ => ApiError::new(
            request_id_of(&req),
            "unauthorized",
            "missing or invalid bearer token",
        )
        .into_response(),
    }
}

/// Middleware resolving the acting user from `x-user-id`.
///
/// The API sits behind the app's own session layer, which forwards the
/// authenticated user's id; a missing or malformed header is rejected.
pub async fn require_user_id(mut req: Request, next: Next) -> Response {
    match extract_user_id(req.headers()) {
        Some(user_id) => {
            req.extensions_mut().insert(UserId(user_id));
            next.run(req).await
        }
        None => ApiError::new(
            request_id_of(&req),
            "unauthorized",
            "missing or invalid x-user-id header",
        )
        .into_response(),
    }
}

/// Middleware enforcing a fixed request-per-window limit per client.
pub async fn enforce_rate_limit(
    State(rate_limit): State<RateLimitState>,
    req: Request,
    next: Next,
) -> Response {
    if !rate_limit.admit(client_key(req.headers())).await {
        return ApiError::new(request_id_of(&req), "rate_limited", "rate limit exceeded")
            .into_response();
    }
    next.run(req).await
}

/// User id when present, else a digest of the bearer token, else one
/// shared bucket.
fn client_key(headers: &HeaderMap) -> String {
    if let Some(user_id) = extract_user_id(headers) {
        return format!("user:{user_id}");
    }
    if let Some(token) = extract_bearer_token(headers.get(AUTHORIZATION)) {
        let digest = Sha256::digest(token.as_bytes());
        return format!("token:{digest:x}");
    }
    "global".to_string()
}

fn extract_user_id(headers: &HeaderMap) -> Option<String> {
    headers
        .get(USER_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|s| !s.is_empty() && s.len() <= MAX_USER_ID_LEN)
        .map(ToOwned::to_owned)
}

fn extract_bearer_token(value: Option<&HeaderValue>) -> Option<&str> {
    value
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .filter(|s| !s.trim().is_empty())
}
