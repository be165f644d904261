mod billing;
mod channels;
mod dashboard;
mod events;
mod folders;
mod reports;

use std::{fmt::Display, sync::Arc, time::Duration};

use axum::{
    extract::State,
    http::{header, HeaderName, Method, StatusCode},
    response::IntoResponse,
    routing::{delete, get, patch, post},
    Extension, Json, Router,
};
use chrono::{DateTime, Utc};
use gapintel_core::{AppConfig, Tier};
use gapintel_db::DbError;
use gapintel_stripe::StripeClient;
use gapintel_worker::WorkerClient;
use gapintel_youtube::YoutubeClient;
use serde::Serialize;
use sqlx::PgPool;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::middleware::{
    enforce_rate_limit, request_id, require_bearer_auth, require_user_id, AuthState,
    RateLimitState, RequestId, USER_ID_HEADER,
};

/// Shared handler state. Third-party clients are built once at startup and
/// are `None` when their credentials are not configured.
#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub config: Arc<AppConfig>,
    pub youtube: Option<Arc<YoutubeClient>>,
    pub stripe: Option<Arc<StripeClient>>,
    pub worker: Option<WorkerClient>,
}

impl AppState {
    /// Builds the state, constructing a client for every configured service.
    ///
    /// # Errors
    ///
    /// Returns an error if a configured client cannot be constructed.
    pub fn from_config(pool: PgPool, config: Arc<AppConfig>) -> anyhow::Result<Self> {
        let youtube = config
            .youtube_api_key
            .as_deref()
            .map(|key| {
                YoutubeClient::new(
                    key,
                    config.http_timeout_secs,
                    config.http_max_retries,
                    config.http_retry_backoff_base_ms,
                )
            })
            .transpose()?
            .map(Arc::new);

        let stripe = config
            .stripe_secret_key
            .as_deref()
            .map(|key| {
                StripeClient::new(
                    key,
                    config.http_timeout_secs,
                    config.http_max_retries,
                    config.http_retry_backoff_base_ms,
                )
            })
            .transpose()?
            .map(Arc::new);

        let worker = config
            .worker_url
            .as_deref()
            .map(|url| WorkerClient::new(url, config.http_timeout_secs))
            .transpose()?;

        for (service, configured) in [
            ("youtube", youtube.is_some()),
            ("stripe", stripe.is_some()),
            ("worker", worker.is_some()),
        ] {
            if !configured {
                tracing::warn!(service, "service not configured; dependent routes return 503");
            }
        }

        Ok(Self {
            pool,
            config,
            youtube,
            stripe,
            worker,
        })
    }
}

#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub data: T,
    pub meta: ResponseMeta,
}

#[derive(Debug, Serialize)]
pub struct ResponseMeta {
    pub request_id: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct ApiError {
    pub error: ErrorBody,
    pub meta: ResponseMeta,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
}

#[derive(Debug, Serialize, PartialEq, Eq)]
struct HealthData {
    status: &'static str,
    database: &'static str,
}

impl ResponseMeta {
    pub(crate) fn new(request_id: String) -> Self {
        Self {
            request_id,
            timestamp: Utc::now(),
        }
    }
}

impl<T: Serialize> ApiResponse<T> {
    pub(crate) fn new(data: T, request_id: String) -> Self {
        Self {
            data,
            meta: ResponseMeta::new(request_id),
        }
    }
}

impl ApiError {
    pub fn new(
        request_id: impl Into<String>,
        code: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            error: ErrorBody {
                code: code.into(),
                message: message.into(),
            },
            meta: ResponseMeta::new(request_id.into()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status = match self.error.code.as_str() {
            "not_found" => StatusCode::NOT_FOUND,
            "unauthorized" => StatusCode::UNAUTHORIZED,
            "bad_request" | "validation_error" => StatusCode::BAD_REQUEST,
            "quota_exceeded" => StatusCode::PAYMENT_REQUIRED,
            "conflict" => StatusCode::CONFLICT,
            "rate_limited" => StatusCode::TOO_MANY_REQUESTS,
            "upstream_error" => StatusCode::BAD_GATEWAY,
            "not_configured" => StatusCode::SERVICE_UNAVAILABLE,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, Json(self)).into_response()
    }
}

pub(super) fn normalize_limit(limit: Option<i64>) -> i64 {
    limit.unwrap_or(50).clamp(1, 200)
}

pub(super) fn map_db_error(request_id: String, error: &DbError) -> ApiError {
    match error {
        DbError::NotFound => ApiError::new(request_id, "not_found", "resource not found"),
        DbError::QuotaExceeded { used, limit } => ApiError::new(
            request_id,
            "quota_exceeded",
            format!("monthly report quota reached ({used}/{limit}); upgrade your plan for more reports"),
        ),
        DbError::Duplicate => ApiError::new(
            request_id,
            "conflict",
            "a record with the same name already exists",
        ),
        DbError::InvalidStatusTransition { .. } => {
            ApiError::new(request_id, "conflict", error.to_string())
        }
        _ => {
            tracing::error!(error = %error, "database query failed");
            ApiError::new(request_id, "internal_error", "database query failed")
        }
    }
}

/// Logs an upstream failure and returns a generic 502 that leaks nothing.
pub(super) fn upstream_error(request_id: String, service: &str, error: &dyn Display) -> ApiError {
    tracing::error!(service, error = %error, "upstream request failed");
    ApiError::new(
        request_id,
        "upstream_error",
        format!("{service} request failed; try again later"),
    )
}

pub(super) fn not_configured(request_id: String, service: &str) -> ApiError {
    ApiError::new(
        request_id,
        "not_configured",
        format!("{service} is not configured on this server"),
    )
}

/// The user's plan, `Free` when they have never subscribed.
pub(super) async fn current_tier(pool: &PgPool, user_id: &str) -> Result<Tier, DbError> {
    match gapintel_db::get_subscription(pool, user_id).await? {
        Some(row) => row.parsed_tier(),
        None => Ok(Tier::Free),
    }
}

fn build_cors() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::POST, Method::PATCH, Method::DELETE])
        .allow_headers([
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            HeaderName::from_static("x-request-id"),
            HeaderName::from_static(USER_ID_HEADER),
        ])
}

fn protected_router(auth: AuthState, rate_limit: RateLimitState) -> Router<AppState> {
    Router::new()
        .route("/api/v1/checkout", post(billing::create_checkout))
        .route("/api/v1/subscription", get(billing::get_subscription))
        .route(
            "/api/v1/subscription/sync",
            post(billing::sync_subscription),
        )
        .route("/api/v1/channels/lookup", get(channels::lookup_channel))
        .route(
            "/api/v1/reports",
            get(reports::list_reports).post(reports::create_report),
        )
        .route(
            "/api/v1/reports/{id}",
            get(reports::get_report).delete(reports::delete_report),
        )
        .route(
            "/api/v1/reports/{id}/folder",
            patch(reports::move_report),
        )
        .route("/api/v1/reports/{id}/status", get(reports::report_status))
        .route("/api/v1/reports/{id}/events", get(events::report_events))
        .route(
            "/api/v1/reports/{id}/dashboard",
            get(dashboard::report_dashboard),
        )
        .route(
            "/api/v1/folders",
            get(folders::list_folders).post(folders::create_folder),
        )
        .route("/api/v1/folders/{id}", delete(folders::delete_folder))
        .layer(
            ServiceBuilder::new()
                .layer(axum::middleware::from_fn_with_state(
                    rate_limit,
                    enforce_rate_limit,
                ))
                .layer(axum::middleware::from_fn_with_state(
                    auth,
                    require_bearer_auth,
                ))
                .layer(axum::middleware::from_fn(require_user_id)),
        )
}

pub fn build_app(state: AppState, auth: AuthState, rate_limit: RateLimitState) -> Router {
    let public_routes = Router::new().route("/api/v1/health", get(health));

    Router::new()
        .merge(public_routes)
        .merge(protected_router(auth, rate_limit))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(build_cors())
                .layer(axum::middleware::from_fn(request_id)),
        )
        .with_state(state)
}

async fn health(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> impl IntoResponse {
    let meta = ResponseMeta::new(req_id.0);

    match gapintel_db::health_check(&state.pool).await {
        Ok(()) => (
            StatusCode::OK,
            Json(ApiResponse {
                data: HealthData {
                    status: "ok",
                    database: "ok",
                },
                meta,
            }),
        ),
        Err(e) => {
            tracing::warn!(error = %e, "health check: database unavailable");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(ApiResponse {
                    data: HealthData {
                        status: "degraded",
                        database: "unavailable",
                    },
                    meta,
                }),
            )
        }
    }
}

pub fn default_rate_limit_state() -> RateLimitState {
    RateLimitState::new(120, Duration::from_secs(60))
}

#[cfg(test)]
mod test_support;
