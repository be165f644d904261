//! Stripe checkout and subscription endpoints.

use axum::{extract::State, Extension, Json};
use chrono::{DateTime, Utc};
use gapintel_core::Tier;
use gapintel_db::SubscriptionUpdate;
use gapintel_stripe::{CheckoutProduct, CheckoutRequest, SubscriptionSnapshot};
use serde::{Deserialize, Serialize};

use crate::middleware::{RequestId, UserId};

use super::{map_db_error, not_configured, upstream_error, ApiError, ApiResponse, AppState};

#[derive(Debug, Deserialize)]
pub(super) struct CheckoutBody {
    tier: Option<String>,
    channel_name: Option<String>,
    email: String,
}

#[derive(Debug, Serialize)]
pub(super) struct CheckoutItem {
    url: String,
    session_id: String,
}

#[derive(Debug, Deserialize)]
pub(super) struct SyncBody {
    email: String,
}

#[derive(Debug, Serialize)]
pub(super) struct SyncItem {
    success: bool,
    tier: Tier,
    status: String,
    current_period_end: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize)]
pub(super) struct SubscriptionItem {
    tier: Tier,
    status: String,
    analyses_this_month: u32,
    /// `None` means unlimited.
    monthly_quota: Option<u32>,
    remaining: Option<u32>,
    includes_premium: bool,
    current_period_end: Option<DateTime<Utc>>,
}

/// Decide what the checkout is for. Exactly one of `tier` and
/// `channel_name` must be given.
fn checkout_product(
    rid: &str,
    body: &CheckoutBody,
    prices: &gapintel_core::StripePrices,
) -> Result<CheckoutProduct, ApiError> {
    let channel_name = body
        .channel_name
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty());

    match (body.tier.as_deref(), channel_name) {
        (Some(raw), None) => {
            let tier: Tier = raw
                .parse()
                .map_err(|e: gapintel_core::CoreError| {
                    ApiError::new(rid, "validation_error", e.to_string())
                })?;
            if tier == Tier::Free {
                return Err(ApiError::new(
                    rid,
                    "validation_error",
                    "the free tier cannot be purchased",
                ));
            }
            let price_id = prices
                .for_tier(tier)
                .ok_or_else(|| not_configured(rid.to_owned(), &format!("price for tier {tier}")))?;
            Ok(CheckoutProduct::Subscription {
                tier,
                price_id: price_id.to_owned(),
            })
        }
        (None, Some(channel_name)) => {
            let price_id = prices
                .single_report
                .as_deref()
                .ok_or_else(|| not_configured(rid.to_owned(), "single report price"))?;
            Ok(CheckoutProduct::SingleReport {
                channel_name: channel_name.to_owned(),
                price_id: price_id.to_owned(),
            })
        }
        _ => Err(ApiError::new(
            rid,
            "validation_error",
            "provide exactly one of tier or channel_name",
        )),
    }
}

fn validate_email(rid: &str, email: &str) -> Result<String, ApiError> {
    let email = email.trim();
    if email.is_empty() || !email.contains('@') {
        return Err(ApiError::new(rid, "validation_error", "email is not valid"));
    }
    Ok(email.to_owned())
}

/// POST /api/v1/checkout
pub(super) async fn create_checkout(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Extension(UserId(user_id)): Extension<UserId>,
    Json(body): Json<CheckoutBody>,
) -> Result<Json<ApiResponse<CheckoutItem>>, ApiError> {
    let rid = &req_id.0;
    let email = validate_email(rid, &body.email)?;
    let product = checkout_product(rid, &body, &state.config.stripe_prices)?;
    let Some(stripe) = state.stripe.as_ref() else {
        return Err(not_configured(rid.clone(), "Stripe"));
    };

    let session = stripe
        .create_checkout_session(&CheckoutRequest {
            product,
            email,
            user_id,
            app_url: state.config.app_url.clone(),
        })
        .await
        .map_err(|e| upstream_error(rid.clone(), "Stripe", &e))?;

    // create_checkout_session rejects sessions without a URL.
    let url = session.url.unwrap_or_default();
    Ok(Json(ApiResponse::new(
        CheckoutItem {
            url,
            session_id: session.id,
        },
        req_id.0,
    )))
}

/// Tier implied by a Stripe snapshot. Unknown prices fall back to free.
fn tier_from_snapshot(
    snapshot: Option<&SubscriptionSnapshot>,
    prices: &gapintel_core::StripePrices,
) -> Tier {
    let Some(snapshot) = snapshot.filter(|s| s.is_live()) else {
        return Tier::Free;
    };
    match snapshot.price_id.as_deref() {
        Some(price) => prices.tier_for_price(price).unwrap_or_else(|| {
            tracing::warn!(price_id = price, "live subscription on an unknown price");
            Tier::Free
        }),
        None => Tier::Free,
    }
}

/// POST /api/v1/subscription/sync — pull the user's plan from Stripe.
pub(super) async fn sync_subscription(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Extension(UserId(user_id)): Extension<UserId>,
    Json(body): Json<SyncBody>,
) -> Result<Json<ApiResponse<SyncItem>>, ApiError> {
    let rid = &req_id.0;
    let email = validate_email(rid, &body.email)?;
    let Some(stripe) = state.stripe.as_ref() else {
        return Err(not_configured(rid.clone(), "Stripe"));
    };

    let snapshot = stripe
        .subscription_snapshot(&email)
        .await
        .map_err(|e| upstream_error(rid.clone(), "Stripe", &e))?;
    let tier = tier_from_snapshot(snapshot.as_ref(), &state.config.stripe_prices);

    let row = gapintel_db::upsert_subscription(
        &state.pool,
        &SubscriptionUpdate {
            user_id: &user_id,
            email: Some(&email),
            tier,
            status: snapshot.as_ref().map_or("inactive", |s| s.status.as_str()),
            stripe_customer_id: snapshot.as_ref().map(|s| s.customer_id.as_str()),
            stripe_subscription_id: snapshot
                .as_ref()
                .and_then(|s| s.subscription_id.as_deref()),
            current_period_end: snapshot.as_ref().and_then(|s| s.current_period_end),
        },
    )
    .await
    .map_err(|e| map_db_error(rid.clone(), &e))?;

    Ok(Json(ApiResponse::new(
        SyncItem {
            success: true,
            tier,
            status: row.status,
            current_period_end: row.current_period_end,
        },
        req_id.0,
    )))
}

/// GET /api/v1/subscription — plan, usage and quota.
pub(super) async fn get_subscription(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Extension(UserId(user_id)): Extension<UserId>,
) -> Result<Json<ApiResponse<SubscriptionItem>>, ApiError> {
    let row = gapintel_db::get_subscription(&state.pool, &user_id)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;

    let (tier, status, used, period_end) = match row {
        Some(row) => {
            let tier = row
                .parsed_tier()
                .map_err(|e| map_db_error(req_id.0.clone(), &e))?;
            let used = u32::try_from(row.analyses_this_month).unwrap_or(0);
            (tier, row.status, used, row.current_period_end)
        }
        None => (Tier::Free, "inactive".to_string(), 0, None),
    };

    let quota = tier.monthly_report_quota();
    Ok(Json(ApiResponse::new(
        SubscriptionItem {
            tier,
            status,
            analyses_this_month: used,
            monthly_quota: quota,
            remaining: quota.map(|q| q.saturating_sub(used)),
            includes_premium: tier.includes_premium(),
            current_period_end: period_end,
        },
        req_id.0,
    )))
}
