//! Database operations for `subscriptions`.

use chrono::{DateTime, Utc};
use gapintel_core::Tier;
use serde::Serialize;
use sqlx::PgPool;

use crate::DbError;

#[derive(Debug, Clone, sqlx::FromRow, Serialize)]
pub struct SubscriptionRow {
    pub user_id: String,
    pub email: Option<String>,
    pub tier: String,
    pub status: String,
    pub stripe_customer_id: Option<String>,
    pub stripe_subscription_id: Option<String>,
    pub analyses_this_month: i32,
    pub current_period_end: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl SubscriptionRow {
    /// Parsed `tier` column.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::InvalidColumn`] if the stored value is not a known tier.
    pub fn parsed_tier(&self) -> Result<Tier, DbError> {
        self.tier.parse().map_err(|source| DbError::InvalidColumn {
            column: "tier",
            source,
        })
    }
}

/// Entitlement state pulled from Stripe during a sync.
#[derive(Debug, Clone)]
pub struct SubscriptionUpdate<'a> {
    pub user_id: &'a str,
    pub email: Option<&'a str>,
    pub tier: Tier,
    pub status: &'a str,
    pub stripe_customer_id: Option<&'a str>,
    pub stripe_subscription_id: Option<&'a str>,
    pub current_period_end: Option<DateTime<Utc>>,
}

const SUBSCRIPTION_COLUMNS: &str = "user_id, email, tier, status, stripe_customer_id, \
                                    stripe_subscription_id, analyses_this_month, \
                                    current_period_end, created_at, updated_at";

/// Fetches the subscription row for a user, if one exists.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn get_subscription(
    pool: &PgPool,
    user_id: &str,
) -> Result<Option<SubscriptionRow>, DbError> {
    let row = sqlx::query_as::<_, SubscriptionRow>(&format!(
        "SELECT {SUBSCRIPTION_COLUMNS} FROM subscriptions WHERE user_id = $1"
    ))
    .bind(user_id)
    .fetch_optional(pool)
    .await?;

    Ok(row)
}

/// Inserts or refreshes a user's entitlement. Monthly usage is preserved.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the upsert fails.
pub async fn upsert_subscription(
    pool: &PgPool,
    update: &SubscriptionUpdate<'_>,
) -> Result<SubscriptionRow, DbError> {
    let row = sqlx::query_as::<_, SubscriptionRow>(&format!(
        "INSERT INTO subscriptions \
             (user_id, email, tier, status, stripe_customer_id, stripe_subscription_id, \
              current_period_end) \
         VALUES ($1, $2, $3, $4, $5, $6, $7) \
         ON CONFLICT (user_id) DO UPDATE SET \
             email                  = COALESCE(EXCLUDED.email, subscriptions.email), \
             tier                   = EXCLUDED.tier, \
             status                 = EXCLUDED.status, \
             stripe_customer_id     = COALESCE(EXCLUDED.stripe_customer_id, \
                                               subscriptions.stripe_customer_id), \
             stripe_subscription_id = EXCLUDED.stripe_subscription_id, \
             current_period_end     = EXCLUDED.current_period_end, \
             updated_at             = NOW() \
         RETURNING {SUBSCRIPTION_COLUMNS}"
    ))
    .bind(update.user_id)
    .bind(update.email)
    .bind(update.tier.as_str())
    .bind(update.status)
    .bind(update.stripe_customer_id)
    .bind(update.stripe_subscription_id)
    .bind(update.current_period_end)
    .fetch_one(pool)
    .await?;

    tracing::info!(
        user_id = update.user_id,
        tier = %update.tier,
        status = update.status,
        "subscription synced"
    );
    Ok(row)
}

/// Zeroes every user's monthly report counter. Returns the rows touched.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the update fails.
pub async fn reset_monthly_usage(pool: &PgPool) -> Result<u64, DbError> {
    let result = sqlx::query(
        "UPDATE subscriptions SET analyses_this_month = 0, updated_at = NOW() \
         WHERE analyses_this_month <> 0",
    )
    .execute(pool)
    .await?;

    Ok(result.rows_affected())
}
