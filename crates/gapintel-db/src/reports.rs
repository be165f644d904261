//! Database operations for `user_reports`.

use chrono::{DateTime, Utc};
use gapintel_core::{ReportStatus, Tier};
use serde::Serialize;
use sqlx::PgPool;
use uuid::Uuid;

use crate::DbError;

/// A full row from `user_reports`, including the worker's `report_data`.
#[derive(Debug, Clone, sqlx::FromRow, Serialize)]
pub struct ReportRow {
    pub id: Uuid,
    pub user_id: String,
    pub channel_name: String,
    pub channel_thumbnail: Option<String>,
    pub email: Option<String>,
    pub folder_id: Option<Uuid>,
    pub status: String,
    pub report_data: Option<serde_json::Value>,
    pub error_message: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A `user_reports` row without the analysis payload, for listings.
#[derive(Debug, Clone, sqlx::FromRow, Serialize)]
pub struct ReportSummaryRow {
    pub id: Uuid,
    pub channel_name: String,
    pub channel_thumbnail: Option<String>,
    pub folder_id: Option<Uuid>,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, sqlx::FromRow, Serialize)]
pub struct ReportStatusRow {
    pub id: Uuid,
    pub status: String,
    pub error_message: Option<String>,
    pub updated_at: DateTime<Utc>,
}

impl ReportRow {
    /// Parsed `status` column.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::InvalidColumn`] if the stored value is not a known status.
    pub fn parsed_status(&self) -> Result<ReportStatus, DbError> {
        parse_status(&self.status)
    }
}

impl ReportStatusRow {
    /// Parsed `status` column.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::InvalidColumn`] if the stored value is not a known status.
    pub fn parsed_status(&self) -> Result<ReportStatus, DbError> {
        parse_status(&self.status)
    }
}

fn parse_status(raw: &str) -> Result<ReportStatus, DbError> {
    raw.parse().map_err(|source| DbError::InvalidColumn {
        column: "status",
        source,
    })
}

#[derive(Debug, Clone)]
pub struct NewReport<'a> {
    pub user_id: &'a str,
    pub channel_name: &'a str,
    pub channel_thumbnail: Option<&'a str>,
    pub email: Option<&'a str>,
}

const REPORT_COLUMNS: &str = "id, user_id, channel_name, channel_thumbnail, email, folder_id, \
                              status, report_data, error_message, created_at, updated_at";

/// Inserts a `pending` report and counts it against the user's monthly quota.
///
/// Both writes happen in one transaction with the subscription row locked,
/// so concurrent requests cannot overrun the quota. Users without a
/// subscription row are treated as `free`.
///
/// # Errors
///
/// Returns [`DbError::QuotaExceeded`] when the tier's monthly quota is used
/// up, [`DbError::InvalidColumn`] if the stored tier is unknown, or
/// [`DbError::Sqlx`] if any statement fails.
pub async fn create_report_within_quota(
    pool: &PgPool,
    report: &NewReport<'_>,
) -> Result<ReportRow, DbError> {
    let mut tx = pool.begin().await?;

    sqlx::query(
        "INSERT INTO subscriptions (user_id, email) VALUES ($1, $2) \
         ON CONFLICT (user_id) DO NOTHING",
    )
    .bind(report.user_id)
    .bind(report.email)
    .execute(&mut *tx)
    .await?;

    let (tier, used): (String, i32) = sqlx::query_as(
        "SELECT tier, analyses_this_month FROM subscriptions WHERE user_id = $1 FOR UPDATE",
    )
    .bind(report.user_id)
    .fetch_one(&mut *tx)
    .await?;

    let tier: Tier = tier.parse().map_err(|source| DbError::InvalidColumn {
        column: "tier",
        source,
    })?;
    let used = u32::try_from(used).unwrap_or(0);
    if !tier.allows_another_report(used) {
        return Err(DbError::QuotaExceeded {
            used,
            limit: tier.monthly_report_quota().unwrap_or(u32::MAX),
        });
    }

    sqlx::query(
        "UPDATE subscriptions \
         SET analyses_this_month = analyses_this_month + 1, updated_at = NOW() \
         WHERE user_id = $1",
    )
    .bind(report.user_id)
    .execute(&mut *tx)
    .await?;

    let row = sqlx::query_as::<_, ReportRow>(&format!(
        "INSERT INTO user_reports (id, user_id, channel_name, channel_thumbnail, email, status) \
         VALUES ($1, $2, $3, $4, $5, 'pending') \
         RETURNING {REPORT_COLUMNS}"
    ))
    .bind(Uuid::new_v4())
    .bind(report.user_id)
    .bind(report.channel_name)
    .bind(report.channel_thumbnail)
    .bind(report.email)
    .fetch_one(&mut *tx)
    .await?;

    tx.commit().await?;

    tracing::info!(
        report_id = %row.id,
        user_id = report.user_id,
        tier = %tier,
        used = used + 1,
        "report created"
    );
    Ok(row)
}

/// Returns a user's reports, newest first, optionally restricted to one folder.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_reports(
    pool: &PgPool,
    user_id: &str,
    folder_id: Option<Uuid>,
    limit: i64,
) -> Result<Vec<ReportSummaryRow>, DbError> {
    let rows = sqlx::query_as::<_, ReportSummaryRow>(
        "SELECT id, channel_name, channel_thumbnail, folder_id, status, created_at, updated_at \
         FROM user_reports \
         WHERE user_id = $1 AND ($2::uuid IS NULL OR folder_id = $2) \
         ORDER BY created_at DESC, id DESC \
         LIMIT $3",
    )
    .bind(user_id)
    .bind(folder_id)
    .bind(limit)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// Fetches one report owned by `user_id`.
///
/// # Errors
///
/// Returns [`DbError::NotFound`] if the report does not exist or belongs to
/// another user, or [`DbError::Sqlx`] if the query fails.
pub async fn get_report(pool: &PgPool, user_id: &str, id: Uuid) -> Result<ReportRow, DbError> {
    sqlx::query_as::<_, ReportRow>(&format!(
        "SELECT {REPORT_COLUMNS} FROM user_reports WHERE id = $1 AND user_id = $2"
    ))
    .bind(id)
    .bind(user_id)
    .fetch_optional(pool)
    .await?
    .ok_or(DbError::NotFound)
}

/// Lightweight status read used by pollers.
///
/// # Errors
///
/// Returns [`DbError::NotFound`] if the report does not exist or belongs to
/// another user, or [`DbError::Sqlx`] if the query fails.
pub async fn get_report_status(
    pool: &PgPool,
    user_id: &str,
    id: Uuid,
) -> Result<ReportStatusRow, DbError> {
    sqlx::query_as::<_, ReportStatusRow>(
        "SELECT id, status, error_message, updated_at \
         FROM user_reports WHERE id = $1 AND user_id = $2",
    )
    .bind(id)
    .bind(user_id)
    .fetch_optional(pool)
    .await?
    .ok_or(DbError::NotFound)
}

/// Deletes a report owned by `user_id`.
///
/// # Errors
///
/// Returns [`DbError::NotFound`] if nothing was deleted, or [`DbError::Sqlx`]
/// if the statement fails.
pub async fn delete_report(pool: &PgPool, user_id: &str, id: Uuid) -> Result<(), DbError> {
    let result = sqlx::query("DELETE FROM user_reports WHERE id = $1 AND user_id = $2")
        .bind(id)
        .bind(user_id)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(DbError::NotFound);
    }
    Ok(())
}

/// Files a report into a folder, or back to unfiled with `None`.
///
/// The folder must belong to the same user.
///
/// # Errors
///
/// Returns [`DbError::NotFound`] if the report or the folder is missing or
/// owned by someone else, or [`DbError::Sqlx`] if the statement fails.
pub async fn move_report_to_folder(
    pool: &PgPool,
    user_id: &str,
    id: Uuid,
    folder_id: Option<Uuid>,
) -> Result<(), DbError> {
    let result = sqlx::query(
        "UPDATE user_reports SET folder_id = $3, updated_at = NOW() \
         WHERE id = $1 AND user_id = $2 \
           AND ($3::uuid IS NULL \
                OR EXISTS (SELECT 1 FROM folders WHERE id = $3 AND user_id = $2))",
    )
    .bind(id)
    .bind(user_id)
    .bind(folder_id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DbError::NotFound);
    }
    Ok(())
}

/// Applies a worker status write, rejecting moves the lifecycle forbids.
///
/// `report_data` and `error_message` are only overwritten when provided.
///
/// # Errors
///
/// Returns [`DbError::InvalidStatusTransition`] if the current status cannot
/// move to `to` (including when the report does not exist), or
/// [`DbError::Sqlx`] if the statement fails.
pub async fn update_report_status(
    pool: &PgPool,
    id: Uuid,
    to: ReportStatus,
    report_data: Option<&serde_json::Value>,
    error_message: Option<&str>,
) -> Result<(), DbError> {
    let allowed_from: Vec<&str> = [ReportStatus::Pending, ReportStatus::Processing]
        .into_iter()
        .filter(|from| from.can_transition_to(to))
        .map(ReportStatus::as_str)
        .collect();

    let result = sqlx::query(
        "UPDATE user_reports \
         SET status = $2, \
             report_data = COALESCE($3, report_data), \
             error_message = COALESCE($4, error_message), \
             updated_at = NOW() \
         WHERE id = $1 AND status = ANY($5)",
    )
    .bind(id)
    .bind(to.as_str())
    .bind(report_data)
    .bind(error_message)
    .bind(allowed_from)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DbError::InvalidStatusTransition { id, to });
    }

    tracing::debug!(report_id = %id, status = %to, "report status updated");
    Ok(())
}
