//! Where the poller reads report status from.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use gapintel_core::ReportStatus;
use gapintel_db::DbError;
use serde::Serialize;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::WorkerError;

/// One observation of a report's lifecycle state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusSnapshot {
    pub report_id: Uuid,
    pub status: ReportStatus,
    pub error_message: Option<String>,
    pub updated_at: DateTime<Utc>,
}

#[async_trait]
pub trait StatusSource: Send + Sync + 'static {
    async fn fetch_status(&self, report_id: Uuid) -> Result<StatusSnapshot, WorkerError>;
}

/// Reads status from `user_reports`, scoped to one user.
#[derive(Debug, Clone)]
pub struct DbStatusSource {
    pool: PgPool,
    user_id: String,
}

impl DbStatusSource {
    #[must_use]
    pub fn new(pool: PgPool, user_id: impl Into<String>) -> Self {
        Self {
            pool,
            user_id: user_id.into(),
        }
    }
}

#[async_trait]
impl StatusSource for DbStatusSource {
    async fn fetch_status(&self, report_id: Uuid) -> Result<StatusSnapshot, WorkerError> {
        let row = gapintel_db::get_report_status(&self.pool, &self.user_id, report_id)
            .await
            .map_err(|e| match e {
                DbError::NotFound => WorkerError::ReportNotFound(report_id),
                other => WorkerError::Source(other.to_string()),
            })?;
        let status = row
            .parsed_status()
            .map_err(|e| WorkerError::Source(e.to_string()))?;

        Ok(StatusSnapshot {
            report_id: row.id,
            status,
            error_message: row.error_message,
            updated_at: row.updated_at,
        })
    }
}
