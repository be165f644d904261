//! Report CRUD plus the single-shot status read.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use chrono::{DateTime, Utc};
use gapintel_core::ReportStatus;
use gapintel_db::{NewReport, ReportRow, ReportSummaryRow};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::middleware::{RequestId, UserId};

use super::{current_tier, map_db_error, normalize_limit, ApiError, ApiResponse, AppState};

const MAX_CHANNEL_NAME_LEN: usize = 200;

#[derive(Debug, Serialize)]
pub(super) struct ReportItem {
    id: Uuid,
    channel_name: String,
    channel_thumbnail: Option<String>,
    folder_id: Option<Uuid>,
    status: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<ReportSummaryRow> for ReportItem {
    fn from(row: ReportSummaryRow) -> Self {
        Self {
            id: row.id,
            channel_name: row.channel_name,
            channel_thumbnail: row.channel_thumbnail,
            folder_id: row.folder_id,
            status: row.status,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub(super) struct ReportDetail {
    id: Uuid,
    channel_name: String,
    channel_thumbnail: Option<String>,
    email: Option<String>,
    folder_id: Option<Uuid>,
    status: String,
    report_data: Option<Value>,
    error_message: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl ReportDetail {
    fn from_row(row: ReportRow, include_premium: bool) -> Self {
        let mut report_data = row.report_data;
        if !include_premium {
            if let Some(Value::Object(map)) = report_data.as_mut() {
                map.remove("premium");
            }
        }
        Self {
            id: row.id,
            channel_name: row.channel_name,
            channel_thumbnail: row.channel_thumbnail,
            email: row.email,
            folder_id: row.folder_id,
            status: row.status,
            report_data,
            error_message: row.error_message,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub(super) struct StatusItem {
    id: Uuid,
    status: ReportStatus,
    is_terminal: bool,
    error_message: Option<String>,
    updated_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub(super) struct DeletedItem {
    id: Uuid,
    deleted: bool,
}

#[derive(Debug, Deserialize)]
pub(super) struct CreateReportRequest {
    channel_name: String,
    channel_thumbnail: Option<String>,
    email: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(super) struct ReportQuery {
    folder_id: Option<Uuid>,
    limit: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub(super) struct MoveReportRequest {
    #[serde(default)]
    folder_id: Option<Uuid>,
}

fn validate_create(rid: &str, body: &CreateReportRequest) -> Result<String, ApiError> {
    let name = body.channel_name.trim();
    if name.is_empty() || name.chars().count() > MAX_CHANNEL_NAME_LEN {
        return Err(ApiError::new(
            rid,
            "validation_error",
            format!("channel_name must be 1-{MAX_CHANNEL_NAME_LEN} characters"),
        ));
    }
    if let Some(thumb) = body.channel_thumbnail.as_deref() {
        if !(thumb.starts_with("https://") || thumb.starts_with("http://")) {
            return Err(ApiError::new(
                rid,
                "validation_error",
                "channel_thumbnail must be an http(s) URL",
            ));
        }
    }
    if let Some(email) = body.email.as_deref() {
        if !email.contains('@') {
            return Err(ApiError::new(rid, "validation_error", "email is not valid"));
        }
    }
    Ok(name.to_owned())
}

/// POST /api/v1/reports — queue a report for the worker.
pub(super) async fn create_report(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Extension(UserId(user_id)): Extension<UserId>,
    Json(body): Json<CreateReportRequest>,
) -> Result<(StatusCode, Json<ApiResponse<ReportDetail>>), ApiError> {
    let channel_name = validate_create(&req_id.0, &body)?;

    let row = gapintel_db::create_report_within_quota(
        &state.pool,
        &NewReport {
            user_id: &user_id,
            channel_name: &channel_name,
            channel_thumbnail: body.channel_thumbnail.as_deref(),
            email: body.email.as_deref(),
        },
    )
    .await
    .map_err(|e| map_db_error(req_id.0.clone(), &e))?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::new(ReportDetail::from_row(row, false), req_id.0)),
    ))
}

/// GET /api/v1/reports — newest first, optionally one folder.
pub(super) async fn list_reports(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Extension(UserId(user_id)): Extension<UserId>,
    Query(query): Query<ReportQuery>,
) -> Result<Json<ApiResponse<Vec<ReportItem>>>, ApiError> {
    let rows = gapintel_db::list_reports(
        &state.pool,
        &user_id,
        query.folder_id,
        normalize_limit(query.limit),
    )
    .await
    .map_err(|e| map_db_error(req_id.0.clone(), &e))?;

    let data = rows.into_iter().map(ReportItem::from).collect();
    Ok(Json(ApiResponse::new(data, req_id.0)))
}

/// GET /api/v1/reports/{id} — full row; premium data only for paid tiers.
pub(super) async fn get_report(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Extension(UserId(user_id)): Extension<UserId>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<ReportDetail>>, ApiError> {
    let row = gapintel_db::get_report(&state.pool, &user_id, id)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;
    let tier = current_tier(&state.pool, &user_id)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;

    Ok(Json(ApiResponse::new(
        ReportDetail::from_row(row, tier.includes_premium()),
        req_id.0,
    )))
}

/// DELETE /api/v1/reports/{id}
pub(super) async fn delete_report(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Extension(UserId(user_id)): Extension<UserId>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<DeletedItem>>, ApiError> {
    gapintel_db::delete_report(&state.pool, &user_id, id)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;

    tracing::info!(report_id = %id, user_id = %user_id, "report deleted");
    Ok(Json(ApiResponse::new(DeletedItem { id, deleted: true }, req_id.0)))
}

/// PATCH /api/v1/reports/{id}/folder — `{"folder_id": null}` unfiles.
pub(super) async fn move_report(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Extension(UserId(user_id)): Extension<UserId>,
    Path(id): Path<Uuid>,
    Json(body): Json<MoveReportRequest>,
) -> Result<Json<ApiResponse<ReportItem>>, ApiError> {
    gapintel_db::move_report_to_folder(&state.pool, &user_id, id, body.folder_id)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;

    let row = gapintel_db::get_report(&state.pool, &user_id, id)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;

    Ok(Json(ApiResponse::new(
        ReportItem {
            id: row.id,
            channel_name: row.channel_name,
            channel_thumbnail: row.channel_thumbnail,
            folder_id: row.folder_id,
            status: row.status,
            created_at: row.created_at,
            updated_at: row.updated_at,
        },
        req_id.0,
    )))
}

/// GET /api/v1/reports/{id}/status — one poll.
pub(super) async fn report_status(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Extension(UserId(user_id)): Extension<UserId>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<StatusItem>>, ApiError> {
    let row = gapintel_db::get_report_status(&state.pool, &user_id, id)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;
    let status = row
        .parsed_status()
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;

    Ok(Json(ApiResponse::new(
        StatusItem {
            id: row.id,
            status,
            is_terminal: status.is_terminal(),
            error_message: row.error_message,
            updated_at: row.updated_at,
        },
        req_id.0,
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn row(report_data: Option<Value>) -> ReportRow {
        ReportRow {
            id: Uuid::new_v4(),
            user_id: "u1".into(),
            channel_name: "Ben".into(),
            channel_thumbnail: None,
            email: None,
            folder_id: None,
            status: "completed".into(),
            report_data,
            error_message: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn premium_is_stripped_for_free_users() {
        let data = json!({ "verified_gaps": [], "premium": { "ctr_predictions": [] } });
        let free = ReportDetail::from_row(row(Some(data.clone())), false);
        let paid = ReportDetail::from_row(row(Some(data)), true);
        assert!(free.report_data.as_ref().is_some_and(|d| d.get("premium").is_none()));
        assert!(paid.report_data.as_ref().is_some_and(|d| d.get("premium").is_some()));
    }

    #[test]
    fn create_validation() {
        let ok = CreateReportRequest {
            channel_name: "  Ben  ".into(),
            channel_thumbnail: Some("https://yt3.example/a.jpg".into()),
            email: Some("ben@example.com".into()),
        };
        assert_eq!(validate_create("r", &ok).expect("valid"), "Ben");

        let blank = CreateReportRequest {
            channel_name: "   ".into(),
            channel_thumbnail: None,
            email: None,
        };
        assert!(validate_create("r", &blank).is_err());

        let bad_thumb = CreateReportRequest {
            channel_name: "Ben".into(),
            channel_thumbnail: Some("javascript:alert(1)".into()),
            email: None,
        };
        assert!(validate_create("r", &bad_thumb).is_err());
    }
}
