use axum::{
    extract::{Path, State},
    Extension, Json,
};
use gapintel_core::ReportStatus;
use gapintel_metrics::DashboardReport;
use serde::Serialize;
use uuid::Uuid;

use crate::middleware::{RequestId, UserId};

use super::{current_tier, map_db_error, ApiError, ApiResponse, AppState};

#[derive(Debug, Serialize)]
pub(super) struct DashboardResponse {
    report_id: Uuid,
    channel_name: String,
    status: ReportStatus,
    error_message: Option<String>,
    /// Present only for completed reports.
    dashboard: Option<DashboardReport>,
}

/// GET /api/v1/reports/{id}/dashboard — derived metrics for a finished report.
///
/// Pending and processing reports answer `conflict`; failed reports answer
/// with their state and no dashboard.
pub(super) async fn report_dashboard(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Extension(UserId(user_id)): Extension<UserId>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<DashboardResponse>>, ApiError> {
    let row = gapintel_db::get_report(&state.pool, &user_id, id)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;
    let status = row
        .parsed_status()
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;

    let dashboard = match status {
        ReportStatus::Pending | ReportStatus::Processing => {
            return Err(ApiError::new(
                req_id.0,
                "conflict",
                format!("report is still {status}"),
            ));
        }
        ReportStatus::Failed => None,
        ReportStatus::Completed => {
            let tier = current_tier(&state.pool, &user_id)
                .await
                .map_err(|e| map_db_error(req_id.0.clone(), &e))?;
            Some(DashboardReport::from_report_data(
                row.report_data.as_ref(),
                tier.includes_premium(),
            ))
        }
    };

    Ok(Json(ApiResponse::new(
        DashboardResponse {
            report_id: row.id,
            channel_name: row.channel_name,
            status,
            error_message: row.error_message,
            dashboard,
        },
        req_id.0,
    )))
}
