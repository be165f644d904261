use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use chrono::{DateTime, Utc};
use gapintel_db::{FolderRow, NewFolder};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::middleware::{RequestId, UserId};

use super::{map_db_error, ApiError, ApiResponse, AppState};

const MAX_FOLDER_NAME_LEN: usize = 60;
const MAX_ICON_LEN: usize = 32;

#[derive(Debug, Serialize)]
pub(super) struct FolderItem {
    id: Uuid,
    name: String,
    color: String,
    icon: String,
    created_at: DateTime<Utc>,
}

impl From<FolderRow> for FolderItem {
    fn from(row: FolderRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            color: row.color,
            icon: row.icon,
            created_at: row.created_at,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(super) struct CreateFolderRequest {
    name: String,
    color: Option<String>,
    icon: Option<String>,
}

#[derive(Debug, Serialize)]
pub(super) struct DeletedFolder {
    id: Uuid,
    deleted: bool,
}

fn is_hex_color(value: &str) -> bool {
    value.len() == 7
        && value.starts_with('#')
        && value[1..].chars().all(|c| c.is_ascii_hexdigit())
}

fn validate_folder(rid: &str, body: &CreateFolderRequest) -> Result<String, ApiError> {
    let name = body.name.trim();
    if name.is_empty() || name.chars().count() > MAX_FOLDER_NAME_LEN {
        return Err(ApiError::new(
            rid,
            "validation_error",
            format!("name must be 1-{MAX_FOLDER_NAME_LEN} characters"),
        ));
    }
    if let Some(color) = body.color.as_deref() {
        if !is_hex_color(color) {
            return Err(ApiError::new(
                rid,
                "validation_error",
                format!("color must look like #6366f1, got '{color}'"),
            ));
        }
    }
    if let Some(icon) = body.icon.as_deref() {
        if icon.trim().is_empty() || icon.len() > MAX_ICON_LEN {
            return Err(ApiError::new(
                rid,
                "validation_error",
                format!("icon must be 1-{MAX_ICON_LEN} characters"),
            ));
        }
    }
    Ok(name.to_owned())
}

/// GET /api/v1/folders
pub(super) async fn list_folders(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Extension(UserId(user_id)): Extension<UserId>,
) -> Result<Json<ApiResponse<Vec<FolderItem>>>, ApiError> {
    let rows = gapintel_db::list_folders(&state.pool, &user_id)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;

    Ok(Json(ApiResponse::new(
        rows.into_iter().map(FolderItem::from).collect(),
        req_id.0,
    )))
}

/// POST /api/v1/folders
pub(super) async fn create_folder(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Extension(UserId(user_id)): Extension<UserId>,
    Json(body): Json<CreateFolderRequest>,
) -> Result<(StatusCode, Json<ApiResponse<FolderItem>>), ApiError> {
    let name = validate_folder(&req_id.0, &body)?;

    let row = gapintel_db::create_folder(
        &state.pool,
        &user_id,
        &NewFolder {
            name: &name,
            color: body.color.as_deref(),
            icon: body.icon.as_deref().map(str::trim),
        },
    )
    .await
    .map_err(|e| match e {
        gapintel_db::DbError::Duplicate => ApiError::new(
            req_id.0.clone(),
            "conflict",
            format!("a folder named '{name}' already exists"),
        ),
        other => map_db_error(req_id.0.clone(), &other),
    })?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::new(FolderItem::from(row), req_id.0)),
    ))
}

/// DELETE /api/v1/folders/{id} — contained reports become unfiled.
pub(super) async fn delete_folder(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Extension(UserId(user_id)): Extension<UserId>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<DeletedFolder>>, ApiError> {
    gapintel_db::delete_folder(&state.pool, &user_id, id)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;

    Ok(Json(ApiResponse::new(
        DeletedFolder { id, deleted: true },
        req_id.0,
    )))
}
