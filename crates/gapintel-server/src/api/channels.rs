use axum::{
    extract::{Query, State},
    Extension, Json,
};
use gapintel_core::ChannelInput;
use gapintel_youtube::{ChannelInfo, YoutubeError};
use serde::Deserialize;

use crate::middleware::RequestId;

use super::{not_configured, upstream_error, ApiError, ApiResponse, AppState};

#[derive(Debug, Deserialize)]
pub(super) struct LookupQuery {
    #[serde(default)]
    input: String,
}

/// GET /api/v1/channels/lookup?input= — resolve a URL, handle, id or name.
pub(super) async fn lookup_channel(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(query): Query<LookupQuery>,
) -> Result<Json<ApiResponse<ChannelInfo>>, ApiError> {
    let input = ChannelInput::parse(&query.input)
        .map_err(|e| ApiError::new(req_id.0.clone(), "validation_error", e.to_string()))?;
    let Some(youtube) = state.youtube.as_ref() else {
        return Err(not_configured(req_id.0, "YouTube lookup"));
    };

    let info = youtube.lookup_channel(&input).await.map_err(|e| match e {
        YoutubeError::ChannelNotFound(_) => {
            ApiError::new(req_id.0.clone(), "not_found", "no channel matches that input")
        }
        other => upstream_error(req_id.0.clone(), "YouTube", &other),
    })?;

    Ok(Json(ApiResponse::new(info, req_id.0)))
}
