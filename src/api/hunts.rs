//! Hunt trigger and inspection endpoints. The heavy lifting happens on
//! the hunt service's background task; these handlers only start it and
//! read snapshots.

use axum::{
    Json,
    extract::{Path, State},
};
use std::sync::Arc;

use super::{ApiError, ApiResponse, AppState};
use crate::services::HuntSnapshot;

/// POST /hunts
pub async fn start_hunt(
    State(state): State<Arc<AppState>>,
) -> Json<ApiResponse<HuntSnapshot>> {
    let snapshot = state.hunts().clone().start().await;
    Json(ApiResponse::success(snapshot))
}

/// GET /hunts
pub async fn list_hunts(
    State(state): State<Arc<AppState>>,
) -> Json<ApiResponse<Vec<HuntSnapshot>>> {
    Json(ApiResponse::success(state.hunts().list().await))
}

/// GET /hunts/{id}
pub async fn get_hunt(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<HuntSnapshot>>, ApiError> {
    state
        .hunts()
        .get(id)
        .await
        .map(|snapshot| Json(ApiResponse::success(snapshot)))
        .ok_or_else(|| ApiError::not_found("Hunt", id))
}
