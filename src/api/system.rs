//! System status and health endpoints.

use axum::{Json, extract::State};
use serde::Serialize;
use std::sync::Arc;

use super::{ApiError, ApiResponse, AppState, SystemStatus};

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub database: bool,
}

/// GET /system/status
pub async fn get_status(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<SystemStatus>>, ApiError> {
    let vaults = state.store().vault_count().await?;
    let active_offensives = state.store().list_active_offensives().await?.len();
    let hunts_running = state
        .hunts()
        .list()
        .await
        .iter()
        .filter(|h| !h.finished)
        .count();

    Ok(Json(ApiResponse::success(SystemStatus {
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime: state.start_time.elapsed().as_secs(),
        vaults,
        active_offensives,
        hunts_running,
    })))
}

/// GET /system/health (public)
pub async fn get_health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let database = state.store().ping().await.is_ok();
    Json(HealthResponse {
        status: if database { "ok" } else { "degraded" },
        database,
    })
}
