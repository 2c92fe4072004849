//! Mock purchase of attempt time. Card input is validated with the
//! billing helpers but no charge is ever made.

use axum::{Extension, Json, extract::State};
use chrono::Datelike;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::auth::AuthedUser;
use super::{ApiError, ApiResponse, AppState};
use crate::game::billing::{mask_card_number, validate_card};

#[derive(Deserialize)]
pub struct PurchaseTimeRequest {
    pub card_number: String,
    /// MM/YY
    pub expiry: String,
    pub cvc: String,
}

#[derive(Serialize)]
pub struct PurchaseTimeResponse {
    pub seconds_added: i32,
    pub time_balance_seconds: i32,
    pub card: String,
}

/// POST /billing/time
pub async fn purchase_time(
    State(state): State<Arc<AppState>>,
    Extension(AuthedUser(user)): Extension<AuthedUser>,
    Json(payload): Json<PurchaseTimeRequest>,
) -> Result<Json<ApiResponse<PurchaseTimeResponse>>, ApiError> {
    let now = chrono::Utc::now();
    let now = (now.year() as u16, now.month() as u8);

    validate_card(&payload.card_number, &payload.expiry, &payload.cvc, now)
        .map_err(|e| ApiError::validation(e.to_string()))?;

    let seconds = state.config().read().await.game.purchase_bundle_seconds;
    let balance = state.store().credit_user_time(user.id, seconds).await?;

    tracing::info!(
        "User {} purchased {}s of attempt time",
        user.username,
        seconds
    );

    Ok(Json(ApiResponse::success(PurchaseTimeResponse {
        seconds_added: seconds,
        time_balance_seconds: balance,
        card: mask_card_number(&payload.card_number),
    })))
}
