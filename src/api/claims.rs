//! Loot claim settlement.
//!
//! The client records the press-and-hold gesture as pointer samples and
//! submits the trace; the server replays it through the shared claim
//! state machine and only settles when the hold legitimately completed.

use axum::{
    Extension, Json,
    extract::{Path, State},
};
use serde::Deserialize;
use std::sync::Arc;

use super::auth::AuthedUser;
use super::{ApiError, ApiResponse, AppState, LootItemDto};
use crate::api::validation::validate_vault_id;
use crate::db::ClaimRejection;
use crate::game::GestureSample;
use crate::services::offensives::ClaimFailure;

#[derive(Deserialize)]
pub struct ClaimRequest {
    pub trace: Vec<GestureSample>,
}

/// POST /vaults/{id}/items/{item_id}/claim
pub async fn claim_item(
    State(state): State<Arc<AppState>>,
    Extension(AuthedUser(user)): Extension<AuthedUser>,
    Path((vault_id, item_id)): Path<(i32, i32)>,
    Json(payload): Json<ClaimRequest>,
) -> Result<Json<ApiResponse<LootItemDto>>, ApiError> {
    validate_vault_id(vault_id)?;
    if item_id <= 0 {
        return Err(ApiError::validation(format!(
            "Invalid item ID: {}. ID must be a positive integer",
            item_id
        )));
    }

    let settled = state
        .offensives()
        .settle_claim(vault_id, item_id, user.id, &payload.trace)
        .await?;

    match settled {
        Ok(item) => Ok(Json(ApiResponse::success(LootItemDto::from(item)))),
        Err(failure) => Err(claim_failure_to_error(&failure)),
    }
}

fn claim_failure_to_error(failure: &ClaimFailure) -> ApiError {
    match failure {
        ClaimFailure::VaultLocked => {
            ApiError::conflict("Vault is still locked. Win an offensive first")
        }
        ClaimFailure::GestureCancelled(reason) => ApiError::validation(format!(
            "Claim gesture did not complete ({})",
            match reason {
                crate::game::claim::CancelReason::Moved => "pointer moved past threshold",
                crate::game::claim::CancelReason::ReleasedEarly => "released early",
            }
        )),
        ClaimFailure::BadTrace(err) => ApiError::validation(err.to_string()),
        ClaimFailure::Rejected(ClaimRejection::NotFound) => {
            ApiError::NotFound("Loot item not found".to_string())
        }
        ClaimFailure::Rejected(ClaimRejection::WrongVault) => {
            ApiError::validation("Loot item belongs to a different vault")
        }
        ClaimFailure::Rejected(ClaimRejection::AlreadyClaimed) => {
            ApiError::conflict("Loot item was already claimed")
        }
    }
}
