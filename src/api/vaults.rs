//! Public vault-discovery surface plus the protected loot listing.
//!
//! The four CRUD routes are the public wire contract: bare JSON bodies
//! (no envelope), 201 on create, and 400 rather than 422 for malformed
//! ids and bodies. Request bodies are therefore taken as raw
//! `serde_json::Value` and decoded by hand.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use std::sync::Arc;

use super::{ApiError, ApiResponse, AppState, InsertVault, LootItemDto, UpdateVault, VaultDto};
use crate::api::validation::{
    validate_difficulty, validate_item_amount, validate_vault_id, validate_vault_name,
};
use crate::db::{NewLootItem, NewVault, VaultPatch};
use crate::game::{Difficulty, lootgen};

pub async fn list_vaults(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<VaultDto>>, ApiError> {
    let vaults = state.store().list_vaults().await?;
    Ok(Json(vaults.into_iter().map(VaultDto::from).collect()))
}

pub async fn get_vault(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> Result<Json<VaultDto>, ApiError> {
    validate_vault_id(id)?;

    let vault = state
        .store()
        .get_vault(id)
        .await?
        .ok_or_else(|| ApiError::vault_not_found(id))?;

    Ok(Json(VaultDto::from(vault)))
}

pub async fn create_vault(
    State(state): State<Arc<AppState>>,
    Json(body): Json<serde_json::Value>,
) -> Result<(StatusCode, Json<VaultDto>), ApiError> {
    let input: InsertVault = serde_json::from_value(body)
        .map_err(|e| ApiError::validation(format!("Invalid vault payload: {e}")))?;

    let name = validate_vault_name(&input.name)?.to_string();
    let item_amount = validate_item_amount(input.item_amount)?;
    let difficulty = match input.difficulty.as_deref() {
        Some(d) => validate_difficulty(d)?,
        None => Difficulty::Medium,
    };

    // Roll the vault's loot up front; the rng must not cross an await.
    let loot: Vec<NewLootItem> = {
        let mut rng = rand::rng();
        lootgen::roll_loot(&mut rng, difficulty, item_amount)
            .into_iter()
            .map(|roll| NewLootItem {
                name: roll.name,
                rarity: roll.rarity.to_string(),
                value_cents: roll.value_cents,
            })
            .collect()
    };

    let vault = state
        .store()
        .create_vault(
            NewVault {
                name,
                description: input.description,
                item_amount,
                is_locked: input.is_locked,
                difficulty: difficulty.to_string(),
                is_new: input.is_new,
                is_popular: input.is_popular,
            },
            &loot,
        )
        .await?;

    Ok((StatusCode::CREATED, Json(VaultDto::from(vault))))
}

pub async fn patch_vault(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
    Json(body): Json<serde_json::Value>,
) -> Result<Json<VaultDto>, ApiError> {
    validate_vault_id(id)?;

    let input: UpdateVault = serde_json::from_value(body)
        .map_err(|e| ApiError::validation(format!("Invalid vault payload: {e}")))?;

    let name = match input.name {
        Some(name) => Some(validate_vault_name(&name)?.to_string()),
        None => None,
    };
    let item_amount = input.item_amount.map(validate_item_amount).transpose()?;
    let difficulty = input
        .difficulty
        .as_deref()
        .map(validate_difficulty)
        .transpose()?
        .map(|d| d.to_string());

    let patch = VaultPatch {
        name,
        description: input.description,
        item_amount,
        is_locked: input.is_locked,
        attempts: input.attempts,
        winners: input.winners,
        difficulty,
        last_activity: input.last_activity,
        is_new: input.is_new,
        is_popular: input.is_popular,
    };

    let vault = state
        .store()
        .update_vault(id, patch)
        .await?
        .ok_or_else(|| ApiError::vault_not_found(id))?;

    Ok(Json(VaultDto::from(vault)))
}

/// GET /api/vaults/{id}/items (protected)
/// Loot listing, only once the vault is open.
pub async fn list_vault_items(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<Vec<LootItemDto>>>, ApiError> {
    validate_vault_id(id)?;

    let vault = state
        .store()
        .get_vault(id)
        .await?
        .ok_or_else(|| ApiError::vault_not_found(id))?;

    if vault.is_locked {
        return Err(ApiError::conflict(
            "Vault is still locked. Win an offensive first",
        ));
    }

    let items = state.store().list_loot(id).await?;
    Ok(Json(ApiResponse::success(
        items.into_iter().map(LootItemDto::from).collect(),
    )))
}
