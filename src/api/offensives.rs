//! Offensive endpoints: starting an attempt against a vault's guardian,
//! chatting with it, and giving up.

use axum::{
    Extension, Json,
    extract::{Path, State},
};
use serde::Deserialize;
use std::sync::Arc;

use super::auth::AuthedUser;
use super::{ApiError, ApiResponse, AppState, ChatMessageDto, ExchangeDto, OffensiveDto, VaultDto};
use crate::api::validation::{validate_message_body, validate_offensive_id, validate_vault_id};
use crate::game::Difficulty;

#[derive(Deserialize)]
pub struct SendMessageRequest {
    pub body: String,
}

/// POST /vaults/{id}/offensives
pub async fn start_offensive(
    State(state): State<Arc<AppState>>,
    Extension(AuthedUser(user)): Extension<AuthedUser>,
    Path(vault_id): Path<i32>,
) -> Result<Json<ApiResponse<OffensiveDto>>, ApiError> {
    validate_vault_id(vault_id)?;

    let offensive = state.offensives().start(vault_id, user.id).await?;
    let difficulty = vault_difficulty(&state, vault_id).await?;

    Ok(Json(ApiResponse::success(OffensiveDto::from_model(
        offensive, difficulty,
    ))))
}

/// GET /offensives
pub async fn list_my_offensives(
    State(state): State<Arc<AppState>>,
    Extension(AuthedUser(user)): Extension<AuthedUser>,
) -> Result<Json<ApiResponse<Vec<OffensiveDto>>>, ApiError> {
    let offensives = state.store().list_offensives_for_user(user.id).await?;

    let mut dtos = Vec::with_capacity(offensives.len());
    for offensive in offensives {
        let difficulty = vault_difficulty(&state, offensive.vault_id).await?;
        dtos.push(OffensiveDto::from_model(offensive, difficulty));
    }

    Ok(Json(ApiResponse::success(dtos)))
}

/// GET /offensives/{id}
pub async fn get_offensive(
    State(state): State<Arc<AppState>>,
    Extension(AuthedUser(user)): Extension<AuthedUser>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<OffensiveDto>>, ApiError> {
    validate_offensive_id(id)?;

    let offensive = state
        .store()
        .get_offensive(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Offensive", id))?;

    if offensive.user_id != user.id {
        return Err(ApiError::Forbidden(
            "Offensive belongs to another user".to_string(),
        ));
    }

    let difficulty = vault_difficulty(&state, offensive.vault_id).await?;
    Ok(Json(ApiResponse::success(OffensiveDto::from_model(
        offensive, difficulty,
    ))))
}

/// POST /offensives/{id}/messages
/// One chat round-trip: the guardian replies synchronously and the
/// conviction delta is applied before the response is built.
pub async fn post_message(
    State(state): State<Arc<AppState>>,
    Extension(AuthedUser(user)): Extension<AuthedUser>,
    Path(id): Path<i32>,
    Json(payload): Json<SendMessageRequest>,
) -> Result<Json<ApiResponse<ExchangeDto>>, ApiError> {
    validate_offensive_id(id)?;
    let body = validate_message_body(&payload.body)?;

    let outcome = state.offensives().send_message(id, user.id, body).await?;

    Ok(Json(ApiResponse::success(ExchangeDto {
        user_message: ChatMessageDto::from(outcome.user_message),
        guardian_message: ChatMessageDto::from(outcome.guardian_message),
        conviction: outcome.conviction,
        conviction_delta: outcome.conviction_delta,
        won: outcome.won,
        vault: VaultDto::from(outcome.vault),
    })))
}

/// GET /offensives/{id}/messages
pub async fn list_messages(
    State(state): State<Arc<AppState>>,
    Extension(AuthedUser(user)): Extension<AuthedUser>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<Vec<ChatMessageDto>>>, ApiError> {
    validate_offensive_id(id)?;

    let offensive = state
        .store()
        .get_offensive(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Offensive", id))?;

    if offensive.user_id != user.id {
        return Err(ApiError::Forbidden(
            "Offensive belongs to another user".to_string(),
        ));
    }

    let messages = state.store().list_chat_messages(id).await?;
    Ok(Json(ApiResponse::success(
        messages.into_iter().map(ChatMessageDto::from).collect(),
    )))
}

/// POST /offensives/{id}/forfeit
pub async fn forfeit_offensive(
    State(state): State<Arc<AppState>>,
    Extension(AuthedUser(user)): Extension<AuthedUser>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<super::auth::MessageResponse>>, ApiError> {
    validate_offensive_id(id)?;

    state.offensives().forfeit(id, user.id).await?;

    Ok(Json(ApiResponse::success(super::auth::MessageResponse {
        message: "Offensive forfeited".to_string(),
    })))
}

async fn vault_difficulty(state: &AppState, vault_id: i32) -> Result<Difficulty, ApiError> {
    let vault = state
        .store()
        .get_vault(vault_id)
        .await?
        .ok_or_else(|| ApiError::vault_not_found(vault_id))?;
    Ok(Difficulty::from_stored(&vault.difficulty))
}
