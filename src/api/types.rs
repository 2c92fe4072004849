use serde::{Deserialize, Serialize};

use crate::entities::{chat_messages, loot_items, offensives, vaults};
use crate::game::Difficulty;

#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    pub const fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
        }
    }
}

/// Vault wire shape. camelCase field names are part of the public
/// discovery contract and are kept as-is.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VaultDto {
    pub id: i32,
    pub name: String,
    pub description: Option<String>,
    pub item_amount: i32,
    pub is_locked: bool,
    pub attempts: i32,
    pub winners: i32,
    pub difficulty: String,
    pub last_activity: Option<String>,
    pub is_new: bool,
    pub is_popular: bool,
    pub created_at: String,
}

impl From<vaults::Model> for VaultDto {
    fn from(model: vaults::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            description: model.description,
            item_amount: model.item_amount,
            is_locked: model.is_locked,
            attempts: model.attempts,
            winners: model.winners,
            difficulty: model.difficulty,
            last_activity: model.last_activity,
            is_new: model.is_new,
            is_popular: model.is_popular,
            created_at: model.created_at,
        }
    }
}

/// Create payload for `POST /api/vaults`. Unknown fields are rejected
/// so client typos fail loudly instead of being dropped.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct InsertVault {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub item_amount: i32,
    #[serde(default = "default_true")]
    pub is_locked: bool,
    #[serde(default)]
    pub difficulty: Option<String>,
    #[serde(default = "default_true")]
    pub is_new: bool,
    #[serde(default)]
    pub is_popular: bool,
}

const fn default_true() -> bool {
    true
}

/// Patch payload for `PATCH /api/vaults/{id}`: only supplied fields are
/// written.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct UpdateVault {
    pub name: Option<String>,
    // Nested Option so "description": null clears the field while an
    // absent key leaves it untouched.
    #[serde(default, with = "double_option")]
    pub description: Option<Option<String>>,
    pub item_amount: Option<i32>,
    pub is_locked: Option<bool>,
    pub attempts: Option<i32>,
    pub winners: Option<i32>,
    pub difficulty: Option<String>,
    #[serde(default, with = "double_option")]
    pub last_activity: Option<Option<String>>,
    pub is_new: Option<bool>,
    pub is_popular: Option<bool>,
}

mod double_option {
    use serde::{Deserialize, Deserializer};

    pub fn deserialize<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
    where
        T: Deserialize<'de>,
        D: Deserializer<'de>,
    {
        Option::<T>::deserialize(deserializer).map(Some)
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LootItemDto {
    pub id: i32,
    pub vault_id: i32,
    pub name: String,
    pub rarity: String,
    pub value_cents: i64,
    pub claimed: bool,
    pub claimed_by: Option<i32>,
    pub claimed_at: Option<String>,
}

impl From<loot_items::Model> for LootItemDto {
    fn from(model: loot_items::Model) -> Self {
        Self {
            id: model.id,
            vault_id: model.vault_id,
            name: model.name,
            rarity: model.rarity,
            value_cents: model.value_cents,
            claimed: model.claimed,
            claimed_by: model.claimed_by,
            claimed_at: model.claimed_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct OffensiveDto {
    pub id: i32,
    pub vault_id: i32,
    pub user_id: i32,
    pub conviction: i32,
    pub unlock_threshold: i32,
    pub time_remaining_seconds: i32,
    pub status: String,
    pub started_at: String,
    pub updated_at: String,
}

impl OffensiveDto {
    pub fn from_model(model: offensives::Model, difficulty: Difficulty) -> Self {
        Self {
            id: model.id,
            vault_id: model.vault_id,
            user_id: model.user_id,
            conviction: model.conviction,
            unlock_threshold: difficulty.unlock_threshold(),
            time_remaining_seconds: model.time_remaining_seconds,
            status: model.status,
            started_at: model.started_at,
            updated_at: model.updated_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ChatMessageDto {
    pub id: i64,
    pub sender: String,
    pub body: String,
    pub conviction_delta: i32,
    pub created_at: String,
}

impl From<chat_messages::Model> for ChatMessageDto {
    fn from(model: chat_messages::Model) -> Self {
        Self {
            id: model.id,
            sender: model.sender,
            body: model.body,
            conviction_delta: model.conviction_delta,
            created_at: model.created_at,
        }
    }
}

/// One chat round-trip: the user's message and the guardian's answer.
#[derive(Debug, Serialize)]
pub struct ExchangeDto {
    pub user_message: ChatMessageDto,
    pub guardian_message: ChatMessageDto,
    pub conviction: i32,
    pub conviction_delta: i32,
    pub won: bool,
    pub vault: VaultDto,
}

#[derive(Debug, Serialize)]
pub struct SystemStatus {
    pub version: String,
    pub uptime: u64,
    pub vaults: u64,
    pub active_offensives: usize,
    pub hunts_running: usize,
}
