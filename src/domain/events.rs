//! Domain events for the application.
//!
//! Sent via the broadcast event bus and relayed to connected clients
//! over SSE, so the UI can follow hunts, offensives and claims live.

use serde::Serialize;

/// Events sent to connected clients via SSE (Server-Sent Events).
#[derive(Clone, Debug, Serialize)]
#[serde(tag = "type", content = "payload")]
pub enum NotificationEvent {
    HuntStarted {
        hunt_id: i64,
    },
    HuntProgress {
        hunt_id: i64,
        phase: String,
        message: String,
        percent: f64,
    },
    VaultSpotted {
        hunt_id: i64,
        vault_id: i32,
        name: String,
        location: String,
    },
    HuntFinished {
        hunt_id: i64,
        vaults_found: i32,
    },

    OffensiveStarted {
        offensive_id: i32,
        vault_id: i32,
    },
    GuardianReplied {
        offensive_id: i32,
        conviction: i32,
        conviction_delta: i32,
    },
    OffensiveEnded {
        offensive_id: i32,
        status: String,
    },

    VaultUnlocked {
        vault_id: i32,
        name: String,
    },
    LootClaimed {
        vault_id: i32,
        item_id: i32,
        item_name: String,
    },
    VaultEmptied {
        vault_id: i32,
    },

    Error {
        message: String,
    },
    Info {
        message: String,
    },
}
