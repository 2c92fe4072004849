//! Offensive lifecycle: the active attempt a user runs against a
//! vault's guardian. Ties together the store, the guardian engine and
//! the event bus.

use rand::SeedableRng;
use rand::rngs::StdRng;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::{RwLock, broadcast};
use tracing::{info, warn};

use crate::config::Config;
use crate::db::{Store, sender, status};
use crate::domain::NotificationEvent;
use crate::entities::{chat_messages, offensives, vaults};
use crate::game::guardian::{GuardianEngine, apply_delta};
use crate::game::{Difficulty, claim};

#[derive(Debug, Error)]
pub enum OffensiveError {
    #[error("Vault {0} not found")]
    VaultNotFound(i32),
    #[error("Vault {0} is already open")]
    VaultAlreadyOpen(i32),
    #[error("An offensive against this vault is already running")]
    AlreadyEngaged,
    #[error("Not enough attempt time. Purchase more and retry")]
    InsufficientTime,
    #[error("Offensive {0} not found")]
    NotFound(i32),
    #[error("Offensive belongs to another user")]
    NotYours,
    #[error("Offensive is no longer active")]
    NotActive,
    #[error("Offensive ran out of time")]
    Expired,
    #[error(transparent)]
    Storage(#[from] anyhow::Error),
}

/// What a single chat exchange produced.
pub struct ExchangeOutcome {
    pub user_message: chat_messages::Model,
    pub guardian_message: chat_messages::Model,
    pub conviction: i32,
    pub conviction_delta: i32,
    pub won: bool,
    pub vault: vaults::Model,
}

pub struct OffensiveService {
    store: Store,
    guardian: GuardianEngine,
    config: Arc<RwLock<Config>>,
    event_bus: broadcast::Sender<NotificationEvent>,
}

impl OffensiveService {
    pub fn new(
        store: Store,
        config: Arc<RwLock<Config>>,
        event_bus: broadcast::Sender<NotificationEvent>,
    ) -> Self {
        Self {
            store,
            guardian: GuardianEngine::new(),
            config,
            event_bus,
        }
    }

    /// Opens an offensive: requires a locked vault, no other active
    /// offensive by this user on it, and enough purchased time.
    pub async fn start(
        &self,
        vault_id: i32,
        user_id: i32,
    ) -> Result<offensives::Model, OffensiveError> {
        let vault = self
            .store
            .get_vault(vault_id)
            .await?
            .ok_or(OffensiveError::VaultNotFound(vault_id))?;

        if !vault.is_locked {
            return Err(OffensiveError::VaultAlreadyOpen(vault_id));
        }

        if self
            .store
            .find_active_offensive(user_id, vault_id)
            .await?
            .is_some()
        {
            return Err(OffensiveError::AlreadyEngaged);
        }

        let cost = self.config.read().await.game.offensive_cost_seconds;
        if self.store.debit_user_time(user_id, cost).await?.is_none() {
            return Err(OffensiveError::InsufficientTime);
        }

        let offensive = self.store.create_offensive(vault_id, user_id, cost).await?;
        self.store.increment_vault_attempts(vault_id).await?;

        let _ = self.event_bus.send(NotificationEvent::OffensiveStarted {
            offensive_id: offensive.id,
            vault_id,
        });

        Ok(offensive)
    }

    /// Handles one user message: scores it, applies the conviction
    /// delta, records both sides of the exchange and settles a win when
    /// the guardian's threshold is crossed.
    pub async fn send_message(
        &self,
        offensive_id: i32,
        user_id: i32,
        body: &str,
    ) -> Result<ExchangeOutcome, OffensiveError> {
        let offensive = self.checked_active(offensive_id, user_id).await?;

        let vault = self
            .store
            .get_vault(offensive.vault_id)
            .await?
            .ok_or(OffensiveError::VaultNotFound(offensive.vault_id))?;
        let difficulty = Difficulty::from_stored(&vault.difficulty);

        // StdRng rather than the thread-local rng: the handle lives
        // across awaits, so it must be Send.
        let mut rng = StdRng::from_os_rng();
        let delta = self.guardian.score_message(body, &mut rng);
        let conviction = apply_delta(offensive.conviction, delta);
        let won = conviction >= difficulty.unlock_threshold();

        let user_message = self
            .store
            .add_chat_message(offensive_id, sender::USER, body, 0)
            .await?;

        let reply = self.guardian.reply(conviction, difficulty, &mut rng);
        let guardian_message = self
            .store
            .add_chat_message(offensive_id, sender::GUARDIAN, reply, delta)
            .await?;

        self.store
            .set_offensive_conviction(offensive_id, conviction)
            .await?;

        let _ = self.event_bus.send(NotificationEvent::GuardianReplied {
            offensive_id,
            conviction,
            conviction_delta: delta,
        });

        let vault = if won {
            self.store.finish_offensive(offensive_id, status::WON).await?;
            let unlocked = self
                .store
                .record_vault_unlock(vault.id)
                .await?
                .unwrap_or(vault);

            info!(
                "Vault {} unlocked by offensive {} at conviction {}",
                unlocked.id, offensive_id, conviction
            );
            let _ = self.event_bus.send(NotificationEvent::VaultUnlocked {
                vault_id: unlocked.id,
                name: unlocked.name.clone(),
            });
            let _ = self.event_bus.send(NotificationEvent::OffensiveEnded {
                offensive_id,
                status: status::WON.to_string(),
            });
            unlocked
        } else {
            self.store.touch_vault_activity(vault.id).await?;
            vault
        };

        Ok(ExchangeOutcome {
            user_message,
            guardian_message,
            conviction,
            conviction_delta: delta,
            won,
            vault,
        })
    }

    pub async fn forfeit(&self, offensive_id: i32, user_id: i32) -> Result<(), OffensiveError> {
        self.checked_active(offensive_id, user_id).await?;
        self.store
            .finish_offensive(offensive_id, status::FORFEITED)
            .await?;
        let _ = self.event_bus.send(NotificationEvent::OffensiveEnded {
            offensive_id,
            status: status::FORFEITED.to_string(),
        });
        Ok(())
    }

    /// Settles a loot claim from a recorded press-and-hold trace.
    /// The trace must legitimately complete the hold before anything is
    /// written.
    pub async fn settle_claim(
        &self,
        vault_id: i32,
        item_id: i32,
        user_id: i32,
        trace: &[claim::GestureSample],
    ) -> Result<Result<crate::entities::loot_items::Model, ClaimFailure>, OffensiveError> {
        let vault = self
            .store
            .get_vault(vault_id)
            .await?
            .ok_or(OffensiveError::VaultNotFound(vault_id))?;

        if vault.is_locked {
            return Ok(Err(ClaimFailure::VaultLocked));
        }

        match claim::replay(trace) {
            Ok(claim::ClaimOutcome::Claimed) => {}
            Ok(claim::ClaimOutcome::Cancelled(reason)) => {
                return Ok(Err(ClaimFailure::GestureCancelled(reason)));
            }
            Err(err) => return Ok(Err(ClaimFailure::BadTrace(err))),
        }

        match self.store.claim_loot_item(item_id, vault_id, user_id).await? {
            Ok(item) => {
                let _ = self.event_bus.send(NotificationEvent::LootClaimed {
                    vault_id,
                    item_id: item.id,
                    item_name: item.name.clone(),
                });

                if self.store.unclaimed_loot_count(vault_id).await? == 0 {
                    let _ = self
                        .event_bus
                        .send(NotificationEvent::VaultEmptied { vault_id });
                }

                Ok(Ok(item))
            }
            Err(rejection) => Ok(Err(ClaimFailure::Rejected(rejection))),
        }
    }

    /// Expires active offensives whose time budget has elapsed. Run by
    /// the maintenance scheduler; returns how many were expired.
    pub async fn expire_timed_out(&self) -> Result<u32, OffensiveError> {
        let now = chrono::Utc::now();
        let mut expired = 0;

        for offensive in self.store.list_active_offensives().await? {
            let Ok(started) = chrono::DateTime::parse_from_rfc3339(&offensive.started_at) else {
                warn!(
                    "Offensive {} has unparseable started_at; expiring it",
                    offensive.id
                );
                self.store
                    .finish_offensive(offensive.id, status::EXPIRED)
                    .await?;
                expired += 1;
                continue;
            };

            let deadline = (started
                + chrono::Duration::seconds(offensive.time_remaining_seconds.into()))
            .with_timezone(&chrono::Utc);
            if now >= deadline
                && self
                    .store
                    .finish_offensive(offensive.id, status::EXPIRED)
                    .await?
            {
                expired += 1;
                let _ = self.event_bus.send(NotificationEvent::OffensiveEnded {
                    offensive_id: offensive.id,
                    status: status::EXPIRED.to_string(),
                });
            }
        }

        if expired > 0 {
            info!("Expired {} timed-out offensives", expired);
        }
        Ok(expired)
    }

    /// Loads an offensive and verifies ownership and liveness, expiring
    /// it on the spot when its time budget has run out.
    async fn checked_active(
        &self,
        offensive_id: i32,
        user_id: i32,
    ) -> Result<offensives::Model, OffensiveError> {
        let offensive = self
            .store
            .get_offensive(offensive_id)
            .await?
            .ok_or(OffensiveError::NotFound(offensive_id))?;

        if offensive.user_id != user_id {
            return Err(OffensiveError::NotYours);
        }
        if offensive.status != status::ACTIVE {
            return Err(OffensiveError::NotActive);
        }

        if let Ok(started) = chrono::DateTime::parse_from_rfc3339(&offensive.started_at) {
            let deadline = (started
                + chrono::Duration::seconds(offensive.time_remaining_seconds.into()))
            .with_timezone(&chrono::Utc);
            if chrono::Utc::now() >= deadline {
                self.store
                    .finish_offensive(offensive_id, status::EXPIRED)
                    .await?;
                let _ = self.event_bus.send(NotificationEvent::OffensiveEnded {
                    offensive_id,
                    status: status::EXPIRED.to_string(),
                });
                return Err(OffensiveError::Expired);
            }
        }

        Ok(offensive)
    }
}

/// Why a structurally valid claim request did not settle.
#[derive(Debug)]
pub enum ClaimFailure {
    VaultLocked,
    GestureCancelled(claim::CancelReason),
    BadTrace(claim::ClaimError),
    Rejected(crate::db::ClaimRejection),
}
