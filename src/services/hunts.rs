//! Hunt runner: executes the scripted phase plan on a background task,
//! persisting spotted vaults and streaming progress over the event bus.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicI64, Ordering};
use std::time::Duration;

use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::Serialize;
use tokio::sync::{RwLock, broadcast};
use tracing::{error, info};

use crate::config::Config;
use crate::db::{NewLootItem, NewVault, Store};
use crate::domain::NotificationEvent;
use crate::game::hunt::{
    HUNT_PHASES, SPAWN_PHASES, progress_at, should_spawn, spawned_item_amount, spot_vault,
};
use crate::game::lootgen::roll_loot;

/// Runner cadence floor so fast hunts still emit a few progress events.
const MIN_TICK: Duration = Duration::from_millis(25);

#[derive(Clone, Debug, Serialize)]
pub struct HuntSnapshot {
    pub id: i64,
    pub phase_index: usize,
    pub phase_name: &'static str,
    pub message: &'static str,
    pub percent: f64,
    pub finished: bool,
    pub vaults_found: Vec<i32>,
    pub started_at: String,
}

pub struct HuntService {
    store: Store,
    config: Arc<RwLock<Config>>,
    event_bus: broadcast::Sender<NotificationEvent>,
    hunts: RwLock<HashMap<i64, HuntSnapshot>>,
    next_id: AtomicI64,
}

impl HuntService {
    pub fn new(
        store: Store,
        config: Arc<RwLock<Config>>,
        event_bus: broadcast::Sender<NotificationEvent>,
    ) -> Self {
        Self {
            store,
            config,
            event_bus,
            hunts: RwLock::new(HashMap::new()),
            next_id: AtomicI64::new(0),
        }
    }

    pub async fn get(&self, id: i64) -> Option<HuntSnapshot> {
        self.hunts.read().await.get(&id).cloned()
    }

    pub async fn list(&self) -> Vec<HuntSnapshot> {
        let mut hunts: Vec<HuntSnapshot> = self.hunts.read().await.values().cloned().collect();
        hunts.sort_by_key(|h| std::cmp::Reverse(h.id));
        hunts
    }

    /// Kicks off a hunt on a background task and returns its initial
    /// snapshot immediately.
    pub async fn start(self: Arc<Self>) -> HuntSnapshot {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed) + 1;

        let snapshot = HuntSnapshot {
            id,
            phase_index: 0,
            phase_name: HUNT_PHASES[0].name,
            message: HUNT_PHASES[0].message,
            percent: 0.0,
            finished: false,
            vaults_found: Vec::new(),
            started_at: chrono::Utc::now().to_rfc3339(),
        };

        self.hunts.write().await.insert(id, snapshot.clone());
        let _ = self
            .event_bus
            .send(NotificationEvent::HuntStarted { hunt_id: id });

        let service = Arc::clone(&self);
        tokio::spawn(async move {
            if let Err(e) = service.run(id).await {
                error!("Hunt {} failed: {}", id, e);
                let _ = service.event_bus.send(NotificationEvent::Error {
                    message: format!("Hunt {id} failed: {e}"),
                });
                if let Some(snapshot) = service.hunts.write().await.get_mut(&id) {
                    snapshot.finished = true;
                }
            }
        });

        snapshot
    }

    async fn run(&self, id: i64) -> anyhow::Result<()> {
        let (spawn_chance, speed) = {
            let config = self.config.read().await;
            (
                config.game.hunt_spawn_chance,
                config.game.hunt_speed_multiplier,
            )
        };

        let mut rng = StdRng::from_os_rng();
        let mut logical_elapsed_ms = 0.0_f64;
        let mut found = 0_i32;

        for (index, phase) in HUNT_PHASES.iter().enumerate() {
            if index < SPAWN_PHASES && should_spawn(&mut rng, spawn_chance) {
                let spotted = spot_vault(&mut rng);
                let item_amount = spawned_item_amount(&mut rng, spotted.difficulty);
                let loot: Vec<NewLootItem> = roll_loot(&mut rng, spotted.difficulty, item_amount)
                    .into_iter()
                    .map(|roll| NewLootItem {
                        name: roll.name,
                        rarity: roll.rarity.to_string(),
                        value_cents: roll.value_cents,
                    })
                    .collect();

                let vault = self
                    .store
                    .create_vault(
                        NewVault {
                            name: spotted.name.clone(),
                            description: Some(format!("Spotted in the {}.", spotted.location)),
                            item_amount,
                            is_locked: true,
                            difficulty: spotted.difficulty.to_string(),
                            is_new: true,
                            is_popular: false,
                        },
                        &loot,
                    )
                    .await?;

                found += 1;
                if let Some(snapshot) = self.hunts.write().await.get_mut(&id) {
                    snapshot.vaults_found.push(vault.id);
                }
                let _ = self.event_bus.send(NotificationEvent::VaultSpotted {
                    hunt_id: id,
                    vault_id: vault.id,
                    name: spotted.name,
                    location: spotted.location,
                });
            }

            let scaled = Duration::from_millis((phase.duration_ms as f64 / speed) as u64);
            let tick = (scaled / 5).max(MIN_TICK);
            let mut slept = Duration::ZERO;

            while slept < scaled {
                let step = tick.min(scaled - slept);
                tokio::time::sleep(step).await;
                slept += step;
                logical_elapsed_ms += step.as_secs_f64() * 1000.0 * speed;

                let progress = progress_at(logical_elapsed_ms as u64);
                if let Some(snapshot) = self.hunts.write().await.get_mut(&id) {
                    snapshot.phase_index = progress.phase_index;
                    snapshot.phase_name = progress.phase_name;
                    snapshot.message = progress.message;
                    snapshot.percent = progress.percent;
                }
                let _ = self.event_bus.send(NotificationEvent::HuntProgress {
                    hunt_id: id,
                    phase: progress.phase_name.to_string(),
                    message: progress.message.to_string(),
                    percent: progress.percent,
                });
            }
        }

        if let Some(snapshot) = self.hunts.write().await.get_mut(&id) {
            snapshot.finished = true;
            snapshot.percent = 100.0;
            let last = HUNT_PHASES.len() - 1;
            snapshot.phase_index = last;
            snapshot.phase_name = HUNT_PHASES[last].name;
            snapshot.message = HUNT_PHASES[last].message;
        }

        info!("Hunt {} finished with {} vaults found", id, found);
        let _ = self.event_bus.send(NotificationEvent::HuntFinished {
            hunt_id: id,
            vaults_found: found,
        });

        Ok(())
    }
}
