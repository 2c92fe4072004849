use std::sync::Arc;
use tokio::sync::{RwLock, broadcast};

use crate::config::Config;
use crate::db::Store;
use crate::domain::NotificationEvent;
use crate::services::{HuntService, OffensiveService};

/// Everything long-lived the server hands around: configuration, the
/// store, the event bus and the two game services.
#[derive(Clone)]
pub struct SharedState {
    pub config: Arc<RwLock<Config>>,

    pub store: Store,

    pub event_bus: broadcast::Sender<NotificationEvent>,

    pub offensives: Arc<OffensiveService>,

    pub hunts: Arc<HuntService>,
}

impl SharedState {
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        let (event_bus, _) = broadcast::channel(config.general.event_bus_buffer_size);
        Self::with_event_bus(config, event_bus).await
    }

    pub async fn with_event_bus(
        config: Config,
        event_bus: broadcast::Sender<NotificationEvent>,
    ) -> anyhow::Result<Self> {
        let store = Store::with_pool_options(
            &config.general.database_path,
            config.general.max_db_connections,
            config.general.min_db_connections,
        )
        .await?;

        let config = Arc::new(RwLock::new(config));

        let offensives = Arc::new(OffensiveService::new(
            store.clone(),
            config.clone(),
            event_bus.clone(),
        ));

        let hunts = Arc::new(HuntService::new(
            store.clone(),
            config.clone(),
            event_bus.clone(),
        ));

        Ok(Self {
            config,
            store,
            event_bus,
            offensives,
            hunts,
        })
    }

    pub async fn config(&self) -> Config {
        self.config.read().await.clone()
    }
}
