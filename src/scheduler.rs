//! Background maintenance: expires timed-out offensives and keeps the
//! discovery flags (`is_new`, `is_popular`) honest.

use anyhow::Result;
use std::sync::Arc;
use tokio::time::{Duration, interval};
use tokio_cron_scheduler::{Job, JobScheduler};
use tracing::{error, info};

use crate::config::SchedulerConfig;
use crate::state::SharedState;

pub struct Scheduler {
    state: Arc<SharedState>,
    config: SchedulerConfig,
}

impl Scheduler {
    #[must_use]
    pub const fn new(state: Arc<SharedState>, config: SchedulerConfig) -> Self {
        Self { state, config }
    }

    /// Runs until the task is aborted. Uses a cron schedule when one is
    /// configured, otherwise a plain interval.
    pub async fn start(&self) -> Result<()> {
        if let Some(cron) = &self.config.cron_expression {
            let sched = JobScheduler::new().await?;
            let state = Arc::clone(&self.state);

            sched
                .add(Job::new_async(cron.as_str(), move |_uuid, _lock| {
                    let state = Arc::clone(&state);
                    Box::pin(async move {
                        if let Err(e) = run_maintenance(&state).await {
                            error!("Maintenance pass failed: {}", e);
                        }
                    })
                })?)
                .await?;

            sched.start().await?;
            info!("Maintenance scheduler started (cron: {})", cron);

            // JobScheduler runs on its own tasks; keep this one parked
            // so the caller's abort handle controls the lifetime.
            loop {
                tokio::time::sleep(Duration::from_secs(3600)).await;
            }
        }

        let minutes = u64::from(self.config.check_interval_minutes.max(1));
        let mut ticker = interval(Duration::from_secs(minutes * 60));
        info!("Maintenance scheduler started (every {} min)", minutes);

        loop {
            ticker.tick().await;
            if let Err(e) = run_maintenance(&self.state).await {
                error!("Maintenance pass failed: {}", e);
            }
        }
    }

    pub async fn run_once(&self) -> Result<()> {
        run_maintenance(&self.state).await
    }
}

async fn run_maintenance(state: &SharedState) -> Result<()> {
    let expired = state
        .offensives
        .expire_timed_out()
        .await
        .map_err(|e| anyhow::anyhow!("Failed to expire offensives: {e}"))?;

    let (max_age_days, popular_threshold) = {
        let config = state.config.read().await;
        (
            config.game.new_vault_max_age_days,
            config.game.popular_attempts_threshold,
        )
    };

    let cutoff = (chrono::Utc::now() - chrono::Duration::days(max_age_days)).to_rfc3339();
    let aged = state.store.age_new_vault_flags(&cutoff).await?;
    state
        .store
        .refresh_popular_vault_flags(popular_threshold)
        .await?;

    info!(
        "Maintenance pass done: {} offensives expired, {} vaults aged out of 'new'",
        expired, aged
    );

    Ok(())
}
