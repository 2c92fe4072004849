use anyhow::Result;
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, Statement};
use std::path::Path;
use std::time::Duration;
use tracing::info;

use crate::config::SecurityConfig;
use crate::entities::{chat_messages, loot_items, offensives, vaults};

pub mod migrator;
pub mod repositories;

pub use repositories::loot::{ClaimRejection, NewLootItem};
pub use repositories::offensive::{sender, status};
pub use repositories::user::User;
pub use repositories::vault::{NewVault, VaultPatch};

#[derive(Clone)]
pub struct Store {
    pub conn: DatabaseConnection,
}

impl Store {
    pub async fn new(db_url: &str) -> Result<Self> {
        Self::with_pool_options(db_url, 5, 1).await
    }

    pub async fn with_pool_options(
        db_url: &str,
        max_connections: u32,
        min_connections: u32,
    ) -> Result<Self> {
        use sea_orm_migration::MigratorTrait;

        if !db_url.contains(":memory:") {
            let path_str = db_url.trim_start_matches("sqlite:");
            if let Some(parent) = Path::new(path_str).parent() {
                tokio::fs::create_dir_all(parent).await.ok();
            }
            if !Path::new(path_str).exists() {
                std::fs::File::create(path_str)?;
            }
        }

        let mut opt = ConnectOptions::new(db_url.to_string());
        opt.max_connections(max_connections)
            .min_connections(min_connections)
            .connect_timeout(Duration::from_secs(10))
            .acquire_timeout(Duration::from_secs(10))
            .idle_timeout(Duration::from_secs(300))
            .max_lifetime(Duration::from_secs(600))
            .sqlx_logging(false);

        let conn = Database::connect(opt).await?;

        migrator::Migrator::up(&conn, None).await?;

        info!(
            "Database connected & migrations applied (pool: {}-{})",
            min_connections, max_connections
        );

        Ok(Self { conn })
    }

    pub async fn ping(&self) -> Result<()> {
        let backend = self.conn.get_database_backend();
        self.conn
            .query_one(Statement::from_string(backend, "SELECT 1".to_string()))
            .await?;
        Ok(())
    }

    fn vault_repo(&self) -> repositories::vault::VaultRepository {
        repositories::vault::VaultRepository::new(self.conn.clone())
    }

    fn loot_repo(&self) -> repositories::loot::LootRepository {
        repositories::loot::LootRepository::new(self.conn.clone())
    }

    fn offensive_repo(&self) -> repositories::offensive::OffensiveRepository {
        repositories::offensive::OffensiveRepository::new(self.conn.clone())
    }

    fn user_repo(&self) -> repositories::user::UserRepository {
        repositories::user::UserRepository::new(self.conn.clone())
    }

    // ========================================================================
    // Vaults
    // ========================================================================

    pub async fn list_vaults(&self) -> Result<Vec<vaults::Model>> {
        self.vault_repo().list_all().await
    }

    pub async fn get_vault(&self, id: i32) -> Result<Option<vaults::Model>> {
        self.vault_repo().get(id).await
    }

    pub async fn vault_count(&self) -> Result<u64> {
        self.vault_repo().count().await
    }

    pub async fn create_vault(
        &self,
        vault: NewVault,
        loot: &[NewLootItem],
    ) -> Result<vaults::Model> {
        let model = self.vault_repo().create(vault).await?;
        self.loot_repo().add_many(model.id, loot).await?;
        Ok(model)
    }

    pub async fn update_vault(&self, id: i32, patch: VaultPatch) -> Result<Option<vaults::Model>> {
        self.vault_repo().update(id, patch).await
    }

    pub async fn increment_vault_attempts(&self, id: i32) -> Result<()> {
        self.vault_repo().increment_attempts(id).await
    }

    pub async fn record_vault_unlock(&self, id: i32) -> Result<Option<vaults::Model>> {
        self.vault_repo().record_unlock(id).await
    }

    pub async fn touch_vault_activity(&self, id: i32) -> Result<()> {
        self.vault_repo().touch_activity(id).await
    }

    pub async fn age_new_vault_flags(&self, cutoff: &str) -> Result<u64> {
        self.vault_repo().age_new_flags(cutoff).await
    }

    pub async fn refresh_popular_vault_flags(&self, attempts_threshold: i32) -> Result<()> {
        self.vault_repo()
            .refresh_popular_flags(attempts_threshold)
            .await
    }

    // ========================================================================
    // Loot
    // ========================================================================

    pub async fn list_loot(&self, vault_id: i32) -> Result<Vec<loot_items::Model>> {
        self.loot_repo().list_for_vault(vault_id).await
    }

    pub async fn get_loot_item(&self, id: i32) -> Result<Option<loot_items::Model>> {
        self.loot_repo().get(id).await
    }

    pub async fn unclaimed_loot_count(&self, vault_id: i32) -> Result<u64> {
        self.loot_repo().unclaimed_count(vault_id).await
    }

    pub async fn claim_loot_item(
        &self,
        item_id: i32,
        vault_id: i32,
        user_id: i32,
    ) -> Result<Result<loot_items::Model, ClaimRejection>> {
        self.loot_repo().claim(item_id, vault_id, user_id).await
    }

    // ========================================================================
    // Offensives & chat
    // ========================================================================

    pub async fn create_offensive(
        &self,
        vault_id: i32,
        user_id: i32,
        time_budget_seconds: i32,
    ) -> Result<offensives::Model> {
        self.offensive_repo()
            .create(vault_id, user_id, time_budget_seconds)
            .await
    }

    pub async fn get_offensive(&self, id: i32) -> Result<Option<offensives::Model>> {
        self.offensive_repo().get(id).await
    }

    pub async fn find_active_offensive(
        &self,
        user_id: i32,
        vault_id: i32,
    ) -> Result<Option<offensives::Model>> {
        self.offensive_repo().find_active(user_id, vault_id).await
    }

    pub async fn list_offensives_for_user(&self, user_id: i32) -> Result<Vec<offensives::Model>> {
        self.offensive_repo().list_for_user(user_id).await
    }

    pub async fn list_active_offensives(&self) -> Result<Vec<offensives::Model>> {
        self.offensive_repo().list_active().await
    }

    pub async fn set_offensive_conviction(&self, id: i32, conviction: i32) -> Result<()> {
        self.offensive_repo().set_conviction(id, conviction).await
    }

    pub async fn finish_offensive(&self, id: i32, terminal_status: &str) -> Result<bool> {
        self.offensive_repo().finish(id, terminal_status).await
    }

    pub async fn add_chat_message(
        &self,
        offensive_id: i32,
        sender: &str,
        body: &str,
        conviction_delta: i32,
    ) -> Result<chat_messages::Model> {
        self.offensive_repo()
            .add_message(offensive_id, sender, body, conviction_delta)
            .await
    }

    pub async fn list_chat_messages(
        &self,
        offensive_id: i32,
    ) -> Result<Vec<chat_messages::Model>> {
        self.offensive_repo().messages(offensive_id).await
    }

    // ========================================================================
    // Users
    // ========================================================================

    pub async fn get_user_by_username(&self, username: &str) -> Result<Option<User>> {
        self.user_repo().get_by_username(username).await
    }

    pub async fn get_user_by_id(&self, id: i32) -> Result<Option<User>> {
        self.user_repo().get_by_id(id).await
    }

    pub async fn verify_user_password(&self, username: &str, password: &str) -> Result<bool> {
        self.user_repo().verify_password(username, password).await
    }

    pub async fn update_user_password(
        &self,
        username: &str,
        new_password: &str,
        config: Option<&SecurityConfig>,
    ) -> Result<()> {
        self.user_repo()
            .update_password(username, new_password, config)
            .await
    }

    pub async fn verify_api_key(&self, api_key: &str) -> Result<Option<User>> {
        self.user_repo().verify_api_key(api_key).await
    }

    pub async fn get_user_api_key(&self, username: &str) -> Result<Option<String>> {
        self.user_repo().get_api_key(username).await
    }

    pub async fn regenerate_user_api_key(&self, username: &str) -> Result<String> {
        self.user_repo().regenerate_api_key(username).await
    }

    pub async fn credit_user_time(&self, user_id: i32, seconds: i32) -> Result<i32> {
        self.user_repo().credit_time(user_id, seconds).await
    }

    pub async fn debit_user_time(&self, user_id: i32, seconds: i32) -> Result<Option<i32>> {
        self.user_repo().debit_time(user_id, seconds).await
    }
}
