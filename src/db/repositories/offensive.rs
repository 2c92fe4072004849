use anyhow::Result;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};
use tracing::info;

use crate::entities::{chat_messages, offensives, prelude::*};

/// Offensive lifecycle states stored in the `status` column.
pub mod status {
    pub const ACTIVE: &str = "active";
    pub const WON: &str = "won";
    pub const EXPIRED: &str = "expired";
    pub const FORFEITED: &str = "forfeited";
}

pub mod sender {
    pub const USER: &str = "user";
    pub const GUARDIAN: &str = "guardian";
}

pub struct OffensiveRepository {
    conn: DatabaseConnection,
}

impl OffensiveRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn create(
        &self,
        vault_id: i32,
        user_id: i32,
        time_budget_seconds: i32,
    ) -> Result<offensives::Model> {
        let now = chrono::Utc::now().to_rfc3339();

        let active = offensives::ActiveModel {
            vault_id: Set(vault_id),
            user_id: Set(user_id),
            conviction: Set(0),
            time_remaining_seconds: Set(time_budget_seconds),
            status: Set(status::ACTIVE.to_string()),
            started_at: Set(now.clone()),
            updated_at: Set(now),
            ..Default::default()
        };

        let model = active.insert(&self.conn).await?;
        info!(
            "Offensive {} opened against vault {} by user {}",
            model.id, vault_id, user_id
        );
        Ok(model)
    }

    pub async fn get(&self, id: i32) -> Result<Option<offensives::Model>> {
        Ok(Offensives::find_by_id(id).one(&self.conn).await?)
    }

    pub async fn find_active(
        &self,
        user_id: i32,
        vault_id: i32,
    ) -> Result<Option<offensives::Model>> {
        let row = Offensives::find()
            .filter(offensives::Column::UserId.eq(user_id))
            .filter(offensives::Column::VaultId.eq(vault_id))
            .filter(offensives::Column::Status.eq(status::ACTIVE))
            .one(&self.conn)
            .await?;
        Ok(row)
    }

    pub async fn list_for_user(&self, user_id: i32) -> Result<Vec<offensives::Model>> {
        let rows = Offensives::find()
            .filter(offensives::Column::UserId.eq(user_id))
            .order_by_desc(offensives::Column::Id)
            .all(&self.conn)
            .await?;
        Ok(rows)
    }

    pub async fn list_active(&self) -> Result<Vec<offensives::Model>> {
        let rows = Offensives::find()
            .filter(offensives::Column::Status.eq(status::ACTIVE))
            .all(&self.conn)
            .await?;
        Ok(rows)
    }

    pub async fn set_conviction(&self, id: i32, conviction: i32) -> Result<()> {
        Offensives::update_many()
            .col_expr(
                offensives::Column::Conviction,
                sea_orm::sea_query::Expr::value(conviction.clamp(0, 100)),
            )
            .col_expr(
                offensives::Column::UpdatedAt,
                sea_orm::sea_query::Expr::value(chrono::Utc::now().to_rfc3339()),
            )
            .filter(offensives::Column::Id.eq(id))
            .exec(&self.conn)
            .await?;
        Ok(())
    }

    /// Moves an active offensive to a terminal status. Returns `false`
    /// when the offensive was not active (already settled).
    pub async fn finish(&self, id: i32, terminal_status: &str) -> Result<bool> {
        let result = Offensives::update_many()
            .col_expr(
                offensives::Column::Status,
                sea_orm::sea_query::Expr::value(terminal_status),
            )
            .col_expr(
                offensives::Column::UpdatedAt,
                sea_orm::sea_query::Expr::value(chrono::Utc::now().to_rfc3339()),
            )
            .filter(offensives::Column::Id.eq(id))
            .filter(offensives::Column::Status.eq(status::ACTIVE))
            .exec(&self.conn)
            .await?;
        Ok(result.rows_affected > 0)
    }

    pub async fn add_message(
        &self,
        offensive_id: i32,
        sender: &str,
        body: &str,
        conviction_delta: i32,
    ) -> Result<chat_messages::Model> {
        let active = chat_messages::ActiveModel {
            offensive_id: Set(offensive_id),
            sender: Set(sender.to_string()),
            body: Set(body.to_string()),
            conviction_delta: Set(conviction_delta),
            created_at: Set(chrono::Utc::now().to_rfc3339()),
            ..Default::default()
        };
        Ok(active.insert(&self.conn).await?)
    }

    pub async fn messages(&self, offensive_id: i32) -> Result<Vec<chat_messages::Model>> {
        let rows = ChatMessages::find()
            .filter(chat_messages::Column::OffensiveId.eq(offensive_id))
            .order_by_asc(chat_messages::Column::Id)
            .all(&self.conn)
            .await?;
        Ok(rows)
    }
}
