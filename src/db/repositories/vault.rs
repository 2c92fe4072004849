use anyhow::Result;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set,
};
use tracing::info;

use crate::entities::{prelude::*, vaults};

/// Fields accepted when creating a vault. Everything else is
/// server-assigned.
#[derive(Debug, Clone)]
pub struct NewVault {
    pub name: String,
    pub description: Option<String>,
    pub item_amount: i32,
    pub is_locked: bool,
    pub difficulty: String,
    pub is_new: bool,
    pub is_popular: bool,
}

/// Partial update: only `Some` fields are written, the rest of the row
/// is preserved.
#[derive(Debug, Clone, Default)]
pub struct VaultPatch {
    pub name: Option<String>,
    pub description: Option<Option<String>>,
    pub item_amount: Option<i32>,
    pub is_locked: Option<bool>,
    pub attempts: Option<i32>,
    pub winners: Option<i32>,
    pub difficulty: Option<String>,
    pub last_activity: Option<Option<String>>,
    pub is_new: Option<bool>,
    pub is_popular: Option<bool>,
}

pub struct VaultRepository {
    conn: DatabaseConnection,
}

impl VaultRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    /// All vaults in id order (ids are assigned monotonically).
    pub async fn list_all(&self) -> Result<Vec<vaults::Model>> {
        let rows = Vaults::find()
            .order_by_asc(vaults::Column::Id)
            .all(&self.conn)
            .await?;
        Ok(rows)
    }

    pub async fn get(&self, id: i32) -> Result<Option<vaults::Model>> {
        Ok(Vaults::find_by_id(id).one(&self.conn).await?)
    }

    pub async fn count(&self) -> Result<u64> {
        Ok(Vaults::find().count(&self.conn).await?)
    }

    pub async fn create(&self, vault: NewVault) -> Result<vaults::Model> {
        let now = chrono::Utc::now().to_rfc3339();

        let active = vaults::ActiveModel {
            name: Set(vault.name),
            description: Set(vault.description),
            item_amount: Set(vault.item_amount),
            is_locked: Set(vault.is_locked),
            attempts: Set(0),
            winners: Set(0),
            difficulty: Set(vault.difficulty),
            last_activity: Set(None),
            is_new: Set(vault.is_new),
            is_popular: Set(vault.is_popular),
            created_at: Set(now),
            ..Default::default()
        };

        let model = active.insert(&self.conn).await?;
        info!("Created vault {} ({})", model.id, model.name);
        Ok(model)
    }

    /// Applies a partial update. Returns the updated row, or `None` when
    /// the vault does not exist.
    pub async fn update(&self, id: i32, patch: VaultPatch) -> Result<Option<vaults::Model>> {
        let Some(existing) = Vaults::find_by_id(id).one(&self.conn).await? else {
            return Ok(None);
        };

        let mut active: vaults::ActiveModel = existing.into();

        if let Some(name) = patch.name {
            active.name = Set(name);
        }
        if let Some(description) = patch.description {
            active.description = Set(description);
        }
        if let Some(item_amount) = patch.item_amount {
            active.item_amount = Set(item_amount);
        }
        if let Some(is_locked) = patch.is_locked {
            active.is_locked = Set(is_locked);
        }
        if let Some(attempts) = patch.attempts {
            active.attempts = Set(attempts);
        }
        if let Some(winners) = patch.winners {
            active.winners = Set(winners);
        }
        if let Some(difficulty) = patch.difficulty {
            active.difficulty = Set(difficulty);
        }
        if let Some(last_activity) = patch.last_activity {
            active.last_activity = Set(last_activity);
        }
        if let Some(is_new) = patch.is_new {
            active.is_new = Set(is_new);
        }
        if let Some(is_popular) = patch.is_popular {
            active.is_popular = Set(is_popular);
        }

        Ok(Some(active.update(&self.conn).await?))
    }

    pub async fn increment_attempts(&self, id: i32) -> Result<()> {
        let Some(existing) = Vaults::find_by_id(id).one(&self.conn).await? else {
            return Ok(());
        };
        let attempts = existing.attempts + 1;
        let mut active: vaults::ActiveModel = existing.into();
        active.attempts = Set(attempts);
        active.last_activity = Set(Some(chrono::Utc::now().to_rfc3339()));
        active.update(&self.conn).await?;
        Ok(())
    }

    /// Marks a vault opened by a winning offensive.
    pub async fn record_unlock(&self, id: i32) -> Result<Option<vaults::Model>> {
        let Some(existing) = Vaults::find_by_id(id).one(&self.conn).await? else {
            return Ok(None);
        };
        let winners = existing.winners + 1;
        let mut active: vaults::ActiveModel = existing.into();
        active.is_locked = Set(false);
        active.winners = Set(winners);
        active.last_activity = Set(Some(chrono::Utc::now().to_rfc3339()));
        Ok(Some(active.update(&self.conn).await?))
    }

    pub async fn touch_activity(&self, id: i32) -> Result<()> {
        Vaults::update_many()
            .col_expr(
                vaults::Column::LastActivity,
                sea_orm::sea_query::Expr::value(chrono::Utc::now().to_rfc3339()),
            )
            .filter(vaults::Column::Id.eq(id))
            .exec(&self.conn)
            .await?;
        Ok(())
    }

    /// Clears `is_new` on vaults created before `cutoff` (RFC3339 sorts
    /// lexicographically, so plain string comparison is enough).
    pub async fn age_new_flags(&self, cutoff: &str) -> Result<u64> {
        let result = Vaults::update_many()
            .col_expr(
                vaults::Column::IsNew,
                sea_orm::sea_query::Expr::value(false),
            )
            .filter(vaults::Column::IsNew.eq(true))
            .filter(vaults::Column::CreatedAt.lt(cutoff))
            .exec(&self.conn)
            .await?;
        Ok(result.rows_affected)
    }

    /// Recomputes `is_popular` from the attempt counter.
    pub async fn refresh_popular_flags(&self, attempts_threshold: i32) -> Result<()> {
        Vaults::update_many()
            .col_expr(
                vaults::Column::IsPopular,
                sea_orm::sea_query::Expr::value(true),
            )
            .filter(vaults::Column::Attempts.gte(attempts_threshold))
            .filter(vaults::Column::IsPopular.eq(false))
            .exec(&self.conn)
            .await?;

        Vaults::update_many()
            .col_expr(
                vaults::Column::IsPopular,
                sea_orm::sea_query::Expr::value(false),
            )
            .filter(vaults::Column::Attempts.lt(attempts_threshold))
            .filter(vaults::Column::IsPopular.eq(true))
            .exec(&self.conn)
            .await?;

        Ok(())
    }
}
