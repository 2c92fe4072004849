use anyhow::Result;
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, Set,
};
use tracing::info;

use crate::entities::{loot_items, prelude::*};

#[derive(Debug, Clone)]
pub struct NewLootItem {
    pub name: String,
    pub rarity: String,
    pub value_cents: i64,
}

/// Why a claim attempt did not settle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClaimRejection {
    NotFound,
    WrongVault,
    AlreadyClaimed,
}

pub struct LootRepository {
    conn: DatabaseConnection,
}

impl LootRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn add_many(&self, vault_id: i32, items: &[NewLootItem]) -> Result<()> {
        if items.is_empty() {
            return Ok(());
        }

        let models: Vec<loot_items::ActiveModel> = items
            .iter()
            .map(|item| loot_items::ActiveModel {
                vault_id: Set(vault_id),
                name: Set(item.name.clone()),
                rarity: Set(item.rarity.clone()),
                value_cents: Set(item.value_cents),
                claimed: Set(false),
                ..Default::default()
            })
            .collect();

        LootItems::insert_many(models).exec(&self.conn).await?;
        Ok(())
    }

    pub async fn list_for_vault(&self, vault_id: i32) -> Result<Vec<loot_items::Model>> {
        let rows = LootItems::find()
            .filter(loot_items::Column::VaultId.eq(vault_id))
            .order_by_asc(loot_items::Column::Id)
            .all(&self.conn)
            .await?;
        Ok(rows)
    }

    pub async fn get(&self, id: i32) -> Result<Option<loot_items::Model>> {
        Ok(LootItems::find_by_id(id).one(&self.conn).await?)
    }

    pub async fn unclaimed_count(&self, vault_id: i32) -> Result<u64> {
        let count = LootItems::find()
            .filter(loot_items::Column::VaultId.eq(vault_id))
            .filter(loot_items::Column::Claimed.eq(false))
            .count(&self.conn)
            .await?;
        Ok(count)
    }

    /// Settles a claim. The claimed flag is written with a guard on the
    /// current value, so double-claims lose even when two requests race.
    pub async fn claim(
        &self,
        item_id: i32,
        vault_id: i32,
        user_id: i32,
    ) -> Result<Result<loot_items::Model, ClaimRejection>> {
        let Some(item) = LootItems::find_by_id(item_id).one(&self.conn).await? else {
            return Ok(Err(ClaimRejection::NotFound));
        };
        if item.vault_id != vault_id {
            return Ok(Err(ClaimRejection::WrongVault));
        }
        if item.claimed {
            return Ok(Err(ClaimRejection::AlreadyClaimed));
        }

        let now = chrono::Utc::now().to_rfc3339();
        let result = LootItems::update_many()
            .col_expr(
                loot_items::Column::Claimed,
                sea_orm::sea_query::Expr::value(true),
            )
            .col_expr(
                loot_items::Column::ClaimedBy,
                sea_orm::sea_query::Expr::value(user_id),
            )
            .col_expr(
                loot_items::Column::ClaimedAt,
                sea_orm::sea_query::Expr::value(now.clone()),
            )
            .filter(loot_items::Column::Id.eq(item_id))
            .filter(loot_items::Column::Claimed.eq(false))
            .exec(&self.conn)
            .await?;

        if result.rows_affected == 0 {
            return Ok(Err(ClaimRejection::AlreadyClaimed));
        }

        info!("Loot item {} claimed by user {}", item_id, user_id);

        Ok(Ok(loot_items::Model {
            claimed: true,
            claimed_by: Some(user_id),
            claimed_at: Some(now),
            ..item
        }))
    }
}
