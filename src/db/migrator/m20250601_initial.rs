use crate::entities::prelude::*;
use crate::entities::{loot_items, vaults};
use sea_orm_migration::prelude::*;
use sea_orm_migration::sea_orm::Schema;

#[derive(DeriveMigrationName)]
pub struct Migration;

/// Starter vaults so a fresh install has something on the discovery
/// screen before the first hunt runs.
const SEED_VAULTS: &[(&str, &str, i32, &str)] = &[
    (
        "Gilded Reliquary",
        "A brass-bound vault recovered from the Old Mint Quarter.",
        4,
        "easy",
    ),
    (
        "Drowned Exchange Strongbox",
        "Salvaged intact. The guardian inside has not spoken in years.",
        6,
        "medium",
    ),
    (
        "Obsidian Crypt",
        "Nobody has heard its guardian laugh and walked away richer.",
        9,
        "legendary",
    ),
];

const SEED_LOOT: &[(i32, &str, &str, i64)] = &[
    (1, "Tarnished Signet", "common", 1_200),
    (1, "Minted Error Coin", "rare", 3_400),
    (1, "Wax-Sealed Deed", "common", 900),
    (1, "Opal Cufflink", "rare", 4_100),
    (2, "Harbor Master's Ledger", "rare", 7_800),
    (2, "Silver Astrolabe", "epic", 15_500),
    (2, "Bottled Chart Ink", "common", 2_100),
    (2, "Pearl Button Set", "common", 2_600),
    (2, "Trade Route Cipher", "epic", 18_000),
    (2, "Customs Stamp", "rare", 6_200),
    (3, "Obsidian Death Mask", "legendary", 420_000),
    (3, "Funerary Crown", "legendary", 380_000),
    (3, "Black Glass Chalice", "epic", 92_000),
    (3, "Embalmer's Tools", "rare", 31_000),
    (3, "Crypt Key Mold", "epic", 75_000),
    (3, "Silk Burial Banner", "rare", 24_000),
    (3, "Onyx Prayer Beads", "rare", 28_000),
    (3, "Gilded Femur", "epic", 66_000),
    (3, "Guardian's First Coin", "legendary", 510_000),
];

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let backend = manager.get_database_backend();
        let schema = Schema::new(backend);

        manager
            .create_table(
                schema
                    .create_table_from_entity(Vaults)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                schema
                    .create_table_from_entity(LootItems)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                schema
                    .create_table_from_entity(Offensives)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                schema
                    .create_table_from_entity(ChatMessages)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        let now = chrono::Utc::now().to_rfc3339();

        let mut insert_vaults = sea_orm_migration::sea_query::Query::insert()
            .into_table(Vaults)
            .columns([
                vaults::Column::Name,
                vaults::Column::Description,
                vaults::Column::ItemAmount,
                vaults::Column::IsLocked,
                vaults::Column::Attempts,
                vaults::Column::Winners,
                vaults::Column::Difficulty,
                vaults::Column::IsNew,
                vaults::Column::IsPopular,
                vaults::Column::CreatedAt,
            ])
            .to_owned();

        for (name, description, item_amount, difficulty) in SEED_VAULTS {
            insert_vaults.values_panic([
                (*name).into(),
                (*description).into(),
                (*item_amount).into(),
                true.into(),
                0.into(),
                0.into(),
                (*difficulty).into(),
                true.into(),
                false.into(),
                now.clone().into(),
            ]);
        }

        manager.exec_stmt(insert_vaults).await?;

        let mut insert_loot = sea_orm_migration::sea_query::Query::insert()
            .into_table(LootItems)
            .columns([
                loot_items::Column::VaultId,
                loot_items::Column::Name,
                loot_items::Column::Rarity,
                loot_items::Column::ValueCents,
                loot_items::Column::Claimed,
            ])
            .to_owned();

        for (vault_id, name, rarity, value_cents) in SEED_LOOT {
            insert_loot.values_panic([
                (*vault_id).into(),
                (*name).into(),
                (*rarity).into(),
                (*value_cents).into(),
                false.into(),
            ]);
        }

        manager.exec_stmt(insert_loot).await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(ChatMessages).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Offensives).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(LootItems).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Vaults).to_owned())
            .await?;

        Ok(())
    }
}
