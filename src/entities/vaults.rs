use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "vaults")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub name: String,
    pub description: Option<String>,
    pub item_amount: i32,
    pub is_locked: bool,
    pub attempts: i32,
    pub winners: i32,
    /// One of: easy, medium, hard, legendary. Parsed through
    /// `game::Difficulty` at the edges.
    pub difficulty: String,
    pub last_activity: Option<String>,
    pub is_new: bool,
    pub is_popular: bool,
    pub created_at: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::loot_items::Entity")]
    LootItems,
    #[sea_orm(has_many = "super::offensives::Entity")]
    Offensives,
}

impl Related<super::loot_items::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::LootItems.def()
    }
}

impl Related<super::offensives::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Offensives.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
