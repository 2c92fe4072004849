use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    #[sea_orm(unique)]
    pub username: String,

    /// Argon2id password hash
    pub password_hash: String,

    /// Random API key (64-char hex string)
    pub api_key: String,

    /// Purchased attempt time not yet spent on offensives.
    pub time_balance_seconds: i32,

    pub created_at: String,

    pub updated_at: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::offensives::Entity")]
    Offensives,
}

impl Related<super::offensives::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Offensives.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
