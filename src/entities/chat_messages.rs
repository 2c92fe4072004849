use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "chat_messages")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub offensive_id: i32,
    /// Either "user" or "guardian".
    pub sender: String,
    pub body: String,
    pub conviction_delta: i32,
    pub created_at: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::offensives::Entity",
        from = "Column::OffensiveId",
        to = "super::offensives::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Offensives,
}

impl Related<super::offensives::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Offensives.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
