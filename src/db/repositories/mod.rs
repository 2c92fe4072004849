pub mod loot;
pub mod offensive;
pub mod user;
pub mod vault;
