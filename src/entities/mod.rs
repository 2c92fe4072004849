pub mod prelude;

pub mod chat_messages;
pub mod loot_items;
pub mod offensives;
pub mod users;
pub mod vaults;
