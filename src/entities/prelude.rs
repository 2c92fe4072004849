pub use super::chat_messages::Entity as ChatMessages;
pub use super::loot_items::Entity as LootItems;
pub use super::offensives::Entity as Offensives;
pub use super::users::Entity as Users;
pub use super::vaults::Entity as Vaults;
