pub use super::profiles::Entity as Profiles;
pub use super::shared_boards::Entity as SharedBoards;
