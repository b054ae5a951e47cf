//! Postgres repositories, one per table.

pub mod friend_repo;
pub mod history_repo;
pub mod item_repo;

pub use friend_repo::FriendRepo;
pub use history_repo::HistoryRepo;
pub use item_repo::ItemRepo;
