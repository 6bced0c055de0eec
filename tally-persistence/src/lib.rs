pub mod connection;
pub mod entities;
pub mod repositories;
pub mod store;

pub use store::{BoardStore, MemoryStore, ProfileStore, shared_board_key};
