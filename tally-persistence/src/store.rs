use anyhow::Result;
use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;

use tally_types::{Board, BoardId, RootState, UserIdentity};

/// Storage key for a board's shared record. Anyone who knows the board
/// id can read the record; confidentiality rests on the id being an
/// unguessable random string.
pub fn shared_board_key(board_id: BoardId) -> String {
    format!("shared-board:{board_id}")
}

/// The shared-record side of the persistence gateway. `upsert` replaces
/// the whole record: concurrent writers race and the last write to land
/// wins, with no field-level merge. Change notification is not a store
/// concern; the broadcast hub covers it best-effort.
#[async_trait]
pub trait BoardStore: Send + Sync {
    async fn get(&self, board_id: BoardId) -> Result<Option<Board>>;
    async fn upsert(&self, board: &Board) -> Result<()>;
}

/// The per-profile side of the gateway: one blob for the root aggregate
/// and one for the generated identity, each under a fixed key.
#[async_trait]
pub trait ProfileStore: Send + Sync {
    async fn load_root(&self) -> Result<Option<RootState>>;
    async fn save_root(&self, root: &RootState) -> Result<()>;
    async fn load_identity(&self) -> Result<Option<UserIdentity>>;
    async fn save_identity(&self, identity: &UserIdentity) -> Result<()>;
}

/// In-memory implementation of both store traits, used as a test double
/// wherever a database is overkill.
#[derive(Default)]
pub struct MemoryStore {
    boards: RwLock<HashMap<String, Board>>,
    root: RwLock<Option<RootState>>,
    identity: RwLock<Option<UserIdentity>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn board_count(&self) -> usize {
        self.boards.read().await.len()
    }
}

#[async_trait]
impl BoardStore for MemoryStore {
    async fn get(&self, board_id: BoardId) -> Result<Option<Board>> {
        let boards = self.boards.read().await;
        Ok(boards.get(&shared_board_key(board_id)).cloned())
    }

    async fn upsert(&self, board: &Board) -> Result<()> {
        let mut boards = self.boards.write().await;
        boards.insert(shared_board_key(board.id), board.clone());
        Ok(())
    }
}

#[async_trait]
impl ProfileStore for MemoryStore {
    async fn load_root(&self) -> Result<Option<RootState>> {
        Ok(self.root.read().await.clone())
    }

    async fn save_root(&self, root: &RootState) -> Result<()> {
        *self.root.write().await = Some(root.clone());
        Ok(())
    }

    async fn load_identity(&self) -> Result<Option<UserIdentity>> {
        Ok(self.identity.read().await.clone())
    }

    async fn save_identity(&self, identity: &UserIdentity) -> Result<()> {
        *self.identity.write().await = Some(identity.clone());
        Ok(())
    }
}
