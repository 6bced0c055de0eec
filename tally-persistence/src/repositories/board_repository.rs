use anyhow::{Context, Result};
use async_trait::async_trait;
use sea_orm::sea_query::OnConflict;
use sea_orm::{ActiveValue, DatabaseConnection, EntityTrait};

use crate::entities::{prelude::*, shared_boards};
use crate::store::{BoardStore, shared_board_key};
use tally_types::{Board, BoardId};

/// SeaORM-backed shared-record store. Each board is one JSON blob;
/// `upsert` replaces the whole row, so concurrent writers resolve to
/// whichever write lands last.
pub struct SharedBoardRepository {
    db: DatabaseConnection,
}

impl SharedBoardRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl BoardStore for SharedBoardRepository {
    async fn get(&self, board_id: BoardId) -> Result<Option<Board>> {
        let record = SharedBoards::find_by_id(shared_board_key(board_id))
            .one(&self.db)
            .await?;

        match record {
            Some(model) => {
                let board: Board = serde_json::from_str(&model.payload)
                    .with_context(|| format!("corrupt shared record for board {board_id}"))?;
                Ok(Some(board))
            }
            None => Ok(None),
        }
    }

    async fn upsert(&self, board: &Board) -> Result<()> {
        let payload = serde_json::to_string(board)?;

        let model = shared_boards::ActiveModel {
            key: ActiveValue::Set(shared_board_key(board.id)),
            payload: ActiveValue::Set(payload),
            updated_at: ActiveValue::Set(chrono::Utc::now().into()),
        };

        SharedBoards::insert(model)
            .on_conflict(
                OnConflict::column(shared_boards::Column::Key)
                    .update_columns([
                        shared_boards::Column::Payload,
                        shared_boards::Column::UpdatedAt,
                    ])
                    .to_owned(),
            )
            .exec(&self.db)
            .await?;

        tracing::debug!(board_id = %board.id, "shared record written");
        Ok(())
    }
}
