use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

use crate::user::UserIdentity;

pub type BoardId = Uuid;
pub type PlayerId = Uuid;
pub type ActivityId = Uuid;
pub type ScoreId = Uuid;
pub type UserId = Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
    /// Inline base64-encoded JPEG, bounded to 256px on the longest side.
    pub photo: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ActivityType {
    pub id: ActivityId,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ScoreParticipant {
    pub player_id: PlayerId,
    pub points: f64,
}

/// One recorded match. The general shape carries `participants`; older
/// payloads carry a single `player_id`/`points` pair instead and must
/// still deserialize. Normalization picks between the two on read.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ScoreEntry {
    pub id: ScoreId,
    pub activity_id: ActivityId,
    pub timestamp: i64, // epoch millis
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub participants: Option<Vec<ScoreParticipant>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub player_id: Option<PlayerId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub points: Option<f64>,
}

/// One editor row of a score submission; the player may not have been
/// chosen yet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct DraftParticipant {
    pub player_id: Option<PlayerId>,
    pub points: f64,
}

/// A score submission as it leaves the editor, before the core assigns
/// an id and timestamp.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ScoreDraft {
    pub activity_id: Option<ActivityId>,
    pub participants: Vec<DraftParticipant>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct BoardState {
    pub players: Vec<Player>,
    pub activities: Vec<ActivityType>,
    /// Newest-first; undo removes the head.
    pub scores: Vec<ScoreEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Board {
    pub id: BoardId,
    pub name: String,
    pub owner_id: UserId,
    /// Bearer secret: anyone presenting the exact token edits as if
    /// they were the owner.
    pub edit_token: String,
    pub state: BoardState,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct RootState {
    pub boards: Vec<Board>,
    pub selected_board_id: Option<BoardId>,
    pub current_user: UserIdentity,
}

impl RootState {
    pub fn new(current_user: UserIdentity) -> Self {
        Self {
            boards: Vec::new(),
            selected_board_id: None,
            current_user,
        }
    }

    pub fn find_board(&self, board_id: BoardId) -> Option<&Board> {
        self.boards.iter().find(|b| b.id == board_id)
    }

    pub fn find_board_mut(&mut self, board_id: BoardId) -> Option<&mut Board> {
        self.boards.iter_mut().find(|b| b.id == board_id)
    }
}
