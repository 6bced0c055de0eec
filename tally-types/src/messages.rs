use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::board::{Board, PlayerId, ScoreDraft, UserId};

/// Payload exchanged on a board's live channel. Delivery is best-effort
/// and at-most-once; whichever snapshot arrives last wins, so applying
/// the same snapshot twice must not change derived output.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub enum SyncMessage {
    Snapshot { board: Board },
}

/// Locally-originated edits. Commands other than `SetPlayerPhoto` are
/// gated by the edit capability; `TransferOwnership` takes the stricter
/// owner-only guard.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub enum BoardCommand {
    AddPlayer { name: String },
    AddActivity { name: String },
    RecordScore { draft: ScoreDraft },
    UndoLastScore,
    ClearScores,
    RenameBoard { name: String },
    SetPlayerPhoto { player_id: PlayerId, photo: Option<String> },
    TransferOwnership { new_owner_id: UserId },
}
