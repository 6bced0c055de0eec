use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

/// Boundary validation failures for a score submission. The core never
/// re-validates; these are raised before a draft reaches it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub enum ScoreValidationError {
    NoActivitySelected,
    NotEnoughParticipants { count: usize },
    MissingPlayer,
    NonFiniteScore { player_id: Uuid },
    DuplicateParticipant { player_id: Uuid },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub enum BoardError {
    BoardNotFound { board_id: Uuid },
    PlayerNotFound { player_id: Uuid },
    EditDenied,
    NotOwner,
    ImportFailed { message: String },
}
