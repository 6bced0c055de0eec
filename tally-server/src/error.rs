use tally_types::{BoardId, ScoreValidationError};

use crate::photo::PhotoError;

/// Failures surfaced to the caller. Capability-gated mutations that get
/// ignored are not errors (they are silent no-ops); everything here is
/// an explicit rejection that leaves state untouched.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("board not found: {0}")]
    BoardNotFound(BoardId),
    #[error("only the owner can transfer ownership")]
    NotOwner,
    #[error("invalid score submission: {0:?}")]
    InvalidScore(ScoreValidationError),
    #[error("import rejected: {0}")]
    ImportFailed(String),
    #[error(transparent)]
    Photo(#[from] PhotoError),
}
