use tally_types::{Board, BoardId};
use uuid::Uuid;

/// An external reference to a board. The id alone grants view access
/// (and the shared-record fetch); carrying the edit token grants manage
/// rights to whoever holds the link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShareLink {
    pub board_id: BoardId,
    pub edit_token: Option<String>,
}

impl ShareLink {
    pub fn view(board: &Board) -> Self {
        Self {
            board_id: board.id,
            edit_token: None,
        }
    }

    pub fn manage(board: &Board) -> Self {
        Self {
            board_id: board.id,
            edit_token: Some(board.edit_token.clone()),
        }
    }

    /// Render the query-style reference embedded in a shared URL.
    pub fn to_reference(&self) -> String {
        match &self.edit_token {
            Some(token) => format!("{}?edit={}", self.board_id, token),
            None => self.board_id.to_string(),
        }
    }

    pub fn parse(reference: &str) -> Option<Self> {
        let (id_part, edit_token) = match reference.split_once("?edit=") {
            Some((id, token)) if !token.is_empty() => (id, Some(token.to_string())),
            Some((id, _)) => (id, None),
            None => (reference, None),
        };

        let board_id = Uuid::parse_str(id_part.trim()).ok()?;
        Some(Self {
            board_id,
            edit_token,
        })
    }
}
