use tally_types::{Board, BoardError, UserId};
use uuid::Uuid;

/// The edit gate: owners edit, and so does anyone presenting the exact
/// edit token. The token is a bearer capability equal in strength to
/// ownership; an empty or absent token never matches.
pub fn can_edit(board: &Board, user_id: UserId, presented_token: Option<&str>) -> bool {
    if board.owner_id == user_id {
        return true;
    }

    match presented_token {
        Some(token) if !token.is_empty() => token == board.edit_token,
        _ => false,
    }
}

/// Move ownership to another user. Strictly owner-only: a caller whose
/// capability comes from token possession is rejected, which is why
/// this is its own guard and not a reuse of `can_edit`. A successful
/// transfer rotates the edit token so previously shared manage links
/// stop granting edit rights.
pub fn transfer_ownership(
    board: &mut Board,
    caller_id: UserId,
    new_owner_id: UserId,
) -> Result<(), BoardError> {
    if board.owner_id != caller_id {
        return Err(BoardError::NotOwner);
    }

    tracing::info!(board_id = %board.id, %new_owner_id, "transferring board ownership");
    board.owner_id = new_owner_id;
    board.edit_token = Uuid::new_v4().to_string();
    Ok(())
}
