use tally_core::{BoardHandle, Capability, create_board};
use tally_types::{Board, DraftParticipant, PlayerId, ScoreDraft, ScoreEntry, ScoreParticipant};
use uuid::Uuid;

/// Creates a board with two players and one activity, returning the ids
/// needed to record scores against it.
pub fn create_standard_board() -> (Board, PlayerId, PlayerId, Uuid) {
    let mut board = create_board("Office cup", Uuid::new_v4());
    let mut handle = BoardHandle::new(&mut board, Capability::Editor);
    let ada = handle.add_player("Ada").unwrap();
    let ben = handle.add_player("Ben").unwrap();
    let darts = handle.add_activity("Darts").unwrap();
    (board, ada, ben, darts)
}

/// Builds a valid multi-participant draft.
pub fn draft(activity_id: Uuid, rows: &[(PlayerId, f64)]) -> ScoreDraft {
    ScoreDraft {
        activity_id: Some(activity_id),
        participants: rows
            .iter()
            .map(|(player_id, points)| DraftParticipant {
                player_id: Some(*player_id),
                points: *points,
            })
            .collect(),
    }
}

/// Builds a general-shape entry directly, bypassing the editor.
pub fn match_entry(rows: &[(PlayerId, f64)]) -> ScoreEntry {
    ScoreEntry {
        id: Uuid::new_v4(),
        activity_id: Uuid::new_v4(),
        timestamp: 0,
        participants: Some(
            rows.iter()
                .map(|(player_id, points)| ScoreParticipant {
                    player_id: *player_id,
                    points: *points,
                })
                .collect(),
        ),
        player_id: None,
        points: None,
    }
}

/// Builds a legacy single-player entry.
pub fn legacy_entry(player_id: PlayerId, points: f64) -> ScoreEntry {
    ScoreEntry {
        id: Uuid::new_v4(),
        activity_id: Uuid::new_v4(),
        timestamp: 0,
        participants: None,
        player_id: Some(player_id),
        points: Some(points),
    }
}
