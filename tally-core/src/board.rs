use chrono::Utc;
use std::collections::HashSet;
use tally_types::{
    ActivityId, ActivityType, Board, BoardState, Player, PlayerId, ScoreDraft, ScoreEntry,
    ScoreId, ScoreParticipant, ScoreValidationError, UserId,
};
use uuid::Uuid;

/// Build a fresh board owned by `owner_id`. The edit token minted here
/// is the only bearer credential the board will ever have, unless
/// ownership transfer rotates it.
pub fn create_board(name: &str, owner_id: UserId) -> Board {
    Board {
        id: Uuid::new_v4(),
        name: name.to_string(),
        owner_id,
        edit_token: Uuid::new_v4().to_string(),
        state: BoardState::default(),
    }
}

/// Resolved edit capability for one request. Mutations through a viewer
/// handle are silent no-ops, not errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    Editor,
    Viewer,
}

impl Capability {
    pub fn from_flag(can_edit: bool) -> Self {
        if can_edit {
            Capability::Editor
        } else {
            Capability::Viewer
        }
    }

    pub fn can_edit(self) -> bool {
        matches!(self, Capability::Editor)
    }
}

/// Mutation surface of one board. Wraps a mutable borrow together with
/// the capability resolved by the access gate; state pushed in by
/// synchronization bypasses this entirely and is never gated.
pub struct BoardHandle<'a> {
    board: &'a mut Board,
    capability: Capability,
}

impl<'a> BoardHandle<'a> {
    pub fn new(board: &'a mut Board, capability: Capability) -> Self {
        Self { board, capability }
    }

    fn denied(&self, op: &str) -> bool {
        if self.capability.can_edit() {
            return false;
        }
        tracing::debug!(board_id = %self.board.id, op, "mutation ignored without edit capability");
        true
    }

    pub fn add_player(&mut self, name: &str) -> Option<PlayerId> {
        if self.denied("add_player") {
            return None;
        }

        let id = Uuid::new_v4();
        self.board.state.players.push(Player {
            id,
            name: name.to_string(),
            photo: None,
        });
        Some(id)
    }

    /// Replace a player's photo. Not capability-gated; see DESIGN.md.
    pub fn set_player_photo(&mut self, player_id: PlayerId, photo: Option<String>) -> bool {
        match self
            .board
            .state
            .players
            .iter_mut()
            .find(|p| p.id == player_id)
        {
            Some(player) => {
                player.photo = photo;
                true
            }
            None => false,
        }
    }

    pub fn add_activity(&mut self, name: &str) -> Option<ActivityId> {
        if self.denied("add_activity") {
            return None;
        }

        let id = Uuid::new_v4();
        self.board
            .state
            .activities
            .push(ActivityType {
                id,
                name: name.to_string(),
            });
        Some(id)
    }

    /// Record a score. The id and timestamp are always assigned here;
    /// whatever the caller had is ignored. The entry is prepended so
    /// the history stays newest-first.
    ///
    /// Validation is the boundary's job (`validate_score_draft`); this
    /// function accepts whatever it is handed. Draft rows without a
    /// chosen player cannot be represented in an entry and are dropped.
    pub fn add_score(&mut self, draft: &ScoreDraft) -> Option<ScoreId> {
        if self.denied("add_score") {
            return None;
        }

        let activity_id = draft.activity_id?;
        let participants: Vec<ScoreParticipant> = draft
            .participants
            .iter()
            .filter_map(|row| {
                row.player_id.map(|player_id| ScoreParticipant {
                    player_id,
                    points: row.points,
                })
            })
            .collect();

        let id = Uuid::new_v4();
        self.board.state.scores.insert(
            0,
            ScoreEntry {
                id,
                activity_id,
                timestamp: Utc::now().timestamp_millis(),
                participants: Some(participants),
                player_id: None,
                points: None,
            },
        );
        Some(id)
    }

    /// Undo: drop the most recently recorded score. No-op on an empty
    /// history.
    pub fn remove_last_score(&mut self) -> Option<ScoreId> {
        if self.denied("remove_last_score") {
            return None;
        }

        if self.board.state.scores.is_empty() {
            return None;
        }
        Some(self.board.state.scores.remove(0).id)
    }

    /// Empty the score history; players and activities survive.
    pub fn clear_scores(&mut self) -> usize {
        if self.denied("clear_scores") {
            return 0;
        }

        let removed = self.board.state.scores.len();
        self.board.state.scores.clear();
        removed
    }

    pub fn rename(&mut self, name: &str) -> bool {
        if self.denied("rename") {
            return false;
        }

        self.board.name = name.to_string();
        true
    }
}

/// Boundary validation for a score submission, run by the editor before
/// the draft reaches `add_score`.
pub fn validate_score_draft(draft: &ScoreDraft) -> Result<(), ScoreValidationError> {
    if draft.activity_id.is_none() {
        return Err(ScoreValidationError::NoActivitySelected);
    }

    if draft.participants.len() < 2 {
        return Err(ScoreValidationError::NotEnoughParticipants {
            count: draft.participants.len(),
        });
    }

    let mut seen = HashSet::new();
    for row in &draft.participants {
        let Some(player_id) = row.player_id else {
            return Err(ScoreValidationError::MissingPlayer);
        };
        if !row.points.is_finite() {
            return Err(ScoreValidationError::NonFiniteScore { player_id });
        }
        if !seen.insert(player_id) {
            return Err(ScoreValidationError::DuplicateParticipant { player_id });
        }
    }

    Ok(())
}

pub fn resolve_player(state: &BoardState, player_id: PlayerId) -> Option<&Player> {
    state.players.iter().find(|p| p.id == player_id)
}

pub fn resolve_activity(state: &BoardState, activity_id: ActivityId) -> Option<&ActivityType> {
    state.activities.iter().find(|a| a.id == activity_id)
}

/// Dangling references are tolerated everywhere they can appear; they
/// display as "unknown" rather than failing.
pub fn player_label(state: &BoardState, player_id: PlayerId) -> String {
    resolve_player(state, player_id)
        .map(|p| p.name.clone())
        .unwrap_or_else(|| "unknown".to_string())
}

pub fn activity_label(state: &BoardState, activity_id: ActivityId) -> String {
    resolve_activity(state, activity_id)
        .map(|a| a.name.clone())
        .unwrap_or_else(|| "unknown".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::standings::StandingsEngine;
    use tally_types::DraftParticipant;

    fn editor(board: &mut Board) -> BoardHandle<'_> {
        BoardHandle::new(board, Capability::Editor)
    }

    fn viewer(board: &mut Board) -> BoardHandle<'_> {
        BoardHandle::new(board, Capability::Viewer)
    }

    fn draft(activity_id: ActivityId, rows: Vec<(PlayerId, f64)>) -> ScoreDraft {
        ScoreDraft {
            activity_id: Some(activity_id),
            participants: rows
                .into_iter()
                .map(|(player_id, points)| DraftParticipant {
                    player_id: Some(player_id),
                    points,
                })
                .collect(),
        }
    }

    fn board_with_roster() -> (Board, PlayerId, PlayerId, ActivityId) {
        let mut board = create_board("Office cup", Uuid::new_v4());
        let mut handle = editor(&mut board);
        let a = handle.add_player("Ada").unwrap();
        let b = handle.add_player("Ben").unwrap();
        let activity = handle.add_activity("Darts").unwrap();
        (board, a, b, activity)
    }

    #[test]
    fn test_add_player_and_activity() {
        let (board, a, _, activity) = board_with_roster();

        assert_eq!(board.state.players.len(), 2);
        assert_eq!(board.state.activities.len(), 1);
        assert_eq!(resolve_player(&board.state, a).unwrap().name, "Ada");
        assert_eq!(
            resolve_activity(&board.state, activity).unwrap().name,
            "Darts"
        );
        assert!(board.state.players[0].photo.is_none());
    }

    #[test]
    fn test_viewer_mutations_are_no_ops() {
        let (mut board, a, b, activity) = board_with_roster();
        let before = board.state.players.len();

        let mut handle = viewer(&mut board);
        assert!(handle.add_player("Mallory").is_none());
        assert!(handle.add_activity("Chess").is_none());
        assert!(handle.add_score(&draft(activity, vec![(a, 1.0), (b, 0.0)])).is_none());
        assert!(handle.remove_last_score().is_none());
        assert_eq!(handle.clear_scores(), 0);
        assert!(!handle.rename("Hijacked"));

        assert_eq!(board.state.players.len(), before);
        assert!(board.state.scores.is_empty());
        assert_eq!(board.name, "Office cup");
    }

    #[test]
    fn test_set_player_photo_is_not_gated() {
        let (mut board, a, _, _) = board_with_roster();

        let mut handle = viewer(&mut board);
        assert!(handle.set_player_photo(a, Some("data:image/jpeg;base64,AAAA".into())));
        assert!(board.state.players[0].photo.is_some());

        // Unknown player is a quiet no-op.
        let mut handle = viewer(&mut board);
        assert!(!handle.set_player_photo(Uuid::new_v4(), None));
    }

    #[test]
    fn test_add_score_prepends_and_assigns_fresh_identity() {
        let (mut board, a, b, activity) = board_with_roster();

        let mut handle = editor(&mut board);
        let first = handle.add_score(&draft(activity, vec![(a, 1.0), (b, 0.0)])).unwrap();
        let second = handle.add_score(&draft(activity, vec![(a, 0.0), (b, 2.0)])).unwrap();

        assert_ne!(first, second);
        assert_eq!(board.state.scores.len(), 2);
        // Newest-first: the second entry is the head.
        assert_eq!(board.state.scores[0].id, second);
        assert_eq!(board.state.scores[1].id, first);
        assert!(board.state.scores[0].timestamp > 0);
    }

    #[test]
    fn test_remove_last_score_pops_the_head() {
        let (mut board, a, b, activity) = board_with_roster();

        let mut handle = editor(&mut board);
        handle.add_score(&draft(activity, vec![(a, 1.0), (b, 0.0)])).unwrap();
        let newest = handle.add_score(&draft(activity, vec![(a, 0.0), (b, 2.0)])).unwrap();

        assert_eq!(handle.remove_last_score(), Some(newest));
        assert_eq!(board.state.scores.len(), 1);

        let mut handle = editor(&mut board);
        handle.remove_last_score();
        // Empty history: undo is a no-op.
        assert_eq!(handle.remove_last_score(), None);
    }

    #[test]
    fn test_clear_scores_keeps_roster() {
        let (mut board, a, b, activity) = board_with_roster();

        let mut handle = editor(&mut board);
        handle.add_score(&draft(activity, vec![(a, 1.0), (b, 0.0)])).unwrap();
        handle.add_score(&draft(activity, vec![(a, 2.0), (b, 2.0)])).unwrap();

        assert_eq!(handle.clear_scores(), 2);
        assert!(board.state.scores.is_empty());
        assert_eq!(board.state.players.len(), 2);
        assert_eq!(board.state.activities.len(), 1);
    }

    #[test]
    fn test_undo_then_redo_is_idempotent_on_standings() {
        let (mut board, a, b, activity) = board_with_roster();
        let repeat = draft(activity, vec![(a, 3.0), (b, 1.0)]);

        let mut handle = editor(&mut board);
        handle.add_score(&draft(activity, vec![(a, 1.0), (b, 2.0)])).unwrap();
        handle.add_score(&repeat).unwrap();

        let before = StandingsEngine::compute(&board.state.scores);

        let mut handle = editor(&mut board);
        handle.remove_last_score().unwrap();
        handle.add_score(&repeat).unwrap();

        // Fresh id and timestamp, identical standings.
        assert_eq!(StandingsEngine::compute(&board.state.scores), before);
    }

    #[test]
    fn test_validate_score_draft_cases() {
        let (a, b) = (Uuid::new_v4(), Uuid::new_v4());
        let activity = Uuid::new_v4();

        assert_eq!(
            validate_score_draft(&ScoreDraft {
                activity_id: None,
                participants: vec![],
            }),
            Err(ScoreValidationError::NoActivitySelected)
        );

        assert_eq!(
            validate_score_draft(&draft(activity, vec![(a, 1.0)])),
            Err(ScoreValidationError::NotEnoughParticipants { count: 1 })
        );

        let mut missing = draft(activity, vec![(a, 1.0), (b, 2.0)]);
        missing.participants[1].player_id = None;
        assert_eq!(
            validate_score_draft(&missing),
            Err(ScoreValidationError::MissingPlayer)
        );

        assert_eq!(
            validate_score_draft(&draft(activity, vec![(a, 1.0), (b, f64::NAN)])),
            Err(ScoreValidationError::NonFiniteScore { player_id: b })
        );

        assert_eq!(
            validate_score_draft(&draft(activity, vec![(a, 1.0), (a, 2.0)])),
            Err(ScoreValidationError::DuplicateParticipant { player_id: a })
        );

        assert_eq!(validate_score_draft(&draft(activity, vec![(a, 1.0), (b, 2.0)])), Ok(()));
    }

    #[test]
    fn test_dangling_references_render_as_unknown() {
        let (board, a, _, activity) = board_with_roster();

        assert_eq!(player_label(&board.state, a), "Ada");
        assert_eq!(activity_label(&board.state, activity), "Darts");
        assert_eq!(player_label(&board.state, Uuid::new_v4()), "unknown");
        assert_eq!(activity_label(&board.state, Uuid::new_v4()), "unknown");
    }
}
