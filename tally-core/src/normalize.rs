use tally_types::{ScoreEntry, ScoreParticipant};

/// Canonicalize a score entry into its participant list.
///
/// The general shape wins: when `participants` is present it is returned
/// verbatim, order preserved. A legacy single-player entry (`player_id`
/// plus a finite `points`) becomes a one-element list. Anything else is
/// malformed and normalizes to empty, which makes it inert for
/// standings; nothing here ever fails.
pub fn normalize(entry: &ScoreEntry) -> Vec<ScoreParticipant> {
    if let Some(participants) = &entry.participants {
        return participants.clone();
    }

    if let (Some(player_id), Some(points)) = (entry.player_id, entry.points) {
        if points.is_finite() {
            return vec![ScoreParticipant { player_id, points }];
        }
    }

    Vec::new()
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn entry(
        participants: Option<Vec<ScoreParticipant>>,
        player_id: Option<Uuid>,
        points: Option<f64>,
    ) -> ScoreEntry {
        ScoreEntry {
            id: Uuid::new_v4(),
            activity_id: Uuid::new_v4(),
            timestamp: 0,
            participants,
            player_id,
            points,
        }
    }

    #[test]
    fn test_general_shape_round_trips_unchanged() {
        let participants = vec![
            ScoreParticipant {
                player_id: Uuid::new_v4(),
                points: 3.0,
            },
            ScoreParticipant {
                player_id: Uuid::new_v4(),
                points: 1.5,
            },
            ScoreParticipant {
                player_id: Uuid::new_v4(),
                points: -2.0,
            },
        ];

        let result = normalize(&entry(Some(participants.clone()), None, None));
        assert_eq!(result, participants);
    }

    #[test]
    fn test_empty_participant_list_round_trips() {
        let result = normalize(&entry(Some(Vec::new()), None, None));
        assert!(result.is_empty());
    }

    #[test]
    fn test_legacy_shape_becomes_single_participant() {
        let player_id = Uuid::new_v4();
        let result = normalize(&entry(None, Some(player_id), Some(2.0)));

        assert_eq!(
            result,
            vec![ScoreParticipant {
                player_id,
                points: 2.0
            }]
        );
    }

    #[test]
    fn test_participants_take_precedence_over_legacy_fields() {
        let listed = Uuid::new_v4();
        let legacy = Uuid::new_v4();
        let participants = vec![
            ScoreParticipant {
                player_id: listed,
                points: 1.0,
            },
            ScoreParticipant {
                player_id: Uuid::new_v4(),
                points: 0.0,
            },
        ];

        let result = normalize(&entry(Some(participants), Some(legacy), Some(9.0)));
        assert_eq!(result[0].player_id, listed);
        assert_eq!(result.len(), 2);
    }

    #[test]
    fn test_malformed_entries_normalize_to_empty() {
        // Neither shape present
        assert!(normalize(&entry(None, None, None)).is_empty());

        // Legacy player without points
        assert!(normalize(&entry(None, Some(Uuid::new_v4()), None)).is_empty());

        // Legacy points without player
        assert!(normalize(&entry(None, None, Some(1.0))).is_empty());

        // Non-finite legacy points
        assert!(normalize(&entry(None, Some(Uuid::new_v4()), Some(f64::NAN))).is_empty());
        assert!(normalize(&entry(None, Some(Uuid::new_v4()), Some(f64::INFINITY))).is_empty());
    }
}
