use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tally_types::{Player, PlayerId, ScoreEntry};

use crate::normalize::normalize;

/// Standings points awarded for a match outcome: an outright win is
/// worth 2, each side of a top-score tie is worth 1, everyone else 0.
pub const WIN_POINTS: i64 = 2;
pub const DRAW_POINTS: i64 = 1;

/// One display row of the leaderboard.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StandingRow {
    pub player: Player,
    pub points: i64,
}

pub struct StandingsEngine;

impl StandingsEngine {
    /// Standings contribution of a single entry.
    ///
    /// A match needs at least two sides to produce an outcome, so
    /// anything that normalizes to fewer than two participants yields
    /// an empty map. Ties are exact `f64` equality; there is no epsilon
    /// for fractional points. Duplicate participant ids are unusual but
    /// defined: their awards accumulate under the same key.
    pub fn entry_delta(entry: &ScoreEntry) -> HashMap<PlayerId, i64> {
        let participants = normalize(entry);
        let mut delta = HashMap::new();

        if participants.len() < 2 {
            return delta;
        }

        let mut max_points = f64::NEG_INFINITY;
        for participant in &participants {
            if participant.points > max_points {
                max_points = participant.points;
            }
        }

        let top: Vec<_> = participants
            .iter()
            .filter(|p| p.points == max_points)
            .collect();

        match top.len() {
            0 => {} // every score was NaN; nothing to award
            1 => {
                *delta.entry(top[0].player_id).or_insert(0) += WIN_POINTS;
            }
            _ => {
                for participant in top {
                    *delta.entry(participant.player_id).or_insert(0) += DRAW_POINTS;
                }
            }
        }

        delta
    }

    /// Fold every entry's delta into accumulated totals.
    ///
    /// Recomputed from scratch on every read; addition commutes, so the
    /// result is independent of history order. Players with no entries
    /// are absent from the map and read as 0.
    pub fn compute(history: &[ScoreEntry]) -> HashMap<PlayerId, i64> {
        let mut totals = HashMap::new();

        for entry in history {
            for (player_id, points) in Self::entry_delta(entry) {
                *totals.entry(player_id).or_insert(0) += points;
            }
        }

        totals
    }

    /// Rank the roster by descending standings points. The sort is
    /// stable, so players tied on points keep their roster order.
    pub fn ranked(players: &[Player], totals: &HashMap<PlayerId, i64>) -> Vec<StandingRow> {
        let mut rows: Vec<StandingRow> = players
            .iter()
            .map(|player| StandingRow {
                player: player.clone(),
                points: totals.get(&player.id).copied().unwrap_or(0),
            })
            .collect();

        rows.sort_by(|a, b| b.points.cmp(&a.points));
        rows
    }
}
