//! Best-score-per-kind leaderboard.

use serde::{Deserialize, Serialize};

use crate::games::GameKind;

/// The best score recorded for one game kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardEntry {
    pub game_kind: GameKind,
    pub score: u32,
    /// Unix time in milliseconds when the score was set.
    pub timestamp: u64,
}

/// Merge a score into the leaderboard.
///
/// The entry for `kind` is created or replaced only when `score` beats the
/// stored one strictly. Returns whether the leaderboard changed.
pub fn record_score(
    entries: &mut Vec<LeaderboardEntry>,
    kind: GameKind,
    score: u32,
    timestamp: u64,
) -> bool {
    let entry = LeaderboardEntry {
        game_kind: kind,
        score,
        timestamp,
    };

    match entries.iter_mut().find(|e| e.game_kind == kind) {
        Some(existing) if existing.score < score => {
            *existing = entry;
            true
        }
        Some(_) => false,
        None => {
            entries.push(entry);
            true
        }
    }
}

/// Best score for a kind, 0 when never played.
pub fn best_score(entries: &[LeaderboardEntry], kind: GameKind) -> u32 {
    entries
        .iter()
        .find(|e| e.game_kind == kind)
        .map(|e| e.score)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_score_is_recorded() {
        let mut entries = Vec::new();
        assert!(record_score(&mut entries, GameKind::Memory, 0, 1));
        assert_eq!(entries.len(), 1);
        assert_eq!(best_score(&entries, GameKind::Memory), 0);
    }

    #[test]
    fn test_only_strictly_higher_replaces() {
        let mut entries = Vec::new();
        record_score(&mut entries, GameKind::Puzzle, 40, 1);
        assert!(!record_score(&mut entries, GameKind::Puzzle, 40, 2));
        assert_eq!(entries[0].timestamp, 1);
        assert!(!record_score(&mut entries, GameKind::Puzzle, 12, 3));
        assert!(record_score(&mut entries, GameKind::Puzzle, 55, 4));
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].score, 55);
        assert_eq!(entries[0].timestamp, 4);
    }

    #[test]
    fn test_order_of_scores_does_not_matter() {
        let mut ascending = Vec::new();
        record_score(&mut ascending, GameKind::Reaction, 10, 1);
        record_score(&mut ascending, GameKind::Reaction, 30, 2);

        let mut descending = Vec::new();
        record_score(&mut descending, GameKind::Reaction, 30, 1);
        record_score(&mut descending, GameKind::Reaction, 10, 2);

        assert_eq!(best_score(&ascending, GameKind::Reaction), 30);
        assert_eq!(best_score(&descending, GameKind::Reaction), 30);
    }

    #[test]
    fn test_one_entry_per_kind() {
        let mut entries = Vec::new();
        for (i, kind) in GameKind::ALL.into_iter().enumerate() {
            record_score(&mut entries, kind, i as u32, 0);
            record_score(&mut entries, kind, i as u32 + 10, 0);
        }
        assert_eq!(entries.len(), GameKind::ALL.len());
        assert_eq!(best_score(&entries, GameKind::HeartClick), 10);
    }

    #[test]
    fn test_best_score_missing_kind() {
        assert_eq!(best_score(&[], GameKind::WordMatch), 0);
    }
}
