//! Mini-game kinds.
//!
//! The serialized ids (`"heart-click"`, `"word-match"`, ...) are the ones
//! written into the leaderboard and level-progress records, so they must
//! stay stable.

use serde::{Deserialize, Serialize};

/// The five mini-games.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum GameKind {
    /// Timed target click: catch floating hearts before the clock runs out.
    HeartClick,
    /// Flip cards to find eight symbol pairs.
    Memory,
    /// Click each target as fast as possible.
    Reaction,
    /// Swap numbered tiles back into order.
    Puzzle,
    /// Pair up related words.
    WordMatch,
}

impl GameKind {
    /// All game kinds in level order.
    pub const ALL: [GameKind; 5] = [
        GameKind::HeartClick,
        GameKind::WordMatch,
        GameKind::Memory,
        GameKind::Puzzle,
        GameKind::Reaction,
    ];

    /// Stable storage id.
    pub fn id(self) -> &'static str {
        match self {
            GameKind::HeartClick => "heart-click",
            GameKind::Memory => "memory",
            GameKind::Reaction => "reaction",
            GameKind::Puzzle => "puzzle",
            GameKind::WordMatch => "word-match",
        }
    }

    /// Parse a storage id. Unknown ids return `None`.
    pub fn from_id(id: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.id() == id)
    }

    /// Whether the game runs against a countdown clock.
    pub fn is_timed(self) -> bool {
        matches!(self, GameKind::HeartClick)
    }

    /// Whether the game is a pair-matching game with mismatch penalties.
    pub fn is_matching(self) -> bool {
        matches!(self, GameKind::Memory | GameKind::WordMatch)
    }
}

impl std::fmt::Display for GameKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.id())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_roundtrip() {
        for kind in GameKind::ALL {
            assert_eq!(GameKind::from_id(kind.id()), Some(kind));
        }
        assert_eq!(GameKind::from_id("sequence"), None);
    }

    #[test]
    fn test_display_matches_id() {
        assert_eq!(GameKind::WordMatch.to_string(), "word-match");
        assert_eq!(GameKind::HeartClick.to_string(), "heart-click");
    }

    #[test]
    fn test_categories() {
        assert!(GameKind::HeartClick.is_timed());
        assert!(!GameKind::Reaction.is_timed());
        assert!(GameKind::Memory.is_matching());
        assert!(GameKind::WordMatch.is_matching());
        assert!(!GameKind::Puzzle.is_matching());
    }
}
