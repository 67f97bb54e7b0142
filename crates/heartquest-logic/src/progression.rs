//! XP normalization, heart policy and level gating.
//!
//! # Levels
//!
//! Levels 1-3 are each gated by a set of required mini-games. Finishing
//! every required game of level `n` unlocks level `n + 1`; level 4 is the
//! boss and level 5 (the future) never unlocks.
//!
//! ```
//! use heartquest_logic::games::GameKind;
//! use heartquest_logic::progression::{complete_game, default_level_progress, is_level_unlocked};
//!
//! let mut progress = default_level_progress();
//! complete_game(&mut progress, 1, GameKind::HeartClick);
//! assert!(!is_level_unlocked(&progress, 2));
//! assert!(complete_game(&mut progress, 1, GameKind::WordMatch));
//! assert!(is_level_unlocked(&progress, 2));
//! ```
//!
//! # Experience
//!
//! Raw mini-game scores are normalized per kind into an XP award, then
//! floored so that every successful run is worth something.

use serde::{Deserialize, Serialize};

use crate::constants::{limits, xp};
use crate::games::GameKind;

/// Progress record for one gated level.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LevelProgress {
    pub level: u8,
    /// Games finished successfully on this level. Never holds duplicates.
    pub completed_games: Vec<GameKind>,
    pub unlocked: bool,
}

impl LevelProgress {
    pub fn new(level: u8, unlocked: bool) -> Self {
        Self {
            level,
            completed_games: Vec::new(),
            unlocked,
        }
    }

    pub fn has_completed(&self, kind: GameKind) -> bool {
        self.completed_games.contains(&kind)
    }

    /// Whether every required game of this level has been completed.
    pub fn requirements_met(&self) -> bool {
        required_games(self.level)
            .iter()
            .all(|kind| self.has_completed(*kind))
    }
}

/// What the level map shows for a level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LevelStatus {
    Completed,
    InProgress,
    Boss,
    Locked,
}

/// Initial progress: four records, only level 1 unlocked.
pub fn default_level_progress() -> Vec<LevelProgress> {
    (1..=limits::GATED_LEVELS)
        .map(|level| LevelProgress::new(level, level == 1))
        .collect()
}

/// Games that must be completed to clear a level.
///
/// The boss level has no required games; it is gated from the level map,
/// not from here. Unknown levels have no requirements.
pub fn required_games(level: u8) -> &'static [GameKind] {
    match level {
        1 => &[GameKind::HeartClick, GameKind::WordMatch],
        2 => &[GameKind::Memory, GameKind::Puzzle],
        3 => &[GameKind::Reaction],
        _ => &[],
    }
}

/// The level a mini-game belongs to.
pub fn level_for_game(kind: GameKind) -> u8 {
    match kind {
        GameKind::HeartClick | GameKind::WordMatch => 1,
        GameKind::Memory | GameKind::Puzzle => 2,
        GameKind::Reaction => 3,
    }
}

/// Convert a mini-game result into an XP award.
///
/// Failures and empty runs earn nothing. Successful runs earn the per-kind
/// award, never less than [`xp::MIN_SUCCESS_XP`].
pub fn normalize_xp(kind: GameKind, raw_score: u32, success: bool) -> u32 {
    if !success || raw_score == 0 {
        return 0;
    }

    let award = match kind {
        GameKind::HeartClick => (raw_score / xp::HEART_CLICK_DIVISOR).min(xp::HEART_CLICK_CAP),
        GameKind::Memory => xp::MEMORY_FIXED,
        GameKind::Puzzle => xp::PUZZLE_FIXED,
        GameKind::Reaction => (raw_score / xp::REACTION_DIVISOR).min(xp::REACTION_CAP),
        GameKind::WordMatch => xp::WORD_MATCH_FIXED,
    };

    award.max(xp::MIN_SUCCESS_XP)
}

/// Heart change for a finished mini-game.
///
/// A success only grants a heart when below the cap and something was
/// scored. A failure always costs one.
pub fn heart_delta(success: bool, raw_score: u32, current_hearts: u32) -> i32 {
    if success {
        if current_hearts < limits::MAX_HEARTS && raw_score > 0 {
            1
        } else {
            0
        }
    } else {
        -1
    }
}

/// Apply a signed delta and clamp into `[0, max]`.
pub fn clamp_add(current: u32, delta: i64, max: u32) -> u32 {
    (current as i64 + delta).clamp(0, max as i64) as u32
}

/// Record a completed game and unlock the next level if this level is done.
///
/// Adding an already-completed game is a no-op. Returns whether the level's
/// requirements are satisfied after the call, so calling again after the
/// level is cleared keeps returning `true`. Unknown levels return `false`
/// without touching anything.
pub fn complete_game(progress: &mut [LevelProgress], level: u8, kind: GameKind) -> bool {
    let Some(record) = progress.iter_mut().find(|p| p.level == level) else {
        return false;
    };

    if !record.has_completed(kind) {
        record.completed_games.push(kind);
    }

    let cleared = record.requirements_met();
    if cleared && level < limits::GATED_LEVELS {
        if let Some(next) = progress.iter_mut().find(|p| p.level == level + 1) {
            next.unlocked = true;
        }
    }

    cleared
}

/// Whether a level can be entered.
pub fn is_level_unlocked(progress: &[LevelProgress], level: u8) -> bool {
    match level {
        1 => true,
        limits::FUTURE_LEVEL => false,
        _ => progress
            .iter()
            .find(|p| p.level == level)
            .map(|p| p.unlocked)
            .unwrap_or(false),
    }
}

/// Derive the level-map status of a level.
pub fn level_status(progress: &[LevelProgress], level: u8) -> LevelStatus {
    if level == limits::FUTURE_LEVEL || !is_level_unlocked(progress, level) {
        return LevelStatus::Locked;
    }
    if level == limits::BOSS_LEVEL {
        return LevelStatus::Boss;
    }

    let required = required_games(level);
    match progress.iter().find(|p| p.level == level) {
        Some(record) if !required.is_empty() && record.requirements_met() => LevelStatus::Completed,
        _ => LevelStatus::InProgress,
    }
}
