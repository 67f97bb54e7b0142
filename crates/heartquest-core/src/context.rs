//! Progress context - the progression engine over a key-value store.
//!
//! `ProgressContext` is the only place that reads or writes the persisted
//! records. Every read tolerates a missing key (first run) and a malformed
//! value (logged, then treated as the default), so none of these operations
//! can fail.

use std::collections::HashSet;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use heartquest_logic::constants::limits;
use heartquest_logic::games::GameKind;
use heartquest_logic::leaderboard::{self, LeaderboardEntry};
use heartquest_logic::progression::{self, LevelProgress, LevelStatus};

use crate::store::{keys, KeyValueStore, MemoryStore};

/// Final result of a mini-game, handed to the progression engine once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MiniGameOutcome {
    pub kind: GameKind,
    /// Score written to the leaderboard.
    pub score: u32,
    /// Score before any end-of-game multiplier; drives XP and hearts.
    pub raw_score: u32,
    pub success: bool,
}

/// Everything that changed when an outcome was applied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressReport {
    pub outcome: MiniGameOutcome,
    pub new_record: bool,
    pub xp_awarded: u32,
    pub xp: u32,
    pub hearts: u32,
    /// Level the game counts toward.
    pub level: u8,
    /// Whether that level's requirements are now all met.
    pub level_cleared: bool,
}

/// Persisted player progress.
pub struct ProgressContext<S: KeyValueStore = MemoryStore> {
    store: S,
}

impl ProgressContext<MemoryStore> {
    /// Context over a fresh in-memory store.
    pub fn in_memory() -> Self {
        Self::new(MemoryStore::new())
    }
}

impl<S: KeyValueStore> ProgressContext<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    // ── Raw record access ──────────────────────────────────────────────

    fn read_json<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let raw = self.store.get(key)?;
        match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(e) => {
                log::warn!("Discarding malformed record '{}': {}", key, e);
                None
            }
        }
    }

    fn write_json<T: Serialize>(&mut self, key: &str, value: &T) {
        match serde_json::to_string(value) {
            Ok(json) => self.store.set(key, json),
            Err(e) => log::warn!("Could not encode record '{}': {}", key, e),
        }
    }

    fn read_counter(&self, key: &str, default: u32, max: u32) -> u32 {
        let Some(raw) = self.store.get(key) else {
            return default;
        };
        match raw.trim().parse::<u32>() {
            Ok(value) => value.min(max),
            Err(e) => {
                log::warn!("Discarding malformed counter '{}' ({:?}): {}", key, raw, e);
                default
            }
        }
    }

    fn write_counter(&mut self, key: &str, value: u32) {
        self.store.set(key, value.to_string());
    }

    // ── Leaderboard ────────────────────────────────────────────────────

    pub fn leaderboard(&self) -> Vec<LeaderboardEntry> {
        self.read_json(keys::LEADERBOARD).unwrap_or_default()
    }

    /// Record a score if it beats the stored best. Returns whether it did.
    pub fn save_score(&mut self, kind: GameKind, score: u32, timestamp: u64) -> bool {
        let mut entries = self.leaderboard();
        if !leaderboard::record_score(&mut entries, kind, score, timestamp) {
            return false;
        }
        self.write_json(keys::LEADERBOARD, &entries);
        log::info!("New best score for {}: {}", kind, score);
        true
    }

    pub fn best_score(&self, kind: GameKind) -> u32 {
        leaderboard::best_score(&self.leaderboard(), kind)
    }

    // ── Level progress ─────────────────────────────────────────────────

    /// All four level records. Missing or malformed records fall back to the
    /// defaults, level by level, and a cleared level always opens the next.
    pub fn level_progress(&self) -> Vec<LevelProgress> {
        let stored: Vec<LevelProgress> = self
            .read_json::<Vec<serde_json::Value>>(keys::LEVEL_PROGRESS)
            .unwrap_or_default()
            .into_iter()
            .filter_map(|value| match serde_json::from_value(value) {
                Ok(record) => Some(record),
                Err(e) => {
                    log::warn!("Discarding malformed level record: {}", e);
                    None
                }
            })
            .collect();

        let mut progress: Vec<LevelProgress> = progression::default_level_progress()
            .into_iter()
            .map(|default| {
                let mut record = stored
                    .iter()
                    .find(|p| p.level == default.level)
                    .cloned()
                    .unwrap_or(default);
                if record.level == 1 {
                    record.unlocked = true;
                }
                let mut seen = HashSet::new();
                record.completed_games.retain(|kind| seen.insert(*kind));
                record
            })
            .collect();

        for level in 1..limits::GATED_LEVELS {
            let cleared = progress
                .iter()
                .any(|p| p.level == level && p.requirements_met());
            if let Some(next) = progress.iter_mut().find(|p| p.level == level + 1) {
                next.unlocked |= cleared;
            }
        }
        progress
    }

    fn save_level_progress(&mut self, progress: &[LevelProgress]) {
        self.write_json(keys::LEVEL_PROGRESS, &progress);
    }

    /// Mark a game as completed on a level and unlock the next level when
    /// the level's requirements are met.
    ///
    /// Returns whether the level is cleared after the call. Levels outside
    /// `1..=4` are ignored and return `false`.
    pub fn complete_game(&mut self, level: u8, kind: GameKind) -> bool {
        if !(1..=limits::GATED_LEVELS).contains(&level) {
            log::warn!("Ignoring completion of {} on unknown level {}", kind, level);
            return false;
        }

        let mut progress = self.level_progress();
        let next_was_unlocked = progression::is_level_unlocked(&progress, level + 1);
        let cleared = progression::complete_game(&mut progress, level, kind);
        self.save_level_progress(&progress);

        if !next_was_unlocked && progression::is_level_unlocked(&progress, level + 1) {
            log::info!("Level {} cleared, level {} unlocked", level, level + 1);
        }
        cleared
    }

    pub fn is_level_unlocked(&self, level: u8) -> bool {
        match level {
            1 => true,
            limits::FUTURE_LEVEL => false,
            _ => progression::is_level_unlocked(&self.level_progress(), level),
        }
    }

    pub fn level_status(&self, level: u8) -> LevelStatus {
        progression::level_status(&self.level_progress(), level)
    }

    // ── Hearts & XP ────────────────────────────────────────────────────

    pub fn hearts(&self) -> u32 {
        self.read_counter(keys::HEARTS, limits::INITIAL_HEARTS, limits::MAX_HEARTS)
    }

    pub fn xp(&self) -> u32 {
        self.read_counter(keys::XP, limits::INITIAL_XP, limits::MAX_XP)
    }

    pub fn set_hearts(&mut self, hearts: u32) -> u32 {
        let clamped = hearts.min(limits::MAX_HEARTS);
        self.write_counter(keys::HEARTS, clamped);
        clamped
    }

    pub fn set_xp(&mut self, xp: u32) -> u32 {
        let clamped = xp.min(limits::MAX_XP);
        self.write_counter(keys::XP, clamped);
        clamped
    }

    /// Add a signed delta to hearts, clamped to `[0, MAX_HEARTS]`.
    pub fn update_hearts(&mut self, delta: i32) -> u32 {
        let hearts = progression::clamp_add(self.hearts(), delta as i64, limits::MAX_HEARTS);
        self.set_hearts(hearts)
    }

    /// Add a signed delta to XP, clamped to `[0, MAX_XP]`.
    pub fn update_xp(&mut self, delta: i32) -> u32 {
        let xp = progression::clamp_add(self.xp(), delta as i64, limits::MAX_XP);
        self.set_xp(xp)
    }

    /// Convert a mini-game result into XP and add it. Returns the award.
    pub fn record_mini_game_result(&mut self, kind: GameKind, raw_score: u32, success: bool) -> u32 {
        let award = progression::normalize_xp(kind, raw_score, success);
        if award > 0 {
            let total = self.update_xp(award as i32);
            log::debug!("{} awarded {} XP (total {})", kind, award, total);
        }
        award
    }

    /// Gain or lose a heart for a finished mini-game. Returns the new count.
    pub fn apply_heart_delta(&mut self, success: bool, raw_score: u32) -> u32 {
        let current = self.hearts();
        match progression::heart_delta(success, raw_score, current) {
            0 => current,
            delta => self.update_hearts(delta),
        }
    }

    // ── Outcomes ───────────────────────────────────────────────────────

    /// Apply a finished mini-game: leaderboard, XP, hearts, then level
    /// completion for successful runs.
    pub fn apply_outcome(&mut self, outcome: &MiniGameOutcome, timestamp: u64) -> ProgressReport {
        let new_record = self.save_score(outcome.kind, outcome.score, timestamp);
        let xp_awarded =
            self.record_mini_game_result(outcome.kind, outcome.raw_score, outcome.success);
        let hearts = self.apply_heart_delta(outcome.success, outcome.raw_score);

        let level = progression::level_for_game(outcome.kind);
        let level_cleared = if outcome.success {
            self.complete_game(level, outcome.kind)
        } else {
            false
        };

        ProgressReport {
            outcome: *outcome,
            new_record,
            xp_awarded,
            xp: self.xp(),
            hearts,
            level,
            level_cleared,
        }
    }

    /// Overwrite every record from a save slot.
    pub(crate) fn restore(&mut self, save: &crate::persistence::SaveData) {
        self.write_json(keys::LEADERBOARD, &save.leaderboard);
        self.save_level_progress(&save.levels);
        self.set_hearts(save.hearts);
        self.set_xp(save.xp);
    }

    /// Wipe every persisted record in one step.
    pub fn reset_all_progress(&mut self) {
        self.store.remove_all(&keys::ALL);
        log::info!("All progress reset");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn outcome(kind: GameKind, score: u32, raw_score: u32, success: bool) -> MiniGameOutcome {
        MiniGameOutcome {
            kind,
            score,
            raw_score,
            success,
        }
    }

    #[test]
    fn test_first_run_defaults() {
        let ctx = ProgressContext::in_memory();
        assert_eq!(ctx.hearts(), 5);
        assert_eq!(ctx.xp(), 0);
        assert!(ctx.leaderboard().is_empty());
        assert_eq!(ctx.level_progress(), progression::default_level_progress());
    }

    #[test]
    fn test_corrupt_records_fall_back_to_defaults() {
        let mut store = MemoryStore::new();
        store.set(keys::HEARTS, "lots".to_string());
        store.set(keys::XP, "-4".to_string());
        store.set(keys::LEADERBOARD, "[{\"broken\"".to_string());
        store.set(keys::LEVEL_PROGRESS, "null".to_string());
        let ctx = ProgressContext::new(store);

        assert_eq!(ctx.hearts(), 5);
        assert_eq!(ctx.xp(), 0);
        assert!(ctx.leaderboard().is_empty());
        assert_eq!(ctx.level_progress(), progression::default_level_progress());
    }

    #[test]
    fn test_out_of_range_counters_are_clamped_on_read() {
        let mut store = MemoryStore::new();
        store.set(keys::HEARTS, "12".to_string());
        store.set(keys::XP, "250".to_string());
        let ctx = ProgressContext::new(store);
        assert_eq!(ctx.hearts(), 5);
        assert_eq!(ctx.xp(), 100);
    }

    #[test]
    fn test_one_bad_level_record_keeps_the_others() {
        let mut store = MemoryStore::new();
        store.set(
            keys::LEVEL_PROGRESS,
            r#"[{"level":1,"completedGames":["heart-click","word-match"],"unlocked":true},
                {"level":2,"completedGames":["sequence"],"unlocked":true}]"#
                .to_string(),
        );
        let ctx = ProgressContext::new(store);
        let progress = ctx.level_progress();
        assert_eq!(
            progress[0].completed_games,
            vec![GameKind::HeartClick, GameKind::WordMatch]
        );
        assert!(progress[1].completed_games.is_empty());
        assert!(ctx.is_level_unlocked(2));
        assert_eq!(ctx.level_status(1), LevelStatus::Completed);
        assert_eq!(ctx.level_status(2), LevelStatus::InProgress);
    }

    #[test]
    fn test_stored_duplicates_are_dropped() {
        let mut store = MemoryStore::new();
        store.set(
            keys::LEVEL_PROGRESS,
            r#"[{"level":1,"completedGames":["heart-click","word-match","heart-click"],"unlocked":true}]"#
                .to_string(),
        );
        let ctx = ProgressContext::new(store);
        assert_eq!(
            ctx.level_progress()[0].completed_games,
            vec![GameKind::HeartClick, GameKind::WordMatch]
        );
    }

    #[test]
    fn test_partial_progress_record_is_filled_in() {
        let mut store = MemoryStore::new();
        store.set(
            keys::LEVEL_PROGRESS,
            r#"[{"level":2,"completedGames":["memory"],"unlocked":true}]"#.to_string(),
        );
        let ctx = ProgressContext::new(store);
        let progress = ctx.level_progress();
        assert_eq!(progress.len(), 4);
        assert!(progress[0].unlocked);
        assert_eq!(progress[1].completed_games, vec![GameKind::Memory]);
        assert!(ctx.is_level_unlocked(2));
        assert!(!ctx.is_level_unlocked(3));
    }

    #[test]
    fn test_counters_stay_in_range() {
        let mut ctx = ProgressContext::in_memory();
        for _ in 0..10 {
            ctx.apply_heart_delta(false, 0);
        }
        assert_eq!(ctx.hearts(), 0);
        for _ in 0..10 {
            ctx.apply_heart_delta(true, 3);
        }
        assert_eq!(ctx.hearts(), 5);

        for _ in 0..10 {
            ctx.record_mini_game_result(GameKind::Puzzle, 60, true);
        }
        assert_eq!(ctx.xp(), 100);
        assert_eq!(ctx.update_xp(-500), 0);
        assert_eq!(ctx.update_hearts(i32::MAX), 5);
    }

    #[test]
    fn test_heart_needs_a_score() {
        let mut ctx = ProgressContext::in_memory();
        ctx.set_hearts(2);
        assert_eq!(ctx.apply_heart_delta(true, 0), 2);
        assert_eq!(ctx.apply_heart_delta(true, 1), 3);
        assert_eq!(ctx.apply_heart_delta(false, 50), 2);
    }

    #[test]
    fn test_record_mini_game_result() {
        let mut ctx = ProgressContext::in_memory();
        assert_eq!(ctx.record_mini_game_result(GameKind::HeartClick, 15, true), 5);
        assert_eq!(ctx.record_mini_game_result(GameKind::Memory, 0, false), 0);
        assert_eq!(ctx.xp(), 5);
    }

    #[test]
    fn test_save_score_keeps_best() {
        let mut ctx = ProgressContext::in_memory();
        assert!(ctx.save_score(GameKind::Memory, 40, 1));
        assert!(!ctx.save_score(GameKind::Memory, 20, 2));
        assert!(ctx.save_score(GameKind::Memory, 60, 3));
        assert_eq!(ctx.best_score(GameKind::Memory), 60);
        assert_eq!(ctx.best_score(GameKind::Puzzle), 0);
        assert_eq!(ctx.leaderboard().len(), 1);
    }

    #[test]
    fn test_complete_game_persists_and_unlocks() {
        let mut ctx = ProgressContext::in_memory();
        assert!(!ctx.complete_game(1, GameKind::HeartClick));
        assert!(ctx.complete_game(1, GameKind::WordMatch));
        assert!(ctx.is_level_unlocked(2));
        assert_eq!(ctx.level_status(1), LevelStatus::Completed);
        assert_eq!(ctx.level_status(2), LevelStatus::InProgress);

        // idempotent
        assert!(ctx.complete_game(1, GameKind::WordMatch));
        assert_eq!(
            ctx.level_progress()[0].completed_games,
            vec![GameKind::HeartClick, GameKind::WordMatch]
        );
    }

    #[test]
    fn test_complete_game_rejects_unknown_levels() {
        let mut ctx = ProgressContext::in_memory();
        assert!(!ctx.complete_game(0, GameKind::Memory));
        assert!(!ctx.complete_game(5, GameKind::Memory));
        assert_eq!(ctx.store().get(keys::LEVEL_PROGRESS), None);
    }

    #[test]
    fn test_apply_outcome_success() {
        let mut ctx = ProgressContext::in_memory();
        ctx.set_hearts(3);
        let report = ctx.apply_outcome(&outcome(GameKind::HeartClick, 30, 15, true), 7);

        assert!(report.new_record);
        assert_eq!(report.xp_awarded, 5);
        assert_eq!(report.xp, 5);
        assert_eq!(report.hearts, 4);
        assert_eq!(report.level, 1);
        assert!(!report.level_cleared);
        assert_eq!(ctx.best_score(GameKind::HeartClick), 30);
        assert!(ctx.level_progress()[0].has_completed(GameKind::HeartClick));
    }

    #[test]
    fn test_apply_outcome_failure() {
        let mut ctx = ProgressContext::in_memory();
        let report = ctx.apply_outcome(&outcome(GameKind::Reaction, 12, 12, false), 7);

        assert_eq!(report.xp_awarded, 0);
        assert_eq!(report.hearts, 4);
        assert!(!report.level_cleared);
        // failed runs still reach the leaderboard
        assert_eq!(ctx.best_score(GameKind::Reaction), 12);
        assert!(ctx.level_progress()[2].completed_games.is_empty());
    }

    #[test]
    fn test_reset_all_progress() {
        let mut ctx = ProgressContext::in_memory();
        ctx.apply_outcome(&outcome(GameKind::Puzzle, 70, 70, true), 1);
        ctx.set_hearts(1);
        ctx.complete_game(2, GameKind::Memory);
        ctx.reset_all_progress();

        assert_eq!(ctx.hearts(), 5);
        assert_eq!(ctx.xp(), 0);
        assert!(ctx.leaderboard().is_empty());
        assert_eq!(ctx.level_progress(), progression::default_level_progress());
        assert!(ctx.store().is_empty());
    }
}
