//! Game engine - the boundary the UI talks to.
//!
//! `GameEngine` owns the progress context, every open mini-game session and
//! every boss encounter. The UI starts games, forwards clicks, advances time
//! and reads snapshots; finished sessions are settled against the progress
//! context exactly once and their reports queued for `drain_reports`.

use std::collections::BTreeMap;
use std::io::{Read, Write};
use std::time::{SystemTime, UNIX_EPOCH};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use heartquest_logic::games::GameKind;
use heartquest_logic::leaderboard::LeaderboardEntry;
use heartquest_logic::progression::{LevelProgress, LevelStatus};

use crate::boss::{BossAction, BossEncounter, BossSnapshot};
use crate::config::EngineConfig;
use crate::context::{ProgressContext, ProgressReport};
use crate::persistence::{self, SaveData, SaveError};
use crate::session::{MiniGameSession, PlayerAction, SessionSnapshot};
use crate::store::{KeyValueStore, MemoryStore};

/// Wall clock used to timestamp leaderboard entries.
pub trait Clock {
    /// Milliseconds since the unix epoch.
    fn now_ms(&self) -> u64;
}

pub struct SystemClock;

impl Clock for SystemClock {
    fn now_ms(&self) -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SessionHandle(u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct BossHandle(u32);

/// Main engine
///
/// Sessions and encounters stay open after they end so the UI can keep
/// drawing the result screen. They are only dropped by `close_session`,
/// `close_boss` or `close_finished`.
pub struct GameEngine<S: KeyValueStore = MemoryStore> {
    progress: ProgressContext<S>,
    config: EngineConfig,
    rng: StdRng,
    clock: Box<dyn Clock>,
    sessions: BTreeMap<SessionHandle, MiniGameSession>,
    bosses: BTreeMap<BossHandle, BossEncounter>,
    reports: Vec<ProgressReport>,
    next_handle: u32,
}

impl GameEngine<MemoryStore> {
    /// Engine over a fresh in-memory store.
    pub fn new(config: EngineConfig) -> Self {
        Self::with_store(MemoryStore::new(), config)
    }
}

impl Default for GameEngine<MemoryStore> {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}

impl<S: KeyValueStore> GameEngine<S> {
    pub fn with_store(store: S, config: EngineConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self {
            progress: ProgressContext::new(store),
            config,
            rng,
            clock: Box::new(SystemClock),
            sessions: BTreeMap::new(),
            bosses: BTreeMap::new(),
            reports: Vec::new(),
            next_handle: 0,
        }
    }

    /// Replace the wall clock, e.g. with a fixed one in tests.
    pub fn with_clock(mut self, clock: Box<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn progress(&self) -> &ProgressContext<S> {
        &self.progress
    }

    pub fn progress_mut(&mut self) -> &mut ProgressContext<S> {
        &mut self.progress
    }

    fn next_handle(&mut self) -> u32 {
        let handle = self.next_handle;
        self.next_handle += 1;
        handle
    }

    fn child_rng(&mut self) -> StdRng {
        StdRng::seed_from_u64(self.rng.gen())
    }

    // ── Mini-games ─────────────────────────────────────────────────────

    pub fn start_mini_game(&mut self, kind: GameKind) -> SessionHandle {
        let rng = self.child_rng();
        let best = self.progress.best_score(kind);
        let session = MiniGameSession::new(kind, &self.config, rng, best);
        self.insert_session(session)
    }

    /// Start a puzzle over a fixed tile layout instead of a shuffle.
    pub fn start_puzzle_with_tiles(&mut self, tiles: Vec<u8>) -> SessionHandle {
        let rng = self.child_rng();
        let best = self.progress.best_score(GameKind::Puzzle);
        let session = MiniGameSession::puzzle_with_tiles(tiles, &self.config, rng, best);
        self.insert_session(session)
    }

    fn insert_session(&mut self, session: MiniGameSession) -> SessionHandle {
        let handle = SessionHandle(self.next_handle());
        log::info!("Started {} as {:?}", session.kind(), handle);
        self.sessions.insert(handle, session);
        handle
    }

    pub fn session_snapshot(&self, handle: SessionHandle) -> Option<SessionSnapshot> {
        self.sessions.get(&handle).map(MiniGameSession::snapshot)
    }

    pub fn session(&self, handle: SessionHandle) -> Option<&MiniGameSession> {
        self.sessions.get(&handle)
    }

    /// Forward a click. Unknown handles and ignored clicks return false.
    pub fn handle_player_action(&mut self, handle: SessionHandle, action: PlayerAction) -> bool {
        let Some(session) = self.sessions.get_mut(&handle) else {
            log::warn!("Action {:?} for unknown session {:?}", action, handle);
            return false;
        };
        let changed = session.handle_action(action);
        self.settle(handle);
        changed
    }

    /// Drop a session. An unfinished session leaves no trace in progress.
    pub fn close_session(&mut self, handle: SessionHandle) -> bool {
        self.sessions.remove(&handle).is_some()
    }

    /// Hand a finished session's outcome to the progress context, once.
    fn settle(&mut self, handle: SessionHandle) {
        let Some(session) = self.sessions.get_mut(&handle) else {
            return;
        };
        let Some(outcome) = session.take_outcome() else {
            return;
        };
        let report = self.progress.apply_outcome(&outcome, self.clock.now_ms());
        session.set_new_record(report.new_record);
        self.reports.push(report);
    }

    // ── Boss ───────────────────────────────────────────────────────────

    pub fn start_boss_encounter(&mut self) -> BossHandle {
        let rng = self.child_rng();
        let handle = BossHandle(self.next_handle());
        self.bosses
            .insert(handle, BossEncounter::new(rng, self.config.boss_attack_chance));
        log::info!("Boss encounter {:?} started", handle);
        handle
    }

    pub fn boss_snapshot(&self, handle: BossHandle) -> Option<BossSnapshot> {
        self.bosses.get(&handle).map(BossEncounter::snapshot)
    }

    pub fn handle_boss_action(&mut self, handle: BossHandle, action: BossAction) -> bool {
        self.bosses
            .get_mut(&handle)
            .is_some_and(|boss| boss.handle_action(action))
    }

    pub fn reset_boss(&mut self, handle: BossHandle) -> bool {
        match self.bosses.get_mut(&handle) {
            Some(boss) => {
                boss.reset();
                true
            }
            None => false,
        }
    }

    pub fn close_boss(&mut self, handle: BossHandle) -> bool {
        self.bosses.remove(&handle).is_some()
    }

    /// Drop every session and encounter that has ended. Outcomes are
    /// already settled by then. Returns how many were dropped.
    pub fn close_finished(&mut self) -> usize {
        let before = self.sessions.len() + self.bosses.len();
        self.sessions.retain(|_, session| !session.is_finished());
        self.bosses.retain(|_, boss| !boss.is_over());
        before - self.sessions.len() - self.bosses.len()
    }

    pub fn open_count(&self) -> usize {
        self.sessions.len() + self.bosses.len()
    }

    // ── Time ───────────────────────────────────────────────────────────

    /// Advance every open session and encounter by `delta_ms`.
    pub fn advance(&mut self, delta_ms: u64) {
        let handles: Vec<SessionHandle> = self.sessions.keys().copied().collect();
        for handle in handles {
            if let Some(session) = self.sessions.get_mut(&handle) {
                session.advance(delta_ms);
            }
            self.settle(handle);
        }
        for boss in self.bosses.values_mut() {
            boss.advance(delta_ms);
        }
    }

    /// Reports of sessions settled since the last call, oldest first.
    pub fn drain_reports(&mut self) -> Vec<ProgressReport> {
        std::mem::take(&mut self.reports)
    }

    // ── Progress queries ───────────────────────────────────────────────

    pub fn level_status(&self, level: u8) -> LevelStatus {
        self.progress.level_status(level)
    }

    pub fn hearts(&self) -> u32 {
        self.progress.hearts()
    }

    pub fn xp(&self) -> u32 {
        self.progress.xp()
    }

    pub fn best_score(&self, kind: GameKind) -> u32 {
        self.progress.best_score(kind)
    }

    pub fn leaderboard(&self) -> Vec<LeaderboardEntry> {
        self.progress.leaderboard()
    }

    pub fn level_progress(&self) -> Vec<LevelProgress> {
        self.progress.level_progress()
    }

    pub fn reset_all_progress(&mut self) {
        self.progress.reset_all_progress();
    }

    // ── Save slots ─────────────────────────────────────────────────────

    pub fn save_progress<W: Write>(&self, writer: W) -> Result<(), SaveError> {
        persistence::save_progress(writer, &self.progress)
    }

    pub fn load_progress<R: Read>(&mut self, reader: R) -> Result<SaveData, SaveError> {
        persistence::load_progress(reader, &mut self.progress)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::boss::BossState;
    use crate::session::SessionPhase;

    struct FixedClock(u64);

    impl Clock for FixedClock {
        fn now_ms(&self) -> u64 {
            self.0
        }
    }

    fn quiet_engine() -> GameEngine {
        let config = EngineConfig {
            power_up_chance: 0.0,
            boss_attack_chance: 0.0,
            ..EngineConfig::seeded(42)
        };
        GameEngine::new(config).with_clock(Box::new(FixedClock(1_700_000_000_000)))
    }

    #[test]
    fn test_unknown_handles() {
        let mut engine = quiet_engine();
        let session = engine.start_mini_game(GameKind::Memory);
        assert!(engine.close_session(session));
        assert!(!engine.close_session(session));
        assert!(engine.session_snapshot(session).is_none());
        assert!(!engine.handle_player_action(session, PlayerAction::FlipCard(0)));
        assert!(!engine.handle_boss_action(BossHandle(99), BossAction::AttackBoss));
        assert!(!engine.reset_boss(BossHandle(99)));
    }

    #[test]
    fn test_solved_puzzle_is_reported_once() {
        let mut engine = quiet_engine();
        let handle = engine.start_puzzle_with_tiles((1..=9).collect());
        engine.advance(500);

        let reports = engine.drain_reports();
        assert_eq!(reports.len(), 1);
        let report = &reports[0];
        assert_eq!(report.outcome.score, 50);
        assert!(report.new_record);
        assert_eq!(report.xp_awarded, 25);
        assert_eq!(report.level, 2);

        engine.advance(10_000);
        assert!(engine.drain_reports().is_empty());

        let snapshot = engine.session_snapshot(handle).unwrap();
        assert_eq!(snapshot.phase, SessionPhase::Finished);
        assert!(snapshot.new_record);
        assert_eq!(engine.best_score(GameKind::Puzzle), 50);
        assert_eq!(engine.leaderboard()[0].timestamp, 1_700_000_000_000);
    }

    #[test]
    fn test_bad_puzzle_layout_awards_nothing() {
        let mut engine = quiet_engine();
        for tiles in [vec![], vec![1, 2, 3]] {
            let handle = engine.start_puzzle_with_tiles(tiles);
            engine.advance(500);
            assert_eq!(engine.session_snapshot(handle).unwrap().phase, SessionPhase::Active);
        }
        assert!(engine.drain_reports().is_empty());
        assert_eq!(engine.xp(), 0);
        assert!(engine.leaderboard().is_empty());
    }

    #[test]
    fn test_action_that_finishes_settles_immediately() {
        let mut engine = quiet_engine();
        let handle = engine.start_puzzle_with_tiles(vec![2, 1, 3, 4, 5, 6, 7, 8, 9]);
        engine.advance(500);
        engine.handle_player_action(handle, PlayerAction::SelectTile(0));
        engine.handle_player_action(handle, PlayerAction::SelectTile(1));

        let reports = engine.drain_reports();
        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0].outcome.score, 51);
        assert_eq!(engine.xp(), 25);
        assert_eq!(engine.hearts(), 5);
    }

    #[test]
    fn test_failed_run_costs_a_heart() {
        let mut engine = quiet_engine();
        let handle = engine.start_mini_game(GameKind::Reaction);
        engine.advance(500);
        engine.handle_player_action(handle, PlayerAction::EndGame);

        let report = engine.drain_reports().pop().unwrap();
        assert!(!report.outcome.success);
        assert_eq!(report.hearts, 4);
        assert_eq!(report.xp_awarded, 0);
        assert_eq!(engine.level_status(3), LevelStatus::Locked);
    }

    #[test]
    fn test_closing_unfinished_session_records_nothing() {
        let mut engine = quiet_engine();
        let handle = engine.start_mini_game(GameKind::HeartClick);
        engine.advance(5_000);
        assert!(engine.close_session(handle));
        engine.advance(60_000);
        assert!(engine.drain_reports().is_empty());
        assert!(engine.leaderboard().is_empty());
    }

    #[test]
    fn test_close_finished_keeps_live_games() {
        let mut engine = quiet_engine();
        let done = engine.start_puzzle_with_tiles((1..=9).collect());
        let live = engine.start_mini_game(GameKind::Memory);
        let boss = engine.start_boss_encounter();
        engine.advance(500);
        assert_eq!(engine.open_count(), 3);

        assert_eq!(engine.close_finished(), 1);
        assert!(engine.session_snapshot(done).is_none());
        assert!(engine.session_snapshot(live).is_some());
        assert!(engine.boss_snapshot(boss).is_some());
        assert_eq!(engine.drain_reports().len(), 1);

        while engine.boss_snapshot(boss).unwrap().state == BossState::Active {
            engine.advance(300);
            engine.handle_boss_action(boss, BossAction::AttackBoss);
        }
        assert_eq!(engine.close_finished(), 1);
        assert_eq!(engine.open_count(), 1);
    }

    #[test]
    fn test_session_sees_best_score() {
        let mut engine = quiet_engine();
        engine.progress_mut().save_score(GameKind::Memory, 70, 1);
        let handle = engine.start_mini_game(GameKind::Memory);
        assert_eq!(engine.session_snapshot(handle).unwrap().best_score, 70);
    }

    #[test]
    fn test_boss_lifecycle() {
        let mut engine = quiet_engine();
        let boss = engine.start_boss_encounter();
        while engine.boss_snapshot(boss).unwrap().state == BossState::Active {
            engine.advance(300);
            engine.handle_boss_action(boss, BossAction::AttackBoss);
        }
        let snapshot = engine.boss_snapshot(boss).unwrap();
        assert_eq!(snapshot.state, BossState::Defeated);
        assert!(snapshot.report.is_some());

        // No progression side effects.
        assert_eq!(engine.xp(), 0);
        assert!(engine.drain_reports().is_empty());

        assert!(engine.reset_boss(boss));
        assert_eq!(engine.boss_snapshot(boss).unwrap().boss_health, 100);
        assert!(engine.close_boss(boss));
        assert!(engine.boss_snapshot(boss).is_none());
    }

    #[test]
    fn test_save_slot_round_trip_between_engines() {
        let mut engine = quiet_engine();
        let handle = engine.start_puzzle_with_tiles((1..=9).collect());
        engine.advance(500);
        engine.close_session(handle);

        let mut slot = Vec::new();
        engine.save_progress(&mut slot).unwrap();

        let mut other = quiet_engine();
        other.load_progress(slot.as_slice()).unwrap();
        assert_eq!(other.xp(), 25);
        assert_eq!(other.best_score(GameKind::Puzzle), 50);
        assert_eq!(other.level_progress(), engine.level_progress());
    }

    #[test]
    fn test_same_seed_same_game() {
        let mut a = quiet_engine();
        let mut b = quiet_engine();
        let ha = a.start_mini_game(GameKind::WordMatch);
        let hb = b.start_mini_game(GameKind::WordMatch);
        assert_eq!(a.session_snapshot(ha), b.session_snapshot(hb));
    }
}
