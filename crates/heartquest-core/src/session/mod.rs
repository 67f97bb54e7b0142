//! Mini-game sessions.
//!
//! A session is one play of one mini-game. It moves `Loading → Active →
//! Finished` and is driven by two inputs only:
//!
//! - [`MiniGameSession::advance`] moves the session's own clock forward and
//!   fires due timers one at a time (countdown ticks, spawns, reveal delays,
//!   power-up expiry).
//! - [`MiniGameSession::handle_action`] applies a player click.
//!
//! Shared state (score, power-up, timers, RNG) lives in [`SessionState`];
//! everything specific to a game lives in its board module. Once Finished,
//! a session ignores further input and its timers are gone.

mod heart_click;
mod memory;
mod puzzle;
mod reaction;
mod word_match;

pub use heart_click::{HeartClickBoard, Position, Target};
pub use memory::{CardView, MemoryBoard, SYMBOLS};
pub use puzzle::PuzzleBoard;
pub use reaction::{ReactionBoard, ReactionTarget};
pub use word_match::{WordMatchBoard, WordView, WORD_PAIRS};

use rand::rngs::StdRng;
use rand::Rng;
use serde::{Deserialize, Serialize};

use heartquest_logic::constants::{field, timing};
use heartquest_logic::games::GameKind;
use heartquest_logic::scoring::{self, PowerUpKind};

use crate::config::EngineConfig;
use crate::context::MiniGameOutcome;
use crate::scheduler::Scheduler;

/// Lifecycle of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionPhase {
    Loading,
    Active,
    Finished,
}

/// Timer events a session can schedule for itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEvent {
    /// Loading screen is over.
    Activate,
    /// Periodic power-up roll for games without a countdown.
    PowerUpCheck,
    PowerUpExpired,
    /// One second of the heart-click countdown.
    CountdownTick,
    /// Remove heart-click targets that were not caught in time.
    TargetSweep,
    /// Compare the two face-up cards or selected words.
    RevealPair,
    /// Word match is complete; end after the celebration delay.
    Celebrate,
    /// Show the next reaction target.
    SpawnTarget,
    /// A reaction target ran out of time.
    TargetExpired(u32),
}

/// A click from the player. Which variants apply depends on the game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlayerAction {
    /// Heart click: catch the target with this id.
    ClickTarget(u32),
    /// Memory: flip the card at this index.
    FlipCard(usize),
    /// Reaction: hit the current target.
    ClickReaction,
    /// Reaction: stop playing and score the run.
    EndGame,
    /// Puzzle: select or swap the tile at this index.
    SelectTile(usize),
    /// Word match: select the word with this id.
    SelectWord(u32),
}

/// The power-up currently in effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivePowerUp {
    pub kind: PowerUpKind,
    pub expires_at: u64,
}

/// State shared by every game kind.
pub struct SessionState {
    kind: GameKind,
    phase: SessionPhase,
    score: u32,
    power_up: Option<ActivePowerUp>,
    timers: Scheduler<SessionEvent>,
    rng: StdRng,
    power_up_chance: f64,
    outcome: Option<MiniGameOutcome>,
}

impl SessionState {
    fn new(kind: GameKind, config: &EngineConfig, rng: StdRng) -> Self {
        Self {
            kind,
            phase: SessionPhase::Loading,
            score: 0,
            power_up: None,
            timers: Scheduler::new(),
            rng,
            power_up_chance: config.power_up_chance.clamp(0.0, 1.0),
            outcome: None,
        }
    }

    pub fn now(&self) -> u64 {
        self.timers.now()
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn is_active(&self) -> bool {
        self.phase == SessionPhase::Active
    }

    pub fn power_up_kind(&self) -> Option<PowerUpKind> {
        self.power_up.map(|p| p.kind)
    }

    /// Score a base amount, doubled under double points. Returns the gain.
    fn add_points(&mut self, base: u32) -> u32 {
        let gained = scoring::points(base, self.power_up_kind());
        self.score += gained;
        gained
    }

    fn penalize(&mut self, penalty: u32) {
        self.score = scoring::apply_penalty(self.score, penalty);
    }

    /// Roll for a power-up. Only one can be live at a time.
    fn roll_power_up(&mut self) -> Option<PowerUpKind> {
        if self.power_up.is_some() || !self.rng.gen_bool(self.power_up_chance) {
            return None;
        }
        let kind = PowerUpKind::ALL[self.rng.gen_range(0..PowerUpKind::ALL.len())];
        self.grant_power_up(kind);
        Some(kind)
    }

    fn grant_power_up(&mut self, kind: PowerUpKind) {
        let expires_at = self.now() + timing::POWER_UP_DURATION_MS;
        self.power_up = Some(ActivePowerUp { kind, expires_at });
        self.timers
            .schedule_at(expires_at, SessionEvent::PowerUpExpired);
        log::debug!("{} power-up {:?} until {}ms", self.kind, kind, expires_at);
    }

    fn expire_power_up(&mut self) {
        if self.power_up.is_some_and(|p| p.expires_at <= self.now()) {
            self.power_up = None;
        }
    }

    fn random_position(&mut self) -> (f32, f32) {
        (
            self.rng.gen_range(field::X_MIN..field::X_MAX),
            self.rng.gen_range(field::Y_MIN..field::Y_MAX),
        )
    }

    /// Enter the terminal state. Pending timers are dropped.
    fn finish(&mut self, score: u32, raw_score: u32, success: bool) {
        if self.phase == SessionPhase::Finished {
            return;
        }
        self.phase = SessionPhase::Finished;
        self.score = score;
        self.timers.clear();
        self.outcome = Some(MiniGameOutcome {
            kind: self.kind,
            score,
            raw_score,
            success,
        });
        log::info!(
            "{} finished: score {} ({})",
            self.kind,
            score,
            if success { "success" } else { "failure" }
        );
    }
}

/// Per-game state.
pub enum Board {
    HeartClick(HeartClickBoard),
    Memory(MemoryBoard),
    Reaction(ReactionBoard),
    Puzzle(PuzzleBoard),
    WordMatch(WordMatchBoard),
}

/// Read-only view of a board for rendering.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum BoardSnapshot {
    HeartClick { targets: Vec<(Target, Position)> },
    Memory { cards: Vec<CardView> },
    Reaction { target: Option<ReactionTarget> },
    Puzzle { tiles: Vec<u8>, selected: Option<usize> },
    WordMatch { words: Vec<WordView> },
}

/// Everything the UI needs to draw a session.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionSnapshot {
    pub kind: GameKind,
    pub phase: SessionPhase,
    pub score: u32,
    /// Best score for this kind when the session started.
    pub best_score: u32,
    /// Seconds left on the countdown, for timed games.
    pub time_remaining_secs: Option<u32>,
    pub power_up: Option<PowerUpKind>,
    pub power_up_remaining_ms: u64,
    pub board: BoardSnapshot,
    pub outcome: Option<MiniGameOutcome>,
    /// Whether the finished run set a new best score.
    pub new_record: bool,
}

/// One play of one mini-game.
pub struct MiniGameSession {
    state: SessionState,
    board: Board,
    best_score: u32,
    new_record: bool,
    reported: bool,
}

impl MiniGameSession {
    /// Open a session. It starts in Loading and becomes Active after the
    /// configured loading delay.
    pub fn new(kind: GameKind, config: &EngineConfig, mut rng: StdRng, best_score: u32) -> Self {
        let board = match kind {
            GameKind::HeartClick => Board::HeartClick(HeartClickBoard::new(config.heart_click_duration_secs)),
            GameKind::Memory => Board::Memory(MemoryBoard::new(&mut rng)),
            GameKind::Reaction => Board::Reaction(ReactionBoard::new()),
            GameKind::Puzzle => Board::Puzzle(PuzzleBoard::new(&mut rng)),
            GameKind::WordMatch => Board::WordMatch(WordMatchBoard::new(&mut rng)),
        };
        Self::with_board(kind, board, config, rng, best_score)
    }

    /// Open a puzzle session over a fixed tile layout. Anything other than
    /// an arrangement of tiles 1 to 9 is replaced by a shuffled board.
    pub fn puzzle_with_tiles(tiles: Vec<u8>, config: &EngineConfig, mut rng: StdRng, best_score: u32) -> Self {
        let board = if PuzzleBoard::is_valid_layout(&tiles) {
            PuzzleBoard::with_tiles(tiles)
        } else {
            log::warn!("Rejecting puzzle layout {:?}, dealing a shuffled board", tiles);
            PuzzleBoard::new(&mut rng)
        };
        let board = Board::Puzzle(board);
        Self::with_board(GameKind::Puzzle, board, config, rng, best_score)
    }

    fn with_board(kind: GameKind, board: Board, config: &EngineConfig, rng: StdRng, best_score: u32) -> Self {
        let mut state = SessionState::new(kind, config, rng);
        state
            .timers
            .schedule_in(config.loading_delay_ms, SessionEvent::Activate);
        Self {
            state,
            board,
            best_score,
            new_record: false,
            reported: false,
        }
    }

    pub fn kind(&self) -> GameKind {
        self.state.kind
    }

    pub fn phase(&self) -> SessionPhase {
        self.state.phase
    }

    pub fn score(&self) -> u32 {
        self.state.score
    }

    pub fn now(&self) -> u64 {
        self.state.now()
    }

    pub fn is_finished(&self) -> bool {
        self.state.phase == SessionPhase::Finished
    }

    pub fn outcome(&self) -> Option<MiniGameOutcome> {
        self.state.outcome
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    /// The outcome, the first time it is asked for after finishing.
    pub fn take_outcome(&mut self) -> Option<MiniGameOutcome> {
        if self.reported {
            return None;
        }
        let outcome = self.state.outcome?;
        self.reported = true;
        Some(outcome)
    }

    pub(crate) fn set_new_record(&mut self, new_record: bool) {
        self.new_record = new_record;
    }

    /// Move this session's clock forward, firing due timers in order.
    pub fn advance(&mut self, delta_ms: u64) {
        let until = self.state.now() + delta_ms;
        while let Some(event) = self.state.timers.pop_due(until) {
            self.on_timer(event);
        }
        self.state.timers.settle(until);
    }

    /// Apply a player click. Returns whether it changed anything.
    pub fn handle_action(&mut self, action: PlayerAction) -> bool {
        if !self.state.is_active() {
            return false;
        }

        let state = &mut self.state;
        match (&mut self.board, action) {
            (Board::HeartClick(board), PlayerAction::ClickTarget(id)) => board.click(state, id),
            (Board::Memory(board), PlayerAction::FlipCard(index)) => board.flip(state, index),
            (Board::Reaction(board), PlayerAction::ClickReaction) => board.click(state),
            (Board::Reaction(board), PlayerAction::EndGame) => board.end(state),
            (Board::Puzzle(board), PlayerAction::SelectTile(index)) => board.select(state, index),
            (Board::WordMatch(board), PlayerAction::SelectWord(id)) => board.select(state, id),
            (_, action) => {
                log::debug!("{} ignores {:?}", state.kind, action);
                false
            }
        }
    }

    /// Grant a power-up directly. Refused while another one is live or the
    /// session is not Active.
    pub fn grant_power_up(&mut self, kind: PowerUpKind) -> bool {
        if !self.state.is_active() || self.state.power_up.is_some() {
            return false;
        }
        self.state.grant_power_up(kind);
        self.on_power_up(kind);
        true
    }

    fn on_power_up(&mut self, kind: PowerUpKind) {
        if let (Board::HeartClick(board), PowerUpKind::ExtraTime) = (&mut self.board, kind) {
            board.add_time(timing::EXTRA_TIME_BONUS_SECS);
        }
    }

    fn on_timer(&mut self, event: SessionEvent) {
        if self.state.phase == SessionPhase::Finished {
            return;
        }

        let state = &mut self.state;
        match event {
            SessionEvent::Activate => {
                state.phase = SessionPhase::Active;
                log::debug!("{} active", state.kind);
                if !matches!(self.board, Board::HeartClick(_)) {
                    state
                        .timers
                        .schedule_in(timing::POWER_UP_CHECK_INTERVAL_MS, SessionEvent::PowerUpCheck);
                }
                match &mut self.board {
                    Board::HeartClick(board) => board.on_activate(state),
                    Board::Reaction(board) => board.on_activate(state),
                    Board::Puzzle(board) => board.on_activate(state),
                    Board::Memory(_) | Board::WordMatch(_) => {}
                }
            }
            SessionEvent::PowerUpCheck => {
                if let Some(kind) = state.roll_power_up() {
                    self.on_power_up(kind);
                }
                self.state
                    .timers
                    .schedule_in(timing::POWER_UP_CHECK_INTERVAL_MS, SessionEvent::PowerUpCheck);
            }
            SessionEvent::PowerUpExpired => state.expire_power_up(),
            SessionEvent::CountdownTick => {
                let granted = match &mut self.board {
                    Board::HeartClick(board) => board.countdown_tick(state),
                    _ => None,
                };
                if let Some(kind) = granted {
                    self.on_power_up(kind);
                }
            }
            SessionEvent::TargetSweep => {
                if let Board::HeartClick(board) = &mut self.board {
                    board.sweep(state);
                }
            }
            SessionEvent::RevealPair => match &mut self.board {
                Board::Memory(board) => board.reveal(state),
                Board::WordMatch(board) => board.reveal(state),
                _ => {}
            },
            SessionEvent::Celebrate => {
                let score = state.score;
                state.finish(score, score, true);
            }
            SessionEvent::SpawnTarget => {
                if let Board::Reaction(board) = &mut self.board {
                    board.spawn(state);
                }
            }
            SessionEvent::TargetExpired(id) => {
                if let Board::Reaction(board) = &mut self.board {
                    board.expire(state, id);
                }
            }
        }
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        let board = match &self.board {
            Board::HeartClick(board) => BoardSnapshot::HeartClick {
                targets: board.targets(),
            },
            Board::Memory(board) => BoardSnapshot::Memory {
                cards: board.cards(),
            },
            Board::Reaction(board) => BoardSnapshot::Reaction {
                target: board.target(),
            },
            Board::Puzzle(board) => BoardSnapshot::Puzzle {
                tiles: board.tiles().to_vec(),
                selected: board.selected(),
            },
            Board::WordMatch(board) => BoardSnapshot::WordMatch {
                words: board.words(),
            },
        };

        let time_remaining_secs = match &self.board {
            Board::HeartClick(board) => Some(board.time_left()),
            _ => None,
        };

        SessionSnapshot {
            kind: self.state.kind,
            phase: self.state.phase,
            score: self.state.score,
            best_score: self.best_score,
            time_remaining_secs,
            power_up: self.state.power_up_kind(),
            power_up_remaining_ms: self
                .state
                .power_up
                .map(|p| p.expires_at.saturating_sub(self.state.now()))
                .unwrap_or(0),
            board,
            outcome: self.state.outcome,
            new_record: self.new_record,
        }
    }
}
