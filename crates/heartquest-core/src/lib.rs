//! HeartQuest Core - progression and mini-game engine
//!
//! Keeps the player's persistent progress (hearts, XP, level completion,
//! best scores) and simulates the five mini-games and the boss fight on
//! logical clocks, so the whole game can run headless.
//!
//! # Architecture
//!
//! - **Store**: a key-value backend holding the four persisted records
//! - **Context**: the progression rules applied over the store
//! - **Sessions**: one mini-game play each, driven by clicks and `advance`
//! - **Boss**: the level 4 encounter, with no effect on progress
//! - **Engine**: the facade that ties them together for a UI
//!
//! # Example
//!
//! ```rust,no_run
//! use heartquest_core::prelude::*;
//!
//! let mut engine = GameEngine::new(EngineConfig::default());
//! let game = engine.start_mini_game(GameKind::Reaction);
//!
//! // Drive it from the UI loop
//! loop {
//!     engine.advance(16);
//!     engine.handle_player_action(game, PlayerAction::ClickReaction);
//!     for report in engine.drain_reports() {
//!         println!("{} XP, {} hearts", report.xp, report.hearts);
//!     }
//! }
//! ```

pub mod boss;
pub mod config;
pub mod context;
pub mod engine;
pub mod persistence;
pub mod scheduler;
pub mod session;
pub mod store;

/// Commonly used types for convenient importing
pub mod prelude {
    pub use crate::boss::{BossAction, BossSnapshot, BossState};
    pub use crate::config::EngineConfig;
    pub use crate::context::{MiniGameOutcome, ProgressContext, ProgressReport};
    pub use crate::engine::{BossHandle, GameEngine, SessionHandle};
    pub use crate::session::{PlayerAction, SessionPhase, SessionSnapshot};
    pub use crate::store::{FileStore, KeyValueStore, MemoryStore};
    pub use heartquest_logic::games::GameKind;
    pub use heartquest_logic::progression::LevelStatus;
}
