//! Pure progression and scoring logic for HeartQuest.
//!
//! This crate holds every rule of the game that does not need storage or a
//! clock. Functions take plain data and return results, so the stateful
//! engine in `heartquest-core`, the headless harness and the unit tests all
//! agree on the same numbers.
//!
//! # Module Overview
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`boss`] | Boss phases, attack cadence, combo damage |
//! | [`constants`] | Caps, timings and score values shared by all games |
//! | [`games`] | The five mini-game kinds and their storage ids |
//! | [`leaderboard`] | Best-score-per-kind merge rules |
//! | [`progression`] | XP normalization, heart policy, level gating |
//! | [`scoring`] | Per-game scoring formulas and success thresholds |

pub mod boss;
pub mod constants;
pub mod games;
pub mod leaderboard;
pub mod progression;
pub mod scoring;
