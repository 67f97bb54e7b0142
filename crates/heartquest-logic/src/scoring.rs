//! Per-game scoring formulas and success thresholds.
//!
//! Every formula here is pure; the session simulators in `heartquest-core`
//! decide *when* they apply.

use serde::{Deserialize, Serialize};

use crate::constants::score;

/// Temporary bonus granted during a mini-game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PowerUpKind {
    /// Every scoring event counts twice until expiry.
    DoublePoints,
    /// One-off addition to the countdown.
    ExtraTime,
}

impl PowerUpKind {
    pub const ALL: [PowerUpKind; 2] = [PowerUpKind::DoublePoints, PowerUpKind::ExtraTime];
}

/// Score multiplier for the live power-up.
pub fn multiplier(power_up: Option<PowerUpKind>) -> u32 {
    match power_up {
        Some(PowerUpKind::DoublePoints) => 2,
        _ => 1,
    }
}

/// Points for one scoring event.
pub fn points(base: u32, power_up: Option<PowerUpKind>) -> u32 {
    base * multiplier(power_up)
}

/// Deduct a penalty, never going below zero.
pub fn apply_penalty(current: u32, penalty: u32) -> u32 {
    current.saturating_sub(penalty)
}

/// Final heart-click score once the countdown runs out.
pub fn heart_click_final_score(raw_score: u32, power_up: Option<PowerUpKind>) -> u32 {
    match power_up {
        Some(PowerUpKind::DoublePoints) => raw_score * 4,
        _ => raw_score * 2,
    }
}

pub fn heart_click_success(raw_score: u32) -> bool {
    raw_score > score::HEART_CLICK_SUCCESS_ABOVE
}

/// Points for clicking a reaction target `reaction_ms` after it appeared.
pub fn reaction_points(reaction_ms: u64, power_up: Option<PowerUpKind>) -> u32 {
    let base = (1000 / reaction_ms.max(1)).max(1);
    points(base as u32, power_up)
}

pub fn reaction_success(final_score: u32) -> bool {
    final_score > score::REACTION_SUCCESS_ABOVE
}

/// Whether a tile board reads 1, 2, 3, ... in order.
pub fn is_solved(tiles: &[u8]) -> bool {
    tiles
        .iter()
        .enumerate()
        .all(|(index, tile)| *tile as usize == index + 1)
}
