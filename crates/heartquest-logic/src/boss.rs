//! Boss combat formulas.
//!
//! The encounter has three phases driven by the boss's remaining health.
//! Each phase makes the boss attack more often, makes its attacks travel
//! faster and hit harder.

use serde::{Deserialize, Serialize};

use crate::constants::boss;

/// Shape of an incoming boss attack.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AttackKind {
    Projectile,
    Wave,
}

/// Phase after the boss drops to `boss_health`. Phases never go back down.
pub fn phase_for_health(boss_health: u32, current_phase: u8) -> u8 {
    let target = if boss_health <= boss::PHASE_THREE_AT {
        3
    } else if boss_health <= boss::PHASE_TWO_AT {
        2
    } else {
        1
    };
    target.max(current_phase)
}

/// Time between attack rolls.
pub fn attack_interval_ms(phase: u8) -> u64 {
    boss::ATTACK_BASE_INTERVAL_MS.saturating_sub(boss::PHASE_SPEEDUP_MS * phase as u64)
}

/// How long an attack stays on the field before it lands.
pub fn attack_lifetime_ms(phase: u8) -> u64 {
    boss::ATTACK_BASE_LIFETIME_MS.saturating_sub(boss::PHASE_SPEEDUP_MS * phase as u64)
}

/// Damage the player takes from an attack that was not blocked.
pub fn incoming_damage(phase: u8) -> u32 {
    boss::BASE_INCOMING_DAMAGE + boss::INCOMING_DAMAGE_PER_PHASE * phase as u32
}

/// Combo after a click that came `gap_ms` after the previous one.
///
/// The first click of an encounter (no previous click) starts a new combo.
pub fn next_combo(combo: u32, gap_ms: Option<u64>) -> u32 {
    match gap_ms {
        Some(gap) if gap < boss::COMBO_WINDOW_MS => combo + 1,
        _ => 1,
    }
}

/// Damage dealt to the boss by a click at the given combo.
pub fn click_damage(combo: u32) -> u32 {
    let bonus = (combo as f32 * boss::COMBO_DAMAGE_PER_STEP).min(boss::COMBO_DAMAGE_CAP);
    (boss::CLICK_BASE_DAMAGE + bonus).floor() as u32
}

/// Headline shown above the arena for each phase.
pub fn phase_message(phase: u8) -> &'static str {
    match phase {
        1 => "Phase 1: sporadic attacks",
        2 => "Phase 2: intensifying!",
        3 => "Phase 3: last stand!",
        _ => "",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phase_thresholds() {
        assert_eq!(phase_for_health(100, 1), 1);
        assert_eq!(phase_for_health(51, 1), 1);
        assert_eq!(phase_for_health(50, 1), 2);
        assert_eq!(phase_for_health(26, 2), 2);
        assert_eq!(phase_for_health(25, 2), 3);
        assert_eq!(phase_for_health(0, 1), 3);
    }

    #[test]
    fn test_phase_never_decreases() {
        assert_eq!(phase_for_health(100, 3), 3);
        assert_eq!(phase_for_health(40, 3), 3);
    }

    #[test]
    fn test_phase_scaling() {
        assert_eq!(attack_interval_ms(1), 2_500);
        assert_eq!(attack_interval_ms(3), 1_500);
        assert_eq!(attack_lifetime_ms(1), 2_000);
        assert_eq!(attack_lifetime_ms(3), 1_000);
        assert_eq!(incoming_damage(1), 20);
        assert_eq!(incoming_damage(2), 25);
        assert_eq!(incoming_damage(3), 30);
    }

    #[test]
    fn test_next_combo() {
        assert_eq!(next_combo(0, None), 1);
        assert_eq!(next_combo(3, Some(499)), 4);
        assert_eq!(next_combo(3, Some(500)), 1);
        assert_eq!(next_combo(7, Some(2_000)), 1);
    }

    #[test]
    fn test_click_damage() {
        assert_eq!(click_damage(1), 4);
        assert_eq!(click_damage(2), 6);
        assert_eq!(click_damage(3), 7);
        assert_eq!(click_damage(4), 9);
        assert_eq!(click_damage(6), 11);
        assert_eq!(click_damage(40), 11);
    }
}
