//! Game constants - caps, timings and score values.
//!
//! Durations are in milliseconds of session time. One on-screen "second"
//! is 1000 ms of logical clock.

pub mod limits {
    pub const MAX_HEARTS: u32 = 5;
    pub const INITIAL_HEARTS: u32 = 5;
    pub const MAX_XP: u32 = 100;
    pub const INITIAL_XP: u32 = 0;
    /// Levels with a progress record. Level 5 is the permanently locked epilogue.
    pub const GATED_LEVELS: u8 = 4;
    pub const BOSS_LEVEL: u8 = 4;
    pub const FUTURE_LEVEL: u8 = 5;
}

pub mod xp {
    /// Any successful run earns at least this much.
    pub const MIN_SUCCESS_XP: u32 = 5;
    pub const HEART_CLICK_CAP: u32 = 25;
    pub const HEART_CLICK_DIVISOR: u32 = 4;
    pub const MEMORY_FIXED: u32 = 20;
    pub const PUZZLE_FIXED: u32 = 25;
    pub const REACTION_CAP: u32 = 20;
    pub const REACTION_DIVISOR: u32 = 5;
    pub const WORD_MATCH_FIXED: u32 = 10;
}

pub mod timing {
    pub const LOADING_DELAY_MS: u64 = 500;
    pub const SECOND_MS: u64 = 1000;

    pub const POWER_UP_DURATION_MS: u64 = 10_000;
    pub const POWER_UP_CHECK_INTERVAL_MS: u64 = 5_000;
    pub const POWER_UP_CHANCE: f64 = 0.3;
    pub const EXTRA_TIME_BONUS_SECS: u32 = 15;

    pub const HEART_CLICK_DURATION_SECS: u32 = 20;
    pub const HEART_TARGET_LIFETIME_MS: u64 = 2_000;
    pub const HEART_SWEEP_INTERVAL_MS: u64 = 500;

    pub const MATCH_REVEAL_DELAY_MS: u64 = 800;
    pub const WORD_MATCH_CELEBRATION_MS: u64 = 300;

    pub const REACTION_MIN_DELAY_MS: u64 = 500;
    pub const REACTION_MAX_DELAY_MS: u64 = 2_000;
    pub const REACTION_TARGET_LIFETIME_MS: u64 = 1_500;
    pub const REACTION_NEXT_TARGET_MS: u64 = 500;
}

pub mod score {
    pub const MISMATCH_PENALTY: u32 = 5;
    pub const MATCH_POINTS: u32 = 10;
    pub const REACTION_MISS_PENALTY: u32 = 10;
    pub const PUZZLE_SOLVED_BONUS: u32 = 50;
    pub const HEART_CLICK_SUCCESS_ABOVE: u32 = 10;
    pub const REACTION_SUCCESS_ABOVE: u32 = 20;
}

pub mod boss {
    pub const MAX_HEALTH: u32 = 100;
    pub const PHASE_TWO_AT: u32 = 50;
    pub const PHASE_THREE_AT: u32 = 25;

    pub const ATTACK_CHANCE: f64 = 0.4;
    pub const ATTACK_BASE_INTERVAL_MS: u64 = 3_000;
    pub const ATTACK_BASE_LIFETIME_MS: u64 = 2_500;
    pub const PHASE_SPEEDUP_MS: u64 = 500;
    pub const ATTACK_WARNING_MS: u64 = 1_000;
    pub const ATTACK_MOVE_INTERVAL_MS: u64 = 50;
    pub const ATTACK_MOVE_STEP: f32 = 2.0;
    /// Attacks below this line have left the play area.
    pub const PLAY_AREA_BOTTOM: f32 = 100.0;

    pub const BASE_INCOMING_DAMAGE: u32 = 15;
    pub const INCOMING_DAMAGE_PER_PHASE: u32 = 5;

    pub const CLICK_BASE_DAMAGE: f32 = 3.0;
    pub const COMBO_DAMAGE_PER_STEP: f32 = 1.5;
    pub const COMBO_DAMAGE_CAP: f32 = 8.0;
    pub const COMBO_WINDOW_MS: u64 = 500;
    pub const ATTACK_COOLDOWN_MS: u64 = 200;
    pub const HIT_FLASH_MS: u64 = 500;
}

/// Spawn area for floating targets, in percent of the play field.
pub mod field {
    pub const X_MIN: f32 = 10.0;
    pub const X_MAX: f32 = 90.0;
    pub const Y_MIN: f32 = 10.0;
    pub const Y_MAX: f32 = 70.0;
}
