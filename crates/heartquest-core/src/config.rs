//! Engine configuration.

use serde::{Deserialize, Serialize};

use heartquest_logic::constants::{boss, timing};

/// Tunables for a `GameEngine`. Rule values that never change between
/// builds live in `heartquest_logic::constants` instead.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Seed for every random roll. `None` seeds from entropy.
    pub seed: Option<u64>,
    /// How long a mini-game shows its loading screen before it accepts input.
    pub loading_delay_ms: u64,
    /// Chance for each power-up roll to grant one.
    pub power_up_chance: f64,
    /// Countdown of the heart-click game, in seconds.
    pub heart_click_duration_secs: u32,
    /// Chance for each boss attack roll to launch an attack.
    pub boss_attack_chance: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            seed: None,
            loading_delay_ms: timing::LOADING_DELAY_MS,
            power_up_chance: timing::POWER_UP_CHANCE,
            heart_click_duration_secs: timing::HEART_CLICK_DURATION_SECS,
            boss_attack_chance: boss::ATTACK_CHANCE,
        }
    }
}

impl EngineConfig {
    /// Parse a config from JSON. Missing fields keep their defaults.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Deterministic config for tests and replays.
    pub fn seeded(seed: u64) -> Self {
        Self {
            seed: Some(seed),
            ..Default::default()
        }
    }
}
