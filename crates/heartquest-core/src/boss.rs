//! Boss encounter - the level 4 fight.
//!
//! The boss rolls for an attack on a phase-dependent interval. A roll that
//! hits shows a one second warning, then launches an attack that drifts down
//! the arena and lands when it leaves the play area or its lifetime runs
//! out. The player either blocks it or hammers the boss and takes the hit.
//!
//! Like a mini-game session, the encounter owns its clock and is driven
//! only by [`BossEncounter::advance`] and [`BossEncounter::handle_action`].
//! It has no effect on persisted progress.

use rand::rngs::StdRng;
use rand::Rng;
use serde::{Deserialize, Serialize};

use heartquest_logic::boss::{self as rules, AttackKind};
use heartquest_logic::constants::{boss, field};

use crate::scheduler::Scheduler;

/// Lifecycle of an encounter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BossState {
    Active,
    Defeated,
    PlayerDefeated,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BossAction {
    AttackBoss,
    BlockIncoming,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BossEvent {
    AttackCheck,
    LaunchAttack,
    MoveAttack(u32),
    AttackLands(u32),
    CooldownEnd,
    HitFlashEnd,
}

/// An attack on its way to the player.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct IncomingAttack {
    pub id: u32,
    pub kind: AttackKind,
    pub x: f32,
    pub y: f32,
    pub spawned_at: u64,
}

/// Summary of a won fight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BossReport {
    pub clicks: u32,
    pub max_combo: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BossSnapshot {
    pub state: BossState,
    pub boss_health: u32,
    pub player_health: u32,
    pub phase: u8,
    pub phase_message: &'static str,
    pub combo: u32,
    pub max_combo: u32,
    pub clicks: u32,
    pub warning: bool,
    pub cooldown: bool,
    pub hit_flash: bool,
    pub attack: Option<IncomingAttack>,
    pub report: Option<BossReport>,
}

pub struct BossEncounter {
    state: BossState,
    boss_health: u32,
    player_health: u32,
    phase: u8,
    combo: u32,
    max_combo: u32,
    clicks: u32,
    last_click_at: Option<u64>,
    warning: bool,
    cooldown: bool,
    hit_flash: bool,
    attack: Option<IncomingAttack>,
    next_attack_id: u32,
    attack_chance: f64,
    timers: Scheduler<BossEvent>,
    rng: StdRng,
}

impl BossEncounter {
    pub fn new(rng: StdRng, attack_chance: f64) -> Self {
        let mut encounter = Self {
            state: BossState::Active,
            boss_health: boss::MAX_HEALTH,
            player_health: boss::MAX_HEALTH,
            phase: 1,
            combo: 0,
            max_combo: 0,
            clicks: 0,
            last_click_at: None,
            warning: false,
            cooldown: false,
            hit_flash: false,
            attack: None,
            next_attack_id: 0,
            attack_chance: attack_chance.clamp(0.0, 1.0),
            timers: Scheduler::new(),
            rng,
        };
        encounter.schedule_attack_check();
        encounter
    }

    /// Start over with full health. The RNG carries on where it was.
    pub fn reset(&mut self) {
        let rng = self.rng.clone();
        *self = Self::new(rng, self.attack_chance);
        log::debug!("boss encounter reset");
    }

    pub fn state(&self) -> BossState {
        self.state
    }

    pub fn boss_health(&self) -> u32 {
        self.boss_health
    }

    pub fn player_health(&self) -> u32 {
        self.player_health
    }

    pub fn phase(&self) -> u8 {
        self.phase
    }

    pub fn combo(&self) -> u32 {
        self.combo
    }

    pub fn now(&self) -> u64 {
        self.timers.now()
    }

    pub fn is_over(&self) -> bool {
        self.state != BossState::Active
    }

    /// Clicks and best combo, once the boss is down.
    pub fn report(&self) -> Option<BossReport> {
        (self.state == BossState::Defeated).then_some(BossReport {
            clicks: self.clicks,
            max_combo: self.max_combo,
        })
    }

    pub fn advance(&mut self, delta_ms: u64) {
        let until = self.timers.now() + delta_ms;
        while let Some(event) = self.timers.pop_due(until) {
            self.on_timer(event);
        }
        self.timers.settle(until);
    }

    pub fn handle_action(&mut self, action: BossAction) -> bool {
        if self.is_over() {
            return false;
        }
        match action {
            BossAction::AttackBoss => self.attack_boss(),
            BossAction::BlockIncoming => self.block_incoming(),
        }
    }

    fn attack_boss(&mut self) -> bool {
        if self.cooldown {
            return false;
        }

        let now = self.now();
        let gap = self.last_click_at.map(|at| now - at);
        self.last_click_at = Some(now);
        self.bump_combo(rules::next_combo(self.combo, gap));
        self.clicks += 1;

        let damage = rules::click_damage(self.combo);
        self.boss_health = self.boss_health.saturating_sub(damage);
        log::trace!("boss hit for {} at combo {}", damage, self.combo);

        self.cooldown = true;
        self.timers
            .schedule_in(boss::ATTACK_COOLDOWN_MS, BossEvent::CooldownEnd);

        if self.boss_health == 0 {
            self.end(BossState::Defeated);
            return true;
        }

        let phase = rules::phase_for_health(self.boss_health, self.phase);
        if phase != self.phase {
            self.phase = phase;
            log::info!("{}", rules::phase_message(phase));
            self.timers.cancel(|event| *event == BossEvent::AttackCheck);
            self.schedule_attack_check();
        }
        true
    }

    fn block_incoming(&mut self) -> bool {
        let Some(attack) = self.attack.take() else {
            return false;
        };
        self.cancel_attack_timers(attack.id);
        self.bump_combo(self.combo + 1);
        true
    }

    fn bump_combo(&mut self, combo: u32) {
        self.combo = combo;
        self.max_combo = self.max_combo.max(combo);
    }

    fn schedule_attack_check(&mut self) {
        self.timers
            .schedule_in(rules::attack_interval_ms(self.phase), BossEvent::AttackCheck);
    }

    fn cancel_attack_timers(&mut self, id: u32) {
        self.timers.cancel(|event| {
            matches!(event, BossEvent::MoveAttack(i) | BossEvent::AttackLands(i) if *i == id)
        });
    }

    fn on_timer(&mut self, event: BossEvent) {
        if self.is_over() {
            return;
        }
        match event {
            BossEvent::AttackCheck => {
                if !self.warning && self.attack.is_none() && self.rng.gen_bool(self.attack_chance) {
                    self.warning = true;
                    self.timers
                        .schedule_in(boss::ATTACK_WARNING_MS, BossEvent::LaunchAttack);
                }
                self.schedule_attack_check();
            }
            BossEvent::LaunchAttack => self.launch_attack(),
            BossEvent::MoveAttack(id) => {
                let Some(attack) = self.attack.as_mut().filter(|a| a.id == id) else {
                    return;
                };
                attack.y += boss::ATTACK_MOVE_STEP;
                if attack.y > boss::PLAY_AREA_BOTTOM {
                    self.land_attack(id);
                } else {
                    self.timers
                        .schedule_in(boss::ATTACK_MOVE_INTERVAL_MS, BossEvent::MoveAttack(id));
                }
            }
            BossEvent::AttackLands(id) => self.land_attack(id),
            BossEvent::CooldownEnd => self.cooldown = false,
            BossEvent::HitFlashEnd => self.hit_flash = false,
        }
    }

    fn launch_attack(&mut self) {
        self.warning = false;
        let kind = if self.rng.gen_bool(0.5) {
            AttackKind::Projectile
        } else {
            AttackKind::Wave
        };
        let attack = IncomingAttack {
            id: self.next_attack_id,
            kind,
            x: self.rng.gen_range(field::X_MIN..field::X_MAX),
            y: self.rng.gen_range(field::Y_MIN..field::Y_MAX),
            spawned_at: self.now(),
        };
        self.next_attack_id += 1;
        self.attack = Some(attack);

        self.timers
            .schedule_in(boss::ATTACK_MOVE_INTERVAL_MS, BossEvent::MoveAttack(attack.id));
        self.timers
            .schedule_in(rules::attack_lifetime_ms(self.phase), BossEvent::AttackLands(attack.id));
        log::debug!("boss launches {:?} {}", kind, attack.id);
    }

    fn land_attack(&mut self, id: u32) {
        if self.attack.map(|a| a.id) != Some(id) {
            return;
        }
        self.attack = None;
        self.cancel_attack_timers(id);

        self.player_health = self
            .player_health
            .saturating_sub(rules::incoming_damage(self.phase));
        self.hit_flash = true;
        self.timers.cancel(|event| *event == BossEvent::HitFlashEnd);
        self.timers
            .schedule_in(boss::HIT_FLASH_MS, BossEvent::HitFlashEnd);

        if self.player_health == 0 {
            self.end(BossState::PlayerDefeated);
        }
    }

    fn end(&mut self, state: BossState) {
        self.state = state;
        self.attack = None;
        self.warning = false;
        self.timers.clear();
        log::info!(
            "boss encounter over: {:?} after {} clicks (max combo {})",
            state,
            self.clicks,
            self.max_combo
        );
    }

    pub fn snapshot(&self) -> BossSnapshot {
        BossSnapshot {
            state: self.state,
            boss_health: self.boss_health,
            player_health: self.player_health,
            phase: self.phase,
            phase_message: rules::phase_message(self.phase),
            combo: self.combo,
            max_combo: self.max_combo,
            clicks: self.clicks,
            warning: self.warning,
            cooldown: self.cooldown,
            hit_flash: self.hit_flash,
            attack: self.attack,
            report: self.report(),
        }
    }
}
