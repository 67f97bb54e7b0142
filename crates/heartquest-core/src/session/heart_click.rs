//! Heart click - catch floating hearts before the countdown ends.
//!
//! Each second spawns one target; targets fade out if not caught within
//! two seconds. Targets are entities in a small `hecs` world so the expiry
//! sweep is a plain query.

use hecs::{Entity, World};
use serde::{Deserialize, Serialize};

use heartquest_logic::constants::timing;
use heartquest_logic::scoring::{self, PowerUpKind};

use super::{SessionEvent, SessionState};

/// A clickable heart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Target {
    pub id: u32,
    /// Session time the target appeared, in ms.
    pub spawned_at: u64,
}

/// Where a target sits on the play field, in percent.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f32,
    pub y: f32,
}

pub struct HeartClickBoard {
    world: World,
    time_left: u32,
    next_id: u32,
}

impl HeartClickBoard {
    pub fn new(duration_secs: u32) -> Self {
        Self {
            world: World::new(),
            time_left: duration_secs,
            next_id: 0,
        }
    }

    /// Seconds left on the countdown.
    pub fn time_left(&self) -> u32 {
        self.time_left
    }

    pub fn target_count(&self) -> usize {
        self.world.query::<&Target>().iter().count()
    }

    /// Live targets, oldest first.
    pub fn targets(&self) -> Vec<(Target, Position)> {
        let mut targets: Vec<_> = self
            .world
            .query::<(&Target, &Position)>()
            .iter()
            .map(|(_, (target, position))| (*target, *position))
            .collect();
        targets.sort_by_key(|(target, _)| target.id);
        targets
    }

    pub(super) fn add_time(&mut self, secs: u32) {
        self.time_left += secs;
    }

    pub(super) fn on_activate(&mut self, state: &mut SessionState) {
        state
            .timers
            .schedule_in(timing::SECOND_MS, SessionEvent::CountdownTick);
        state
            .timers
            .schedule_in(timing::HEART_SWEEP_INTERVAL_MS, SessionEvent::TargetSweep);
    }

    /// One second of countdown. Spawns a target while time remains and ends
    /// the game on the tick after it runs out. Returns a power-up if one
    /// was granted on this tick.
    pub(super) fn countdown_tick(&mut self, state: &mut SessionState) -> Option<PowerUpKind> {
        if self.time_left == 0 {
            self.finish(state);
            return None;
        }

        let roll_power_up = self.time_left % 5 == 0;
        self.time_left -= 1;
        self.spawn_target(state);

        let granted = if roll_power_up {
            state.roll_power_up()
        } else {
            None
        };

        state
            .timers
            .schedule_in(timing::SECOND_MS, SessionEvent::CountdownTick);
        granted
    }

    fn spawn_target(&mut self, state: &mut SessionState) {
        let (x, y) = state.random_position();
        let target = Target {
            id: self.next_id,
            spawned_at: state.now(),
        };
        self.next_id += 1;
        self.world.spawn((target, Position { x, y }));
    }

    /// Remove targets that have been up for too long.
    pub(super) fn sweep(&mut self, state: &mut SessionState) {
        let now = state.now();
        let expired: Vec<Entity> = self
            .world
            .query::<&Target>()
            .iter()
            .filter(|(_, target)| now - target.spawned_at >= timing::HEART_TARGET_LIFETIME_MS)
            .map(|(entity, _)| entity)
            .collect();

        for entity in expired {
            let _ = self.world.despawn(entity);
        }

        state
            .timers
            .schedule_in(timing::HEART_SWEEP_INTERVAL_MS, SessionEvent::TargetSweep);
    }

    pub(super) fn click(&mut self, state: &mut SessionState, id: u32) -> bool {
        let found = self
            .world
            .query::<&Target>()
            .iter()
            .find(|(_, target)| target.id == id)
            .map(|(entity, _)| entity);

        let Some(entity) = found else {
            return false;
        };
        let _ = self.world.despawn(entity);
        state.add_points(1);
        true
    }

    fn finish(&mut self, state: &mut SessionState) {
        let raw_score = state.score();
        let final_score = scoring::heart_click_final_score(raw_score, state.power_up_kind());
        self.world.clear();
        state.finish(final_score, raw_score, scoring::heart_click_success(raw_score));
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::*;
    use super::super::{Board, PlayerAction, SessionPhase};
    use heartquest_logic::games::GameKind;
    use heartquest_logic::scoring::PowerUpKind;

    fn board(session: &super::super::MiniGameSession) -> &super::HeartClickBoard {
        match session.board() {
            Board::HeartClick(board) => board,
            _ => unreachable!(),
        }
    }

    fn click_all(session: &mut super::super::MiniGameSession) -> u32 {
        let ids: Vec<u32> = board(session).targets().iter().map(|(t, _)| t.id).collect();
        let mut clicked = 0;
        for id in ids {
            if session.handle_action(PlayerAction::ClickTarget(id)) {
                clicked += 1;
            }
        }
        clicked
    }

    #[test]
    fn test_spawns_one_target_per_second() {
        let mut session = open_active(GameKind::HeartClick);
        assert_eq!(board(&session).target_count(), 0);

        session.advance(1_000);
        assert_eq!(board(&session).target_count(), 1);
        assert_eq!(board(&session).time_left(), 19);

        session.advance(1_000);
        assert_eq!(board(&session).target_count(), 2);
    }

    #[test]
    fn test_targets_expire_after_two_seconds() {
        let mut session = open_active(GameKind::HeartClick);
        session.advance(1_000); // target 0 at t=1500
        session.advance(2_000); // t=3500, sweep removes it
        let ids: Vec<u32> = board(&session).targets().iter().map(|(t, _)| t.id).collect();
        assert!(!ids.contains(&0));
        assert!(!session.handle_action(PlayerAction::ClickTarget(0)));
    }

    #[test]
    fn test_targets_spawn_inside_the_field() {
        let mut session = open_active(GameKind::HeartClick);
        session.advance(1_000);
        for (_, position) in board(&session).targets() {
            assert!((10.0..90.0).contains(&position.x));
            assert!((10.0..70.0).contains(&position.y));
        }
    }

    #[test]
    fn test_click_scores_once() {
        let mut session = open_active(GameKind::HeartClick);
        session.advance(1_000);
        assert!(session.handle_action(PlayerAction::ClickTarget(0)));
        assert!(!session.handle_action(PlayerAction::ClickTarget(0)));
        assert_eq!(session.score(), 1);
    }

    #[test]
    fn test_fifteen_catches_doubles_to_thirty() {
        let mut session = open_active(GameKind::HeartClick);
        let mut caught = 0;
        for _ in 0..20 {
            session.advance(1_000);
            if caught < 15 {
                caught += click_all(&mut session);
            }
        }
        assert_eq!(caught, 15);
        assert_eq!(session.phase(), SessionPhase::Active);
        assert_eq!(board(&session).time_left(), 0);

        session.advance(1_000);
        let outcome = session.outcome().expect("countdown should have ended");
        assert_eq!(outcome.raw_score, 15);
        assert_eq!(outcome.score, 30);
        assert!(outcome.success);
    }

    #[test]
    fn test_ten_catches_is_a_failure() {
        let mut session = open_active(GameKind::HeartClick);
        for _ in 0..10 {
            session.advance(1_000);
            click_all(&mut session);
        }
        session.advance(11_000);
        let outcome = session.outcome().unwrap();
        assert_eq!(outcome.raw_score, 10);
        assert_eq!(outcome.score, 20);
        assert!(!outcome.success);
    }

    #[test]
    fn test_double_points_at_the_end_quadruples() {
        let mut session = open_active(GameKind::HeartClick);
        for _ in 0..12 {
            session.advance(1_000);
            click_all(&mut session);
        }
        session.advance(7_000);
        assert!(session.grant_power_up(PowerUpKind::DoublePoints));
        session.advance(2_000);
        let outcome = session.outcome().unwrap();
        assert_eq!(outcome.raw_score, 12);
        assert_eq!(outcome.score, 48);
    }

    fn always_rolling(seed: u64, duration_secs: u32) -> super::super::MiniGameSession {
        let config = crate::config::EngineConfig {
            power_up_chance: 1.0,
            heart_click_duration_secs: duration_secs,
            ..quiet_config()
        };
        let rng = rand::SeedableRng::seed_from_u64(seed);
        let mut session = super::super::MiniGameSession::new(GameKind::HeartClick, &config, rng, 0);
        session.advance(config.loading_delay_ms);
        session
    }

    #[test]
    fn test_power_up_rolls_on_first_tick() {
        let mut session = always_rolling(1, 20);
        session.advance(999);
        assert_eq!(session.snapshot().power_up, None);

        // 20 seconds left before the tick: a multiple of five
        session.advance(1);
        assert!(session.snapshot().power_up.is_some());
        assert_eq!(session.snapshot().power_up_remaining_ms, 10_000);
    }

    #[test]
    fn test_no_roll_between_multiples_of_five() {
        let mut session = always_rolling(1, 23);
        session.advance(3_000);
        assert_eq!(board(&session).time_left(), 20);
        assert_eq!(session.snapshot().power_up, None);

        session.advance(1_000);
        assert!(session.snapshot().power_up.is_some());
    }

    #[test]
    fn test_rolled_extra_time_extends_countdown() {
        let session = (0..64)
            .map(|seed| {
                let mut session = always_rolling(seed, 20);
                session.advance(1_000);
                session
            })
            .find(|session| session.snapshot().power_up == Some(PowerUpKind::ExtraTime))
            .expect("some seed rolls extra time");
        assert_eq!(board(&session).time_left(), 19 + 15);
    }

    #[test]
    fn test_extra_time_extends_countdown() {
        let mut session = open_active(GameKind::HeartClick);
        session.advance(5_000);
        assert_eq!(board(&session).time_left(), 15);
        assert!(session.grant_power_up(PowerUpKind::ExtraTime));
        assert_eq!(board(&session).time_left(), 30);
        assert_eq!(session.snapshot().time_remaining_secs, Some(30));
    }
}
