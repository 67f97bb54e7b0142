//! Reaction - hit the target as soon as it shows up.

use rand::Rng;
use serde::Serialize;

use heartquest_logic::constants::{score, timing};
use heartquest_logic::scoring;

use super::{SessionEvent, SessionState};

/// The target currently on screen.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ReactionTarget {
    pub id: u32,
    pub x: f32,
    pub y: f32,
    pub spawned_at: u64,
}

#[derive(Default)]
pub struct ReactionBoard {
    target: Option<ReactionTarget>,
    next_id: u32,
    hits: u32,
    misses: u32,
}

impl ReactionBoard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn target(&self) -> Option<ReactionTarget> {
        self.target
    }

    pub fn hits(&self) -> u32 {
        self.hits
    }

    pub fn misses(&self) -> u32 {
        self.misses
    }

    pub(super) fn on_activate(&mut self, state: &mut SessionState) {
        Self::schedule_random_spawn(state);
    }

    fn schedule_random_spawn(state: &mut SessionState) {
        let delay = state
            .rng
            .gen_range(timing::REACTION_MIN_DELAY_MS..=timing::REACTION_MAX_DELAY_MS);
        state.timers.schedule_in(delay, SessionEvent::SpawnTarget);
    }

    pub(super) fn spawn(&mut self, state: &mut SessionState) {
        if self.target.is_some() {
            return;
        }
        let (x, y) = state.random_position();
        let target = ReactionTarget {
            id: self.next_id,
            x,
            y,
            spawned_at: state.now(),
        };
        self.next_id += 1;
        self.target = Some(target);
        state.timers.schedule_in(
            timing::REACTION_TARGET_LIFETIME_MS,
            SessionEvent::TargetExpired(target.id),
        );
    }

    /// The target with `id` timed out. Stale ids are ignored.
    pub(super) fn expire(&mut self, state: &mut SessionState, id: u32) {
        if self.target.map(|t| t.id) != Some(id) {
            return;
        }
        self.target = None;
        self.misses += 1;
        state.penalize(score::REACTION_MISS_PENALTY);
        Self::schedule_random_spawn(state);
    }

    pub(super) fn click(&mut self, state: &mut SessionState) -> bool {
        let Some(target) = self.target.take() else {
            return false;
        };

        let reaction_ms = state.now() - target.spawned_at;
        state.score += scoring::reaction_points(reaction_ms, state.power_up_kind());
        self.hits += 1;
        log::trace!("reaction hit in {}ms", reaction_ms);

        state
            .timers
            .cancel(|event| *event == SessionEvent::TargetExpired(target.id));
        state
            .timers
            .schedule_in(timing::REACTION_NEXT_TARGET_MS, SessionEvent::SpawnTarget);
        true
    }

    /// The player stops; the run is scored as it stands.
    pub(super) fn end(&mut self, state: &mut SessionState) -> bool {
        self.target = None;
        let final_score = state.score;
        state.finish(final_score, final_score, scoring::reaction_success(final_score));
        true
    }
}
