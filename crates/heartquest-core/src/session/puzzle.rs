//! Puzzle - swap tiles until they read 1 to 9.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;

use heartquest_logic::constants::score;
use heartquest_logic::scoring;

use super::SessionState;

pub const TILE_COUNT: u8 = 9;

pub struct PuzzleBoard {
    tiles: Vec<u8>,
    selected: Option<usize>,
    swaps: u32,
}

impl PuzzleBoard {
    pub fn new(rng: &mut StdRng) -> Self {
        let mut tiles: Vec<u8> = (1..=TILE_COUNT).collect();
        tiles.shuffle(rng);
        Self::with_tiles(tiles)
    }

    /// Whether `tiles` holds each of 1 to 9 exactly once.
    pub fn is_valid_layout(tiles: &[u8]) -> bool {
        let mut sorted = tiles.to_vec();
        sorted.sort_unstable();
        sorted.iter().copied().eq(1..=TILE_COUNT)
    }

    pub(super) fn with_tiles(tiles: Vec<u8>) -> Self {
        Self {
            tiles,
            selected: None,
            swaps: 0,
        }
    }

    pub fn tiles(&self) -> &[u8] {
        &self.tiles
    }

    pub fn selected(&self) -> Option<usize> {
        self.selected
    }

    pub fn swaps(&self) -> u32 {
        self.swaps
    }

    /// A board dealt already in order counts as solved straight away.
    pub(super) fn on_activate(&mut self, state: &mut SessionState) {
        if scoring::is_solved(&self.tiles) {
            self.solve(state);
        }
    }

    pub(super) fn select(&mut self, state: &mut SessionState, index: usize) -> bool {
        if index >= self.tiles.len() {
            return false;
        }

        match self.selected {
            None => self.selected = Some(index),
            Some(current) if current == index => self.selected = None,
            Some(current) => {
                self.tiles.swap(current, index);
                self.selected = None;
                self.swaps += 1;
                state.add_points(1);
                if scoring::is_solved(&self.tiles) {
                    self.solve(state);
                }
            }
        }
        true
    }

    fn solve(&mut self, state: &mut SessionState) {
        let final_score = state.score + score::PUZZLE_SOLVED_BONUS;
        state.finish(final_score, final_score, true);
    }
}
