//! Memory - flip cards two at a time to find every pair.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use serde::Serialize;

use heartquest_logic::constants::{score, timing};

use super::{SessionEvent, SessionState};

/// Card faces. Each appears on exactly two cards.
pub const SYMBOLS: [&str; 8] = ["💕", "💖", "💗", "💝", "💘", "💞", "💟", "💜"];

#[derive(Debug, Clone)]
struct Card {
    symbol: &'static str,
    face_up: bool,
    matched: bool,
}

/// What the player can see of a card. Face-down cards hide their symbol.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CardView {
    pub index: usize,
    pub symbol: Option<&'static str>,
    pub face_up: bool,
    pub matched: bool,
}

pub struct MemoryBoard {
    cards: Vec<Card>,
    /// Indices of the face-up, unmatched cards (at most two).
    flipped: Vec<usize>,
}

impl MemoryBoard {
    pub fn new(rng: &mut StdRng) -> Self {
        let mut symbols: Vec<&'static str> = SYMBOLS.iter().chain(SYMBOLS.iter()).copied().collect();
        symbols.shuffle(rng);
        Self::with_symbols(symbols)
    }

    fn with_symbols(symbols: Vec<&'static str>) -> Self {
        Self {
            cards: symbols
                .into_iter()
                .map(|symbol| Card {
                    symbol,
                    face_up: false,
                    matched: false,
                })
                .collect(),
            flipped: Vec::with_capacity(2),
        }
    }

    pub fn cards(&self) -> Vec<CardView> {
        self.cards
            .iter()
            .enumerate()
            .map(|(index, card)| CardView {
                index,
                symbol: (card.face_up || card.matched).then_some(card.symbol),
                face_up: card.face_up,
                matched: card.matched,
            })
            .collect()
    }

    pub fn matched_pairs(&self) -> usize {
        self.cards.iter().filter(|c| c.matched).count() / 2
    }

    pub(super) fn flip(&mut self, state: &mut SessionState, index: usize) -> bool {
        if self.flipped.len() == 2 {
            return false;
        }
        let Some(card) = self.cards.get_mut(index) else {
            return false;
        };
        if card.face_up || card.matched {
            return false;
        }

        card.face_up = true;
        self.flipped.push(index);
        if self.flipped.len() == 2 {
            state
                .timers
                .schedule_in(timing::MATCH_REVEAL_DELAY_MS, SessionEvent::RevealPair);
        }
        true
    }

    /// Settle the two face-up cards after the reveal delay.
    pub(super) fn reveal(&mut self, state: &mut SessionState) {
        let &[first, second] = self.flipped.as_slice() else {
            return;
        };
        self.flipped.clear();

        let is_match = self.cards[first].symbol == self.cards[second].symbol;
        for index in [first, second] {
            let card = &mut self.cards[index];
            card.face_up = false;
            card.matched = is_match;
        }

        if !is_match {
            state.penalize(score::MISMATCH_PENALTY);
            return;
        }

        state.add_points(score::MATCH_POINTS);
        if self.cards.iter().all(|c| c.matched) {
            let final_score = state.score();
            state.finish(final_score, final_score, true);
        }
    }
}
