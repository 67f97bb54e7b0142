//! Word match - pair up words that belong together.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use serde::Serialize;

use heartquest_logic::constants::{score, timing};

use super::{SessionEvent, SessionState};

/// The six word pairs on the board.
pub const WORD_PAIRS: [(&str, &str); 6] = [
    ("Love", "Heart"),
    ("Kiss", "Tenderness"),
    ("Hug", "Comfort"),
    ("Laughter", "Joy"),
    ("Gaze", "Connection"),
    ("Dream", "Future"),
];

/// One word token as shown to the player.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WordView {
    pub id: u32,
    pub word: &'static str,
    pub pair_id: u32,
    pub matched: bool,
    pub selected: bool,
}

pub struct WordMatchBoard {
    words: Vec<WordView>,
    /// Ids of the selected words, in click order.
    selected: Vec<u32>,
}

impl WordMatchBoard {
    pub fn new(rng: &mut StdRng) -> Self {
        let mut words: Vec<WordView> = WORD_PAIRS
            .iter()
            .enumerate()
            .flat_map(|(pair, (first, second))| {
                let pair_id = pair as u32;
                [(pair_id * 2, *first), (pair_id * 2 + 1, *second)].map(|(id, word)| WordView {
                    id,
                    word,
                    pair_id,
                    matched: false,
                    selected: false,
                })
            })
            .collect();
        words.shuffle(rng);
        Self {
            words,
            selected: Vec::with_capacity(2),
        }
    }

    pub fn words(&self) -> Vec<WordView> {
        self.words.clone()
    }

    fn word_mut(&mut self, id: u32) -> Option<&mut WordView> {
        self.words.iter_mut().find(|w| w.id == id)
    }

    pub(super) fn select(&mut self, state: &mut SessionState, id: u32) -> bool {
        if self.selected.len() >= 2 {
            return false;
        }
        let Some(word) = self.word_mut(id) else {
            return false;
        };
        if word.matched || word.selected {
            return false;
        }

        word.selected = true;
        self.selected.push(id);
        if self.selected.len() == 2 {
            state
                .timers
                .schedule_in(timing::MATCH_REVEAL_DELAY_MS, SessionEvent::RevealPair);
        }
        true
    }

    /// Settle the two selected words after the reveal delay.
    pub(super) fn reveal(&mut self, state: &mut SessionState) {
        let &[first, second] = self.selected.as_slice() else {
            return;
        };
        self.selected.clear();

        let pair_of = |id: u32| self.words.iter().find(|w| w.id == id).map(|w| w.pair_id);
        let is_match = matches!((pair_of(first), pair_of(second)), (Some(a), Some(b)) if a == b);

        for word in self.words.iter_mut().filter(|w| w.id == first || w.id == second) {
            word.selected = false;
            word.matched = is_match;
        }

        if !is_match {
            state.penalize(score::MISMATCH_PENALTY);
            return;
        }

        state.add_points(score::MATCH_POINTS);
        if self.words.iter().all(|w| w.matched) {
            state
                .timers
                .schedule_in(timing::WORD_MATCH_CELEBRATION_MS, SessionEvent::Celebrate);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::*;
    use super::super::{Board, MiniGameSession, PlayerAction, SessionPhase};
    use super::*;
    use heartquest_logic::games::GameKind;

    fn board(session: &MiniGameSession) -> &WordMatchBoard {
        match session.board() {
            Board::WordMatch(board) => board,
            _ => unreachable!(),
        }
    }

    fn select_pair(session: &mut MiniGameSession, first: u32, second: u32) {
        assert!(session.handle_action(PlayerAction::SelectWord(first)));
        assert!(session.handle_action(PlayerAction::SelectWord(second)));
        session.advance(800);
    }

    #[test]
    fn test_board_holds_twelve_words() {
        let session = open(GameKind::WordMatch);
        let words = board(&session).words();
        assert_eq!(words.len(), 12);
        for pair in 0..6 {
            assert_eq!(words.iter().filter(|w| w.pair_id == pair).count(), 2);
        }
    }

    #[test]
    fn test_match_scores_ten() {
        let mut session = open_active(GameKind::WordMatch);
        select_pair(&mut session, 0, 1);
        assert_eq!(session.score(), 10);
        let words = board(&session).words();
        assert!(words.iter().filter(|w| w.pair_id == 0).all(|w| w.matched && !w.selected));
        assert!(!session.handle_action(PlayerAction::SelectWord(0)));
    }

    #[test]
    fn test_selection_limits() {
        let mut session = open_active(GameKind::WordMatch);
        assert!(session.handle_action(PlayerAction::SelectWord(0)));
        assert!(!session.handle_action(PlayerAction::SelectWord(0)));
        assert!(session.handle_action(PlayerAction::SelectWord(2)));
        assert!(!session.handle_action(PlayerAction::SelectWord(4)));
        assert!(!session.handle_action(PlayerAction::SelectWord(99)));
    }

    #[test]
    fn test_mismatch_deselects_and_penalizes() {
        let mut session = open_active(GameKind::WordMatch);
        select_pair(&mut session, 0, 1);
        select_pair(&mut session, 2, 4);
        assert_eq!(session.score(), 5);
        let words = board(&session).words();
        assert!(words.iter().filter(|w| w.id == 2 || w.id == 4).all(|w| !w.selected && !w.matched));
    }

    #[test]
    fn test_all_pairs_finish_after_celebration() {
        let mut session = open_active(GameKind::WordMatch);
        for pair in 0..6 {
            select_pair(&mut session, pair * 2, pair * 2 + 1);
        }
        assert_eq!(session.phase(), SessionPhase::Active);

        session.advance(300);
        assert_eq!(session.phase(), SessionPhase::Finished);
        let outcome = session.outcome().unwrap();
        assert!(outcome.success);
        assert_eq!(outcome.score, 60);
    }
}
