//! Room invariants: bug detectors, not gameplay rules.
//!
//! The rules engine validates before it mutates, so none of these should
//! ever fire. The room actor checks them after every committed change and
//! panics on a violation.

use std::collections::{HashMap, HashSet};
use std::fmt;

use neologisms_protocol::{BOARD_SIZE, Phase, Square};

use crate::Room;

/// Total number of squares on a board.
pub const SQUARE_COUNT: usize = (BOARD_SIZE as usize) * (BOARD_SIZE as usize);

/// A broken invariant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvariantViolation {
    pub message: String,
}

impl fmt::Display for InvariantViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invariant violation: {}", self.message)
    }
}

impl std::error::Error for InvariantViolation {}

impl Room {
    /// Checks every room invariant.
    ///
    /// Returns the violations found, or an empty list if all hold.
    #[must_use]
    pub fn check_invariants(&self) -> Vec<InvariantViolation> {
        let mut violations = Vec::new();
        let mut fail = |message: String| violations.push(InvariantViolation { message });

        // deck, outstanding and correct partition the 25 squares.
        let mut seen: HashMap<Square, usize> = HashMap::with_capacity(SQUARE_COUNT);
        let placed = self
            .deck
            .squares()
            .iter()
            .chain(self.outstanding.iter().map(|(_, sq)| sq))
            .chain(self.correct.iter());
        for square in placed {
            if Square::new(square.x, square.y).is_none() {
                fail(format!("square {square} is off the board"));
            }
            *seen.entry(*square).or_default() += 1;
        }
        for square in Square::all() {
            match seen.get(&square).copied().unwrap_or(0) {
                1 => {}
                0 => fail(format!("square {square} is missing")),
                n => fail(format!("square {square} appears {n} times")),
            }
        }

        let mut holders = HashSet::with_capacity(self.outstanding.len());
        for (holder, _) in &self.outstanding {
            if !holders.insert(holder) {
                fail(format!("{holder} holds more than one card"));
            }
        }

        if let Some(clue) = &self.clue {
            if self.holding(&clue.giver) != Some(clue.square) {
                fail(format!("clue by {} does not match their card", clue.giver));
            }
        }

        let labels = usize::from(BOARD_SIZE);
        let words: HashSet<_> = self.board.horizontal.iter().chain(&self.board.vertical).collect();
        if self.board.horizontal.len() != labels
            || self.board.vertical.len() != labels
            || words.len() != labels * 2
        {
            fail("board does not have ten distinct label words".to_owned());
        }

        match self.phase {
            Phase::Created => {
                if !self.outstanding.is_empty() || !self.correct.is_empty() {
                    fail("created room has cards in play".to_owned());
                }
                if self.remaining.is_some() {
                    fail("created room has a running clock".to_owned());
                }
            }
            Phase::Active => {}
            Phase::Finished => {
                if self.final_score != u32::try_from(self.correct.len()).ok() {
                    fail(format!(
                        "final score {:?} does not match {} solved squares",
                        self.final_score,
                        self.correct.len()
                    ));
                }
            }
        }
        if self.phase != Phase::Finished && self.final_score.is_some() {
            fail("unfinished room has a final score".to_owned());
        }
        if self.remaining.is_some_and(|secs| secs > self.settings.timer_secs) {
            fail("remaining time exceeds the configured timer".to_owned());
        }

        violations
    }
}

#[cfg(test)]
mod tests {
    use neologisms_protocol::{RoomId, Username};

    use super::*;
    use crate::grid;
    use crate::{RoomSettings, state::Clue};

    fn room() -> Room {
        let (board, deck) = grid::generate_seeded(1);
        Room::new(RoomId::new("R1"), RoomSettings::new(10), board, deck)
    }

    #[test]
    fn test_fresh_room_is_clean() {
        assert!(room().check_invariants().is_empty());
    }

    #[test]
    fn test_duplicate_square_is_reported() {
        let mut room = room();
        let square = room.deck.peek().unwrap();
        room.phase = Phase::Active;
        room.correct.push(square);
        let violations = room.check_invariants();
        assert!(violations.iter().any(|v| v.message.contains("appears 2 times")));
    }

    #[test]
    fn test_missing_square_is_reported() {
        let mut room = room();
        room.deck.deal();
        let violations = room.check_invariants();
        assert!(violations.iter().any(|v| v.message.contains("missing")));
    }

    #[test]
    fn test_clue_must_match_givers_card() {
        let mut room = room();
        let held = room.deck.deal().unwrap();
        let other = room.deck.peek().unwrap();
        room.phase = Phase::Active;
        room.outstanding.push((Username::new("A"), held));
        room.clue = Some(Clue {
            giver: Username::new("A"),
            text: "x".into(),
            square: other,
        });
        let violations = room.check_invariants();
        assert_eq!(violations.len(), 1);
        assert!(violations[0].to_string().contains("does not match their card"));
    }

    #[test]
    fn test_score_only_when_finished() {
        let mut room = room();
        room.final_score = Some(0);
        assert!(!room.check_invariants().is_empty());
        room.phase = Phase::Finished;
        assert!(room.check_invariants().is_empty());
    }
}
