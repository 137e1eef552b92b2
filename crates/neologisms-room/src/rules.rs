//! Game rules: every legal change to a [`Room`].
//!
//! Each operation checks all of its preconditions first and only then
//! mutates, so an `Err` always means the room is exactly as it was.
//!
//! ```text
//! Created ──draw──→ Active ──timer hits 0 / board cleared──→ Finished
//!    ↑                                                          │
//!    └──────────────────────── refresh ─────────────────────────┘
//! ```

use neologisms_protocol::{Phase, Square, Username};
use rand::Rng;

use crate::grid;
use crate::state::Clue;
use crate::{Room, RuleError};

/// What a successful draw did besides dealing a card.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DrawOutcome {
    /// The dealt card.
    pub square: Square,
    /// This draw started the countdown.
    pub started_clock: bool,
}

/// What a clock tick did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Nothing to count down.
    Idle,
    /// Time moved; the room is still running.
    Counted { remaining: u32 },
    /// Time ran out and the room finished.
    Finished { final_score: u32 },
}

impl TickOutcome {
    /// Whether the room changed and subscribers need an update.
    pub fn changed(&self) -> bool {
        !matches!(self, Self::Idle)
    }
}

/// Deals the next card to `player`.
///
/// The first draw after creation or refresh moves the room to `Active`
/// and, if the room has a timer, starts the clock.
pub fn draw(room: &mut Room, player: &Username) -> Result<DrawOutcome, RuleError> {
    if room.is_finished() {
        return Err(RuleError::GameOver);
    }
    if room.holding(player).is_some() {
        return Err(RuleError::AlreadyHolding);
    }
    let square = room.deck.deal().ok_or(RuleError::DeckEmpty)?;

    room.outstanding.push((player.clone(), square));
    room.phase = Phase::Active;

    let started_clock = room.remaining.is_none() && room.settings.timer_secs > 0;
    if started_clock {
        room.remaining = Some(room.settings.timer_secs);
    }

    Ok(DrawOutcome {
        square,
        started_clock,
    })
}

/// Makes `text` the room's active clue for `player`'s card.
///
/// Only one clue is live per room; everyone else waits until it is solved.
pub fn give_clue(room: &mut Room, player: &Username, text: &str) -> Result<(), RuleError> {
    if room.is_finished() {
        return Err(RuleError::GameOver);
    }
    let text = text.trim();
    if text.is_empty() {
        return Err(RuleError::EmptyClue);
    }
    let square = room.holding(player).ok_or(RuleError::NoCard)?;
    if room.clue.is_some() {
        return Err(RuleError::ClueInProgress);
    }

    room.clue = Some(Clue {
        giver: player.clone(),
        text: text.to_owned(),
        square,
    });
    Ok(())
}

/// Guesses the active clue's square. Returns whether the guess was right.
///
/// A wrong guess changes nothing; players may keep trying. A right guess
/// solves the square, frees the giver to draw again and clears the clue.
pub fn guess(room: &mut Room, player: &Username, square: Square) -> Result<bool, RuleError> {
    if room.is_finished() {
        return Err(RuleError::GameOver);
    }
    let clue = room.clue.as_ref().ok_or(RuleError::NoActiveClue)?;
    if clue.giver == *player {
        return Err(RuleError::SelfGuess);
    }
    if room.correct.contains(&square) {
        return Err(RuleError::AlreadySolved);
    }
    if clue.square != square {
        return Ok(false);
    }

    let giver = clue.giver.clone();
    room.correct.push(square);
    room.outstanding.retain(|(holder, _)| *holder != giver);
    room.clue = None;

    if room.settings.finish_when_exhausted && room.deck.is_empty() && room.outstanding.is_empty() {
        finish(room);
    }
    Ok(true)
}

/// Starts a new round in the same room: new board, full deck, clock unset.
///
/// Always legal, including after the game finished.
pub fn refresh<R: Rng + ?Sized>(room: &mut Room, rng: &mut R) {
    let (board, deck) = grid::generate(rng);
    room.board = board;
    room.deck = deck;
    room.outstanding.clear();
    room.clue = None;
    room.correct.clear();
    room.remaining = None;
    room.final_score = None;
    room.phase = Phase::Created;
}

/// Counts the clock down by `elapsed_secs`, finishing the room at zero.
pub fn tick(room: &mut Room, elapsed_secs: u32) -> TickOutcome {
    if room.phase != Phase::Active || elapsed_secs == 0 {
        return TickOutcome::Idle;
    }
    let Some(remaining) = room.remaining else {
        return TickOutcome::Idle;
    };

    let remaining = remaining.saturating_sub(elapsed_secs);
    room.remaining = Some(remaining);
    if remaining == 0 {
        TickOutcome::Finished {
            final_score: finish(room),
        }
    } else {
        TickOutcome::Counted { remaining }
    }
}

fn finish(room: &mut Room) -> u32 {
    let score = u32::try_from(room.correct.len()).unwrap_or(u32::MAX);
    room.phase = Phase::Finished;
    room.final_score = Some(score);
    score
}
