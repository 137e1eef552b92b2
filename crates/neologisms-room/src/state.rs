//! Authoritative per-room data.
//!
//! [`Room`] is plain data: it knows how to describe itself
//! ([`Room::view`]) and how to check itself ([`Room::check_invariants`]),
//! but every change goes through [`crate::rules`].

use neologisms_protocol::{
    ClueView, DeckView, GameView, OutstandingView, Phase, RoomId, Square, Username,
};
use rand::Rng;

use crate::RoomSettings;
use crate::grid::{self, Board, Deck};

/// The clue currently awaiting guesses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Clue {
    /// Who gave it.
    pub giver: Username,
    /// What they said.
    pub text: String,
    /// The giver's card. Never leaves the server.
    pub square: Square,
}

/// One room's full game state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Room {
    pub(crate) id: RoomId,
    pub(crate) settings: RoomSettings,
    pub(crate) phase: Phase,
    pub(crate) board: Board,
    pub(crate) deck: Deck,
    /// Drawn, unsolved cards in draw order; one entry per player at most.
    pub(crate) outstanding: Vec<(Username, Square)>,
    pub(crate) clue: Option<Clue>,
    /// Solved squares in the order they were solved.
    pub(crate) correct: Vec<Square>,
    /// Seconds left, `None` until the first draw starts the clock.
    pub(crate) remaining: Option<u32>,
    pub(crate) final_score: Option<u32>,
}

impl Room {
    /// A room in the `Created` phase with the given board and deck.
    pub fn new(id: RoomId, settings: RoomSettings, board: Board, deck: Deck) -> Self {
        Self {
            id,
            settings,
            phase: Phase::Created,
            board,
            deck,
            outstanding: Vec::new(),
            clue: None,
            correct: Vec::new(),
            remaining: None,
            final_score: None,
        }
    }

    /// A room with a freshly generated board and deck.
    pub fn generate<R: Rng + ?Sized>(id: RoomId, settings: RoomSettings, rng: &mut R) -> Self {
        let (board, deck) = grid::generate(rng);
        Self::new(id, settings, board, deck)
    }

    pub fn id(&self) -> &RoomId {
        &self.id
    }

    pub fn settings(&self) -> RoomSettings {
        self.settings
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn deck(&self) -> &Deck {
        &self.deck
    }

    /// Outstanding draws in draw order.
    pub fn outstanding(&self) -> &[(Username, Square)] {
        &self.outstanding
    }

    /// The card `player` is holding, if any.
    pub fn holding(&self, player: &Username) -> Option<Square> {
        self.outstanding
            .iter()
            .find(|(holder, _)| holder == player)
            .map(|(_, square)| *square)
    }

    pub fn clue(&self) -> Option<&Clue> {
        self.clue.as_ref()
    }

    pub fn correct(&self) -> &[Square] {
        &self.correct
    }

    /// Seconds left on the clock, `None` while it has not started.
    pub fn remaining(&self) -> Option<u32> {
        self.remaining
    }

    pub fn final_score(&self) -> Option<u32> {
        self.final_score
    }

    pub fn is_finished(&self) -> bool {
        self.phase == Phase::Finished
    }

    /// Whether the countdown should be running right now.
    pub fn clock_running(&self) -> bool {
        self.phase == Phase::Active && self.remaining.is_some_and(|secs| secs > 0)
    }

    /// The client-facing snapshot. The active clue's square is withheld.
    pub fn view(&self) -> GameView {
        GameView {
            id: self.id.clone(),
            phase: self.phase,
            words: self.board.view(),
            deck: DeckView {
                squares: self.deck.sorted(),
            },
            outstanding: self
                .outstanding
                .iter()
                .map(|(username, square)| OutstandingView {
                    username: username.clone(),
                    square: *square,
                })
                .collect(),
            clue: self.clue.as_ref().map(|c| ClueView {
                username: c.giver.clone(),
                text: c.text.clone(),
            }),
            correct: self.correct.clone(),
            timer: self.settings.timer_secs,
            remaining_time: self.remaining,
            final_score: self.final_score,
        }
    }
}
