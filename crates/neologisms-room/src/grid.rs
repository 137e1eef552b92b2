//! Board and deck generation.
//!
//! A board is ten distinct corpus words: five row labels and five column
//! labels. A deck is all 25 squares in a shuffled order that is fixed at
//! generation time; cards are dealt from the end.

use neologisms_protocol::{BOARD_SIZE, RoomId, Square, WordsView};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

use crate::words;

const LABELS: usize = BOARD_SIZE as usize;

/// Row and column label words.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    /// Column labels, indexed by `Square::x`.
    pub horizontal: Vec<String>,
    /// Row labels, indexed by `Square::y`.
    pub vertical: Vec<String>,
}

impl Board {
    /// Draws ten distinct words: the first five label rows, the rest columns.
    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let mut picked = words::random_words(rng, LABELS * 2);
        let horizontal = picked.split_off(LABELS);
        Self {
            horizontal,
            vertical: picked,
        }
    }

    /// The wire form of the board.
    pub fn view(&self) -> WordsView {
        WordsView {
            horizontal: self.horizontal.clone(),
            vertical: self.vertical.clone(),
        }
    }
}

/// The undealt squares, in deal order (last element is dealt next).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Deck {
    squares: Vec<Square>,
}

impl Deck {
    /// All 25 squares in a uniformly random order.
    pub fn shuffled<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let mut squares: Vec<Square> = Square::all().collect();
        squares.shuffle(rng);
        Self { squares }
    }

    /// A deck that deals `squares` back to front. Used by tests that need
    /// a known deal order.
    pub fn from_order(squares: Vec<Square>) -> Self {
        Self { squares }
    }

    /// Deals the next card.
    pub fn deal(&mut self) -> Option<Square> {
        self.squares.pop()
    }

    /// The card [`deal`](Self::deal) would return next.
    pub fn peek(&self) -> Option<Square> {
        self.squares.last().copied()
    }

    pub fn len(&self) -> usize {
        self.squares.len()
    }

    pub fn is_empty(&self) -> bool {
        self.squares.is_empty()
    }

    /// Undealt squares in deal order.
    pub fn squares(&self) -> &[Square] {
        &self.squares
    }

    /// Undealt squares in row-major order, for display.
    pub fn sorted(&self) -> Vec<Square> {
        let mut squares = self.squares.clone();
        squares.sort_by_key(|s| (s.y, s.x));
        squares
    }
}

/// A fresh board and deck.
pub fn generate<R: Rng + ?Sized>(rng: &mut R) -> (Board, Deck) {
    let board = Board::random(rng);
    let deck = Deck::shuffled(rng);
    (board, deck)
}

/// A fresh board and deck from a fixed seed; same seed, same game.
pub fn generate_seeded(seed: u64) -> (Board, Deck) {
    generate(&mut StdRng::seed_from_u64(seed))
}

/// A human-friendly room id: two corpus words and a random hex byte,
/// e.g. `amber-otter-3f`.
pub fn random_room_id<R: Rng + ?Sized>(rng: &mut R) -> RoomId {
    let words = words::random_words(rng, 2);
    let suffix: u8 = rng.random();
    RoomId::new(format!("{}-{suffix:02x}", words.join("-")))
}
