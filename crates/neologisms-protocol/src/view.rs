//! The client-facing view of a room.
//!
//! [`GameView`] is what every request response and every push update
//! carries. Field names follow what the browser client reads
//! (`words.horizontal`, `deck.squares`, `remainingTime`, `finalScore`).

use serde::{Deserialize, Serialize};

use crate::{RoomId, Square, Username};

/// Where a room is in its lifecycle.
///
/// ```text
/// Created ──(first draw)──→ Active ──(timer expires / board cleared)──→ Finished
///    ↑                                                                      │
///    └───────────────────────────(refresh)──────────────────────────────────┘
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    /// Fresh board, nobody has drawn yet, timer not started.
    Created,
    /// At least one card drawn; clues and guesses are flowing.
    Active,
    /// Game over. Only `refresh` is accepted.
    Finished,
}

/// The row and column label words.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WordsView {
    /// Column labels, indexed by `Square::x`.
    pub horizontal: Vec<String>,
    /// Row labels, indexed by `Square::y`.
    pub vertical: Vec<String>,
}

/// The squares still in the deck.
///
/// Listed in row-major order rather than draw order so the view never
/// reveals which card comes next.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeckView {
    /// Undealt squares.
    pub squares: Vec<Square>,
}

/// One drawn-but-unresolved card.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutstandingView {
    /// Who holds the card.
    pub username: Username,
    /// The square on the card.
    pub square: Square,
}

/// The active clue. The target square is deliberately absent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClueView {
    /// Who gave the clue.
    pub username: Username,
    /// The clue text.
    pub text: String,
}

/// Full snapshot of a room as clients see it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameView {
    /// Room id.
    pub id: RoomId,
    /// Lifecycle phase.
    pub phase: Phase,
    /// Row and column labels.
    pub words: WordsView,
    /// Undealt squares.
    pub deck: DeckView,
    /// Outstanding draws, in draw order.
    pub outstanding: Vec<OutstandingView>,
    /// The active clue, `null` when none.
    pub clue: Option<ClueView>,
    /// Correctly guessed squares, in the order they were solved.
    pub correct: Vec<Square>,
    /// Configured game length in seconds; 0 means no timer.
    pub timer: u32,
    /// Seconds left; absent until the timer starts.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remaining_time: Option<u32>,
    /// Number of solved squares; present only once the game is over.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub final_score: Option<u32>,
}
