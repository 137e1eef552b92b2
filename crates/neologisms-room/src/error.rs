//! Error types for the room layer.
//!
//! Display strings are what clients see in `{"success": false, "error": ...}`.

use neologisms_protocol::RoomId;

/// A player action that the current room state does not allow.
///
/// Raised by the rules engine before anything is mutated, so a failed
/// action never leaves a room half-changed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RuleError {
    /// The player already holds an unresolved card.
    #[error("You already have a card")]
    AlreadyHolding,

    #[error("No cards left")]
    DeckEmpty,

    /// The room is finished; only refresh is accepted.
    #[error("Game over")]
    GameOver,

    /// Clue attempted without holding a card.
    #[error("You don't have a card")]
    NoCard,

    /// Another clue is awaiting guesses.
    #[error("Clue already given")]
    ClueInProgress,

    #[error("No clue given")]
    NoActiveClue,

    /// The clue giver tried to guess their own clue.
    #[error("You can't guess your own clue")]
    SelfGuess,

    /// The guessed square is already in the correct set.
    #[error("Square already guessed")]
    AlreadySolved,

    /// Blank clue text.
    #[error("Missing clue")]
    EmptyClue,
}

impl RuleError {
    /// HTTP-style status: 400 for malformed input, 409 otherwise.
    pub fn code(&self) -> u16 {
        match self {
            Self::EmptyClue => 400,
            _ => 409,
        }
    }
}

/// Errors that can occur during room operations.
#[derive(Debug, thiserror::Error)]
pub enum RoomError {
    /// The room does not exist.
    #[error("Game not found")]
    NotFound(RoomId),

    /// `new_game` named an id that is already taken.
    #[error("Game {0} already exists")]
    AlreadyExists(RoomId),

    /// Malformed input caught before the room was touched.
    #[error("{0}")]
    Validation(String),

    /// The rules engine rejected the action.
    #[error(transparent)]
    Rule(#[from] RuleError),

    /// The room's actor is gone (channel closed or reply dropped).
    #[error("Game {0} is unavailable")]
    Unavailable(RoomId),
}

impl RoomError {
    /// HTTP-style status code carried in failed responses.
    pub fn code(&self) -> u16 {
        match self {
            Self::NotFound(_) => 404,
            Self::AlreadyExists(_) => 409,
            Self::Validation(_) => 400,
            Self::Rule(e) => e.code(),
            Self::Unavailable(_) => 503,
        }
    }
}
