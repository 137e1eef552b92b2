//! Request, response, and push frames.
//!
//! Client → server:
//!
//! ```json
//! { "seq": 7, "action": "guess", "id": "amber-otter-3f", "row": 1, "col": 2, "username": "ab12" }
//! ```
//!
//! Server → client, tagged by `type`:
//!
//! ```json
//! { "type": "response", "seq": 7, "success": true, "game": { ... }, "correct": false }
//! { "type": "update", "game": { ... }, "correct": false }
//! ```
//!
//! Request fields are all optional at the decode level. A frame with a
//! missing `id` still decodes, so the server can answer with a precise
//! "Missing id" error instead of a generic decode failure.

use serde::{Deserialize, Serialize};

use crate::GameView;

// ---------------------------------------------------------------------------
// Client → server
// ---------------------------------------------------------------------------

/// One client request plus the sequence number its response will echo.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientFrame {
    /// Client-chosen correlation number, echoed in the response.
    #[serde(default)]
    pub seq: u64,
    /// The request itself, flattened next to `seq`.
    #[serde(flatten)]
    pub request: Request,
}

/// Every action a client can ask for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Request {
    /// Create a room. `id` is optional; the server generates one if absent.
    NewGame {
        #[serde(default)]
        id: Option<String>,
        /// Game length in seconds. Absent or 0 disables the timer.
        #[serde(default)]
        timer: Option<u32>,
    },
    /// Fetch the current view of a room.
    Game {
        #[serde(default)]
        id: Option<String>,
    },
    /// Draw a card from the deck.
    DrawCard {
        #[serde(default)]
        id: Option<String>,
        #[serde(default)]
        username: Option<String>,
    },
    /// Give a clue for the caller's drawn card.
    GiveClue {
        #[serde(default)]
        id: Option<String>,
        #[serde(default)]
        username: Option<String>,
        #[serde(default)]
        clue: Option<String>,
    },
    /// Guess the square the active clue points at.
    Guess {
        #[serde(default)]
        id: Option<String>,
        #[serde(default)]
        row: Option<i64>,
        #[serde(default)]
        col: Option<i64>,
        #[serde(default)]
        username: Option<String>,
    },
    /// Start a new board in the same room.
    Refresh {
        #[serde(default)]
        id: Option<String>,
    },
    /// Subscribe this connection to a room's updates.
    Join {
        #[serde(default)]
        room: Option<String>,
    },
    /// Stop receiving a room's updates.
    Leave {
        #[serde(default)]
        room: Option<String>,
    },
}

impl Request {
    /// The wire name of the action, for logging.
    pub fn action(&self) -> &'static str {
        match self {
            Self::NewGame { .. } => "new_game",
            Self::Game { .. } => "game",
            Self::DrawCard { .. } => "draw_card",
            Self::GiveClue { .. } => "give_clue",
            Self::Guess { .. } => "guess",
            Self::Refresh { .. } => "refresh",
            Self::Join { .. } => "join",
            Self::Leave { .. } => "leave",
        }
    }
}

// ---------------------------------------------------------------------------
// Server → client
// ---------------------------------------------------------------------------

/// Everything the server sends.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerFrame {
    /// Answer to exactly one [`ClientFrame`].
    Response(Response),
    /// Pushed to every subscriber after a committed room mutation.
    Update(Update),
}

/// The outcome of one request: `{success, game?, correct?, error?, code?}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Response {
    /// Echo of the request's `seq`.
    pub seq: u64,
    /// `true` when the action was applied (or the read succeeded).
    pub success: bool,
    /// Room view after the action.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub game: Option<GameView>,
    /// Present only on guess responses.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub correct: Option<bool>,
    /// Human-readable reason on failure.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// HTTP-style failure class: 400 invalid, 404 unknown room,
    /// 409 illegal in the current state, 503 room unavailable.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<u16>,
}

impl Response {
    /// A successful response carrying an optional room view.
    pub fn ok(seq: u64, game: Option<GameView>) -> Self {
        Self {
            seq,
            success: true,
            game,
            correct: None,
            error: None,
            code: None,
        }
    }

    /// A successful guess response.
    pub fn guessed(seq: u64, game: GameView, correct: bool) -> Self {
        Self {
            correct: Some(correct),
            ..Self::ok(seq, Some(game))
        }
    }

    /// A failed response.
    pub fn failure(seq: u64, code: u16, error: impl Into<String>) -> Self {
        Self {
            seq,
            success: false,
            game: None,
            correct: None,
            error: Some(error.into()),
            code: Some(code),
        }
    }
}

/// A room snapshot pushed to subscribers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Update {
    /// The room after the mutation.
    pub game: GameView,
    /// Present only when the mutation was a guess.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub correct: Option<bool>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_guess_request_decodes_from_client_json() {
        let json = r#"{"seq": 7, "action": "guess", "id": "R1", "row": 1, "col": 2, "username": "B"}"#;
        let frame: ClientFrame = serde_json::from_str(json).unwrap();
        assert_eq!(frame.seq, 7);
        assert_eq!(
            frame.request,
            Request::Guess {
                id: Some("R1".into()),
                row: Some(1),
                col: Some(2),
                username: Some("B".into()),
            }
        );
    }

    #[test]
    fn test_missing_fields_still_decode() {
        let frame: ClientFrame = serde_json::from_str(r#"{"action": "draw_card"}"#).unwrap();
        assert_eq!(frame.seq, 0);
        assert_eq!(
            frame.request,
            Request::DrawCard {
                id: None,
                username: None
            }
        );
    }

    #[test]
    fn test_new_game_timer_is_optional() {
        let frame: ClientFrame =
            serde_json::from_str(r#"{"seq": 1, "action": "new_game", "timer": 90}"#).unwrap();
        assert_eq!(
            frame.request,
            Request::NewGame {
                id: None,
                timer: Some(90)
            }
        );
    }

    #[test]
    fn test_unknown_action_fails_to_decode() {
        let result: Result<ClientFrame, _> =
            serde_json::from_str(r#"{"seq": 1, "action": "fly_to_moon"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_failure_response_json_shape() {
        let frame = ServerFrame::Response(Response::failure(2, 409, "Clue already given"));
        let json = serde_json::to_value(&frame).unwrap();
        assert_eq!(json["type"], "response");
        assert_eq!(json["seq"], 2);
        assert_eq!(json["success"], false);
        assert_eq!(json["error"], "Clue already given");
        assert_eq!(json["code"], 409);
        assert!(json.get("game").is_none());
    }

    #[test]
    fn test_ok_response_omits_error_fields() {
        let frame = ServerFrame::Response(Response::ok(5, None));
        let json = serde_json::to_value(&frame).unwrap();
        assert_eq!(json["success"], true);
        assert!(json.get("error").is_none());
        assert!(json.get("correct").is_none());
    }

    #[test]
    fn test_action_names_match_wire_tags() {
        let req = Request::GiveClue {
            id: None,
            username: None,
            clue: None,
        };
        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(json["action"], req.action());
    }
}
