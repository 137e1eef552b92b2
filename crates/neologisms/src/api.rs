//! Boundary adapter: turns client [`Request`]s into registry calls and
//! their outcomes into [`Response`]s.
//!
//! Field validation happens here, before any room is touched. Everything
//! that depends on room state is left to the rules engine.

use std::collections::HashSet;

use neologisms_protocol::{GameView, Request, Response, RoomId, SessionId, Square, Username};
use neologisms_room::{RoomError, RoomRegistry, UpdateSender, parse_room_id};

/// One client connection's identity and room memberships.
#[derive(Debug)]
pub struct Session {
    id: SessionId,
    updates: UpdateSender,
    joined: HashSet<RoomId>,
}

impl Session {
    /// A session whose room updates are delivered on `updates`.
    pub fn new(id: SessionId, updates: UpdateSender) -> Self {
        Self {
            id,
            updates,
            joined: HashSet::new(),
        }
    }

    pub fn id(&self) -> SessionId {
        self.id
    }

    /// Forgets every membership, returning the rooms to unsubscribe from.
    pub fn take_joined(&mut self) -> Vec<RoomId> {
        self.joined.drain().collect()
    }
}

/// What a successful request produced.
enum Reply {
    Game(GameView),
    Guessed(GameView, bool),
    Ack,
}

/// Executes one request on behalf of `session`.
///
/// Never fails: errors become `{"success": false, "error", "code"}`.
pub async fn execute(
    registry: &RoomRegistry,
    session: &mut Session,
    seq: u64,
    request: Request,
) -> Response {
    let action = request.action();
    let outcome = match request {
        Request::Join { room } => join(registry, session, room).await,
        Request::Leave { room } => leave(registry, session, room).await,
        request => dispatch(registry, request).await,
    };
    if let Err(e) = &outcome {
        tracing::debug!(session = %session.id, action, error = %e, "request failed");
    }
    respond(seq, outcome)
}

/// Executes a request that needs no connection of its own, as the HTTP
/// routes do. `join` and `leave` are refused.
pub async fn perform(registry: &RoomRegistry, seq: u64, request: Request) -> Response {
    let action = request.action();
    let outcome = dispatch(registry, request).await;
    if let Err(e) = &outcome {
        tracing::debug!(action, error = %e, "request failed");
    }
    respond(seq, outcome)
}

fn respond(seq: u64, outcome: Result<Reply, RoomError>) -> Response {
    match outcome {
        Ok(Reply::Game(game)) => Response::ok(seq, Some(game)),
        Ok(Reply::Guessed(game, correct)) => Response::guessed(seq, game, correct),
        Ok(Reply::Ack) => Response::ok(seq, None),
        Err(e) => Response::failure(seq, e.code(), e.to_string()),
    }
}

async fn dispatch(registry: &RoomRegistry, request: Request) -> Result<Reply, RoomError> {
    match request {
        Request::NewGame { id, timer } => {
            let id = match id.as_deref().map(str::trim) {
                None | Some("") => None,
                Some(raw) => Some(parse_room_id(raw)?),
            };
            let handle = registry.create(id, timer.unwrap_or(0)).await?;
            Ok(Reply::Game(handle.snapshot().await?))
        }
        Request::Game { id } => {
            let id = room_id(id)?;
            Ok(Reply::Game(registry.snapshot(&id).await?))
        }
        Request::DrawCard { id, username } => {
            let id = room_id(id)?;
            let player = username_of(username)?;
            Ok(Reply::Game(registry.draw(&id, player).await?))
        }
        Request::GiveClue {
            id,
            username,
            clue,
        } => {
            let id = room_id(id)?;
            let player = username_of(username)?;
            let clue = clue
                .filter(|c| !c.is_empty())
                .ok_or_else(|| invalid("Missing required fields"))?;
            Ok(Reply::Game(registry.give_clue(&id, player, clue).await?))
        }
        Request::Guess {
            id,
            row,
            col,
            username,
        } => {
            let id = room_id(id)?;
            let player = username_of(username)?;
            let (Some(row), Some(col)) = (row, col) else {
                return Err(invalid("Missing square"));
            };
            let square = Square::from_row_col(row, col).ok_or_else(|| invalid("Invalid square"))?;
            let (game, correct) = registry.guess(&id, player, square).await?;
            Ok(Reply::Guessed(game, correct))
        }
        Request::Refresh { id } => {
            let id = room_id(id)?;
            Ok(Reply::Game(registry.refresh(&id).await?))
        }
        Request::Join { .. } | Request::Leave { .. } => {
            Err(invalid("Subscriptions need a WebSocket connection"))
        }
    }
}

async fn join(
    registry: &RoomRegistry,
    session: &mut Session,
    room: Option<String>,
) -> Result<Reply, RoomError> {
    let id = room.as_deref().ok_or_else(|| invalid("Missing room"))?;
    let id = parse_room_id(id)?;
    registry
        .subscribe(&id, session.id, session.updates.clone())
        .await?;
    tracing::debug!(session = %session.id, room_id = %id, "joined room");
    session.joined.insert(id);
    Ok(Reply::Ack)
}

async fn leave(
    registry: &RoomRegistry,
    session: &mut Session,
    room: Option<String>,
) -> Result<Reply, RoomError> {
    let id = room.as_deref().ok_or_else(|| invalid("Missing room"))?;
    let id = parse_room_id(id)?;
    session.joined.remove(&id);
    registry.unsubscribe(&id, session.id).await?;
    tracing::debug!(session = %session.id, room_id = %id, "left room");
    Ok(Reply::Ack)
}

fn room_id(raw: Option<String>) -> Result<RoomId, RoomError> {
    parse_room_id(raw.as_deref().unwrap_or_default())
}

fn username_of(raw: Option<String>) -> Result<Username, RoomError> {
    raw.filter(|name| !name.is_empty())
        .map(Username::new)
        .ok_or_else(|| invalid("Missing username"))
}

fn invalid(message: &str) -> RoomError {
    RoomError::Validation(message.to_owned())
}

#[cfg(test)]
mod tests {
    use neologisms_protocol::Phase;
    use neologisms_room::RoomConfig;
    use tokio::sync::mpsc;

    use super::*;

    fn setup() -> (RoomRegistry, Session, mpsc::UnboundedReceiver<neologisms_protocol::Update>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (
            RoomRegistry::new(RoomConfig::default().with_seed(5)),
            Session::new(SessionId(1), tx),
            rx,
        )
    }

    fn new_game(id: &str) -> Request {
        Request::NewGame {
            id: Some(id.into()),
            timer: None,
        }
    }

    #[tokio::test]
    async fn test_new_game_without_id_generates_one() {
        let (registry, mut session, _rx) = setup();
        let resp = execute(
            &registry,
            &mut session,
            1,
            Request::NewGame {
                id: Some("  ".into()),
                timer: Some(60),
            },
        )
        .await;
        assert!(resp.success);
        let game = resp.game.unwrap();
        assert_eq!(game.phase, Phase::Created);
        assert_eq!(game.timer, 60);
        assert!(!game.id.as_str().is_empty());
    }

    #[tokio::test]
    async fn test_missing_fields_are_reported_by_name() {
        let (registry, mut session, _rx) = setup();
        execute(&registry, &mut session, 1, new_game("R1")).await;

        let cases = [
            (Request::Game { id: None }, "Missing id"),
            (
                Request::DrawCard {
                    id: Some("R1".into()),
                    username: None,
                },
                "Missing username",
            ),
            (
                Request::GiveClue {
                    id: Some("R1".into()),
                    username: Some("A".into()),
                    clue: Some(String::new()),
                },
                "Missing required fields",
            ),
            (
                Request::Guess {
                    id: Some("R1".into()),
                    row: Some(1),
                    col: None,
                    username: Some("B".into()),
                },
                "Missing square",
            ),
            (
                Request::Guess {
                    id: Some("R1".into()),
                    row: Some(5),
                    col: Some(0),
                    username: Some("B".into()),
                },
                "Invalid square",
            ),
            (Request::Join { room: None }, "Missing room"),
        ];
        for (request, message) in cases {
            let resp = execute(&registry, &mut session, 2, request).await;
            assert!(!resp.success);
            assert_eq!(resp.error.as_deref(), Some(message));
            assert_eq!(resp.code, Some(400));
        }
    }

    #[tokio::test]
    async fn test_unknown_room_is_404() {
        let (registry, mut session, _rx) = setup();
        let resp = execute(
            &registry,
            &mut session,
            3,
            Request::Refresh {
                id: Some("ghost".into()),
            },
        )
        .await;
        assert_eq!(resp.seq, 3);
        assert_eq!(resp.error.as_deref(), Some("Game not found"));
        assert_eq!(resp.code, Some(404));
    }

    #[tokio::test]
    async fn test_guess_response_carries_correct_flag() {
        let (registry, mut session, _rx) = setup();
        execute(&registry, &mut session, 1, new_game("R1")).await;
        let drawn = execute(
            &registry,
            &mut session,
            2,
            Request::DrawCard {
                id: Some("R1".into()),
                username: Some("A".into()),
            },
        )
        .await;
        let target = drawn.game.unwrap().outstanding[0].square;
        execute(
            &registry,
            &mut session,
            3,
            Request::GiveClue {
                id: Some("R1".into()),
                username: Some("A".into()),
                clue: Some("ocean".into()),
            },
        )
        .await;

        let resp = execute(
            &registry,
            &mut session,
            4,
            Request::Guess {
                id: Some("R1".into()),
                row: Some(i64::from(target.y)),
                col: Some(i64::from(target.x)),
                username: Some("B".into()),
            },
        )
        .await;
        assert!(resp.success);
        assert_eq!(resp.correct, Some(true));
        assert_eq!(resp.game.unwrap().correct, vec![target]);
    }

    #[tokio::test]
    async fn test_join_and_leave_track_membership() {
        let (registry, mut session, mut rx) = setup();
        execute(&registry, &mut session, 1, new_game("R1")).await;

        let resp = execute(
            &registry,
            &mut session,
            2,
            Request::Join {
                room: Some("R1".into()),
            },
        )
        .await;
        assert!(resp.success);
        assert!(resp.game.is_none());
        assert_eq!(session.joined.len(), 1);
        assert_eq!(rx.try_recv().unwrap().game.id.as_str(), "R1");

        let resp = execute(
            &registry,
            &mut session,
            3,
            Request::Leave {
                room: Some("R1".into()),
            },
        )
        .await;
        assert!(resp.success);
        assert_eq!(session.joined.len(), 0);
    }

    #[tokio::test]
    async fn test_perform_refuses_subscriptions() {
        let (registry, _session, _rx) = setup();
        let resp = perform(&registry, 0, new_game("R1")).await;
        assert!(resp.success);

        let resp = perform(
            &registry,
            0,
            Request::Join {
                room: Some("R1".into()),
            },
        )
        .await;
        assert!(!resp.success);
        assert_eq!(resp.code, Some(400));
        assert_eq!(
            resp.error.as_deref(),
            Some("Subscriptions need a WebSocket connection")
        );
    }

    #[tokio::test]
    async fn test_join_unknown_room_fails() {
        let (registry, mut session, _rx) = setup();
        let resp = execute(
            &registry,
            &mut session,
            1,
            Request::Join {
                room: Some("ghost".into()),
            },
        )
        .await;
        assert_eq!(resp.code, Some(404));
        assert!(session.take_joined().is_empty());
    }
}
