//! HTTP routes for clients that poll instead of holding a socket open.
//!
//! | Method | Path | Body |
//! |--------|------|------|
//! | `POST` | `/new_game` | `{id?, timer?}` |
//! | `GET` | `/game?id=` | |
//! | `POST` | `/draw_card` | `{id, username}` |
//! | `POST` | `/give_clue` | `{id, username, clue}` |
//! | `POST` | `/guess` | `{id, row, col, username}` |
//! | `POST` | `/refresh` | `{id}` |
//!
//! Every handled request answers `200 OK` with
//! `{success, game?, correct?, error?, code?}`; failures are reported in
//! the body, the same way the WebSocket responses report them. Mutations
//! made here reach WebSocket subscribers like any other.

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::{Query, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use neologisms_protocol::{GameView, Request, Response};
use neologisms_room::RoomRegistry;
use serde::{Deserialize, Serialize};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::api;

/// Query parameters for `GET /game`.
#[derive(Debug, Deserialize)]
pub struct GameQuery {
    #[serde(default)]
    pub id: Option<String>,
}

/// JSON body shared by the `POST` routes. Each route reads the fields it
/// needs and ignores the rest.
#[derive(Debug, Deserialize)]
pub struct ActionBody {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub timer: Option<u32>,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub clue: Option<String>,
    #[serde(default)]
    pub row: Option<i64>,
    #[serde(default)]
    pub col: Option<i64>,
}

/// A [`Response`] without the `seq`, which HTTP has no use for.
#[derive(Debug, Serialize)]
pub struct HttpReply {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub game: Option<GameView>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub correct: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<u16>,
}

impl From<Response> for HttpReply {
    fn from(resp: Response) -> Self {
        Self {
            success: resp.success,
            game: resp.game,
            correct: resp.correct,
            error: resp.error,
            code: resp.code,
        }
    }
}

/// Build the router serving the game actions over HTTP.
///
/// CORS allows any origin so a page served from elsewhere can call it.
pub fn build_router(registry: Arc<RoomRegistry>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/new_game", post(new_game))
        .route("/game", get(game))
        .route("/draw_card", post(draw_card))
        .route("/give_clue", post(give_clue))
        .route("/guess", post(guess))
        .route("/refresh", post(refresh))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(registry)
}

type JsonBody = Result<Json<ActionBody>, JsonRejection>;

async fn new_game(
    State(registry): State<Arc<RoomRegistry>>,
    body: JsonBody,
) -> Json<HttpReply> {
    run(&registry, body, |b| Request::NewGame {
        id: b.id,
        timer: b.timer,
    })
    .await
}

async fn game(
    State(registry): State<Arc<RoomRegistry>>,
    Query(query): Query<GameQuery>,
) -> Json<HttpReply> {
    let resp = api::perform(&registry, 0, Request::Game { id: query.id }).await;
    Json(resp.into())
}

async fn draw_card(
    State(registry): State<Arc<RoomRegistry>>,
    body: JsonBody,
) -> Json<HttpReply> {
    run(&registry, body, |b| Request::DrawCard {
        id: b.id,
        username: b.username,
    })
    .await
}

async fn give_clue(
    State(registry): State<Arc<RoomRegistry>>,
    body: JsonBody,
) -> Json<HttpReply> {
    run(&registry, body, |b| Request::GiveClue {
        id: b.id,
        username: b.username,
        clue: b.clue,
    })
    .await
}

async fn guess(
    State(registry): State<Arc<RoomRegistry>>,
    body: JsonBody,
) -> Json<HttpReply> {
    run(&registry, body, |b| Request::Guess {
        id: b.id,
        row: b.row,
        col: b.col,
        username: b.username,
    })
    .await
}

async fn refresh(
    State(registry): State<Arc<RoomRegistry>>,
    body: JsonBody,
) -> Json<HttpReply> {
    run(&registry, body, |b| Request::Refresh { id: b.id }).await
}

async fn run(
    registry: &RoomRegistry,
    body: JsonBody,
    request: impl FnOnce(ActionBody) -> Request,
) -> Json<HttpReply> {
    let resp = match body {
        Ok(Json(body)) => api::perform(registry, 0, request(body)).await,
        Err(rejection) => {
            tracing::debug!(error = %rejection, "rejected request body");
            Response::failure(0, 400, format!("invalid body: {}", rejection.body_text()))
        }
    };
    Json(resp.into())
}
