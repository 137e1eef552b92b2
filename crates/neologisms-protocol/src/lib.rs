//! Wire protocol for Neologisms.
//!
//! This crate defines everything that crosses the boundary between the
//! game server and its clients:
//!
//! - **Identity types** ([`RoomId`], [`Username`], [`SessionId`], [`Square`])
//! - **Game views** ([`GameView`] and its parts): the serialized room
//!   state every client renders.
//! - **Frames** ([`ClientFrame`], [`Request`], [`ServerFrame`]): the
//!   request/response and push messages carried over a connection.
//! - **Codec** ([`Codec`] trait, [`JsonCodec`]): how frames become bytes.
//!
//! ```text
//! Transport (bytes) → Protocol (frames) → Room (rules engine)
//! ```

mod codec;
mod error;
mod frame;
mod types;
mod view;

pub use codec::Codec;
#[cfg(feature = "json")]
pub use codec::JsonCodec;
pub use error::ProtocolError;
pub use frame::{ClientFrame, Request, Response, ServerFrame, Update};
pub use types::{BOARD_SIZE, RoomId, SessionId, Square, Username};
pub use view::{ClueView, DeckView, GameView, OutstandingView, Phase, WordsView};
