//! # Neologisms
//!
//! Real-time server for Neologisms, a cooperative word-association board
//! game played on a 5×5 grid of word pairs.
//!
//! Clients talk JSON over WebSocket. Every frame carries an `action` and a
//! `seq` that the server echoes in its response; clients that `join` a room
//! additionally receive an `update` frame after every change to it.
//!
//! The same game actions are also served as plain HTTP routes (see
//! [`http`]) for clients that poll instead.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use neologisms::prelude::*;
//!
//! # async fn start() -> Result<(), NeologismsError> {
//! let server = NeologismsServer::builder()
//!     .config(ServerConfig::from_env()?)
//!     .build()
//!     .await?;
//! server.run().await
//! # }
//! ```

pub mod api;
mod config;
mod error;
mod handler;
pub mod http;
mod server;

pub use config::{
    DEFAULT_BIND_ADDR, DEFAULT_HANDSHAKE_TIMEOUT, DEFAULT_HTTP_BIND_ADDR, DEFAULT_IDLE_TIMEOUT,
    DEFAULT_SEND_TIMEOUT, ServerConfig,
};
pub use error::NeologismsError;
pub use server::{NeologismsServer, NeologismsServerBuilder};

/// Everything needed to start a server and speak its protocol.
pub mod prelude {
    pub use crate::{NeologismsError, NeologismsServer, NeologismsServerBuilder, ServerConfig};
    pub use neologisms_protocol::{
        ClientFrame, Codec, GameView, JsonCodec, Phase, Request, Response, RoomId, ServerFrame,
        Square, Update, Username,
    };
    pub use neologisms_room::{RoomConfig, RoomError, RoomRegistry, RuleError};
}
