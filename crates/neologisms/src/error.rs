//! Unified error type for the Neologisms server.

use std::time::Duration;

use neologisms_protocol::ProtocolError;
use neologisms_room::RoomError;
use neologisms_transport::TransportError;

/// Top-level error that wraps all crate-specific errors.
///
/// The `#[from]` attribute on each variant auto-generates `From` impls,
/// so the `?` operator converts sub-crate errors automatically.
#[derive(Debug, thiserror::Error)]
pub enum NeologismsError {
    /// A transport-level error (connection, send, recv).
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// A protocol-level error (encode, decode).
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// A room-level error (not found, illegal action, unavailable).
    #[error(transparent)]
    Room(#[from] RoomError),

    /// A bad configuration value.
    #[error("configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// A client stopped reading; a frame could not be written in time.
    #[error("send timed out after {0:?}")]
    SendTimeout(Duration),
}
