//! Room engine for Neologisms.
//!
//! Each room runs as an isolated Tokio task (actor model) that owns its
//! board, deck, clue and clock, and pushes every committed change to the
//! sessions watching it.
//!
//! # Key types
//!
//! - [`RoomRegistry`]: creates rooms and routes actions to them
//! - [`RoomHandle`]: send commands to a running room actor
//! - [`Room`]: the authoritative game state of one room
//! - [`rules`]: the legal transitions (draw, clue, guess, refresh, tick)
//! - [`BroadcastHub`]: per-room subscriber list
//! - [`RoomConfig`]: registry-wide settings

mod config;
mod error;
pub mod grid;
mod hub;
mod invariants;
mod manager;
mod room;
pub mod rules;
mod state;
pub mod words;

pub use config::{RoomConfig, RoomSettings};
pub use error::{RoomError, RuleError};
pub use hub::{BroadcastHub, UpdateSender};
pub use invariants::{InvariantViolation, SQUARE_COUNT};
pub use manager::{MAX_ROOM_ID_LEN, RoomRegistry, parse_room_id};
pub use room::RoomHandle;
pub use state::{Clue, Room};
