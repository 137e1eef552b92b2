//! Identity and coordinate types shared by the server and its clients.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Number of rows (and columns) on a board.
pub const BOARD_SIZE: u8 = 5;

// ---------------------------------------------------------------------------
// Identity types
// ---------------------------------------------------------------------------

/// Identifier of a room, e.g. `"amber-otter-3f"`.
///
/// Serialized as a plain JSON string (`#[serde(transparent)]`) because
/// clients put it straight into URLs.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoomId(String);

impl RoomId {
    /// Wraps a raw room id. Validation happens at the boundary, not here.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RoomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A player's identity key.
///
/// Clients generate this handle locally and may embed a display label in
/// it; the engine only ever compares the whole string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Username(String);

impl Username {
    /// Wraps a raw username.
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Returns the username as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Username {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identifies one push-channel connection (one browser tab).
///
/// Rooms key their subscriber lists by session, never by username: the
/// same player may watch a room from several tabs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(pub u64);

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "S-{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Square
// ---------------------------------------------------------------------------

/// One grid intersection: `x` is the column, `y` the row, both `0..5`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Square {
    /// Column index (which horizontal word).
    pub x: u8,
    /// Row index (which vertical word).
    pub y: u8,
}

impl Square {
    /// Creates a square, or `None` if either coordinate is off the board.
    pub fn new(x: u8, y: u8) -> Option<Self> {
        (x < BOARD_SIZE && y < BOARD_SIZE).then_some(Self { x, y })
    }

    /// Builds a square from a client-supplied `(row, col)` pair, which
    /// arrives as arbitrary JSON integers.
    pub fn from_row_col(row: i64, col: i64) -> Option<Self> {
        let x = u8::try_from(col).ok()?;
        let y = u8::try_from(row).ok()?;
        Self::new(x, y)
    }

    /// All 25 squares in row-major order.
    pub fn all() -> impl Iterator<Item = Square> {
        (0..BOARD_SIZE).flat_map(|y| (0..BOARD_SIZE).map(move |x| Square { x, y }))
    }
}

impl fmt::Display for Square {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_room_id_serializes_as_plain_string() {
        let json = serde_json::to_string(&RoomId::new("amber-otter-3f")).unwrap();
        assert_eq!(json, "\"amber-otter-3f\"");
    }

    #[test]
    fn test_username_deserializes_from_plain_string() {
        let name: Username = serde_json::from_str("\"ab12|Kim\"").unwrap();
        assert_eq!(name.as_str(), "ab12|Kim");
    }

    #[test]
    fn test_session_id_display() {
        assert_eq!(SessionId(9).to_string(), "S-9");
    }

    #[test]
    fn test_square_json_shape() {
        let json = serde_json::to_value(Square::new(2, 3).unwrap()).unwrap();
        assert_eq!(json, serde_json::json!({"x": 2, "y": 3}));
    }

    #[test]
    fn test_square_new_rejects_off_board() {
        assert!(Square::new(4, 4).is_some());
        assert!(Square::new(5, 0).is_none());
        assert!(Square::new(0, 5).is_none());
    }

    #[test]
    fn test_from_row_col_maps_row_to_y() {
        let sq = Square::from_row_col(3, 1).unwrap();
        assert_eq!((sq.x, sq.y), (1, 3));
        assert!(Square::from_row_col(-1, 0).is_none());
        assert!(Square::from_row_col(0, 300).is_none());
    }

    #[test]
    fn test_all_yields_25_distinct_squares() {
        let all: std::collections::HashSet<_> = Square::all().collect();
        assert_eq!(all.len(), 25);
    }
}
