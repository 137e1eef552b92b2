//! Codec trait and implementations for serializing/deserializing frames.
//!
//! The server never serializes frames directly; it goes through a
//! [`Codec`] so the wire format can be swapped without touching the
//! connection handler. [`JsonCodec`] is the only implementation today and
//! matches what browser clients speak.

use serde::{Serialize, de::DeserializeOwned};

use crate::ProtocolError;

/// A codec that can encode Rust types to bytes and decode bytes back.
///
/// `Send + Sync + 'static` because one codec instance lives in the shared
/// server state and is used from every connection task.
pub trait Codec: Send + Sync + 'static {
    /// Serializes a value into bytes.
    ///
    /// # Errors
    /// Returns `ProtocolError::Encode` if serialization fails.
    fn encode<T: Serialize>(&self, value: &T) -> Result<Vec<u8>, ProtocolError>;

    /// Deserializes bytes back into a value.
    ///
    /// # Errors
    /// Returns `ProtocolError::Decode` if the bytes are malformed or
    /// don't match the expected type.
    fn decode<T: DeserializeOwned>(&self, data: &[u8]) -> Result<T, ProtocolError>;
}

// ---------------------------------------------------------------------------
// JsonCodec
// ---------------------------------------------------------------------------

/// A [`Codec`] that uses JSON (via `serde_json`).
///
/// Output is always valid UTF-8, so the transport sends it as text frames.
///
/// ## Example
///
/// ```rust
/// use neologisms_protocol::{ClientFrame, Codec, JsonCodec, Request};
///
/// let codec = JsonCodec;
/// let frame: ClientFrame = codec
///     .decode(br#"{"seq": 4, "action": "refresh", "id": "blue-otter-1f"}"#)
///     .unwrap();
/// assert_eq!(frame.seq, 4);
/// assert!(matches!(frame.request, Request::Refresh { .. }));
/// ```
#[cfg(feature = "json")]
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

#[cfg(feature = "json")]
impl Codec for JsonCodec {
    fn encode<T: Serialize>(&self, value: &T) -> Result<Vec<u8>, ProtocolError> {
        serde_json::to_vec(value).map_err(ProtocolError::Encode)
    }

    fn decode<T: DeserializeOwned>(&self, data: &[u8]) -> Result<T, ProtocolError> {
        serde_json::from_slice(data).map_err(ProtocolError::Decode)
    }
}
