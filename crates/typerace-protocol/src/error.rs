//! Error types for the protocol layer.
//!
//! Every crate in the workspace owns its error enum. A `ProtocolError`
//! always means "the bytes or their shape were wrong", never "the game
//! refused the action" (that is a `RoomError` one layer up).

/// Errors that can occur while encoding or decoding events.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// Serialization failed (turning an event into bytes).
    #[cfg(feature = "json")]
    #[error("encode failed: {0}")]
    Encode(serde_json::Error),

    /// Deserialization failed (turning bytes into an event).
    ///
    /// Common causes: malformed JSON, an unknown `event` name, a missing
    /// `data` field, or a role that is not `player`/`spectator`/`admin`.
    #[cfg(feature = "json")]
    #[error("decode failed: {0}")]
    Decode(serde_json::Error),

    /// The event decoded but violates a boundary rule, e.g. a blank
    /// nickname.
    #[error("invalid message: {0}")]
    InvalidMessage(String),
}
