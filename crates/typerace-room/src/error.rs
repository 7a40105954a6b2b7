//! Error types for the room layer.
//!
//! Every variant is recoverable and user-facing: the room actor turns it
//! into a unicast `error {message}` for the initiating connection using
//! the `Display` text below. None of them is fatal to the room.

use typerace_protocol::RoomId;

/// Errors that can occur during room operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RoomError {
    /// Another member of the room already uses this nickname.
    #[error("nickname {0} is already taken in this room")]
    DuplicateNickname(String),

    /// The nickname is not a member of this room.
    #[error("player {0} is not in this room")]
    UnknownPlayer(String),

    /// A typing update arrived while no game is `playing`.
    #[error("game is not active")]
    GameNotActive,

    /// The room's lifecycle state doesn't allow this operation, e.g.
    /// starting a game that is already running.
    #[error("invalid room state for this operation: {0}")]
    InvalidState(String),

    /// The member's role doesn't allow this operation.
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// No `player` slot left.
    #[error("{0} is full")]
    RoomFull(RoomId),

    /// The room does not exist.
    #[error("{0} not found")]
    NotFound(RoomId),

    /// The room's command channel is closed (the actor stopped).
    #[error("{0} is unavailable")]
    Unavailable(RoomId),
}
