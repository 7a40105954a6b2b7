//! Error types for the session layer.

use typerace_protocol::ConnectionId;

/// Errors that can occur while binding connections to players.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// The connection already joined a room. A connection is bound to at
    /// most one `(room, nickname)` pair for its whole lifetime.
    #[error("already joined room {room} as {nickname}")]
    AlreadyJoined { room: String, nickname: String },

    /// The connection sent a room action before joining one.
    #[error("join a game first")]
    NotJoined(ConnectionId),

    /// No session exists for the connection (never opened, or closed).
    #[error("no session for {0}")]
    NotFound(ConnectionId),

    /// `open` was called twice for the same connection.
    #[error("session for {0} is already open")]
    AlreadyOpen(ConnectionId),
}
