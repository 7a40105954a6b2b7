//! Unified error type for the typerace server.

use typerace_protocol::ProtocolError;
use typerace_room::RoomError;
use typerace_session::SessionError;
use typerace_transport::TransportError;

/// Top-level error that wraps all crate-specific errors.
///
/// The `#[from]` attribute on each variant lets `?` convert sub-crate
/// errors automatically. Every variant's `Display` is the text a client
/// sees in an `error` event.
#[derive(Debug, thiserror::Error)]
pub enum TyperaceError {
    /// A transport-level error (bind, accept, send, recv).
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// A protocol-level error (encode, decode, invalid message).
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// A session-level error (already joined, not joined).
    #[error(transparent)]
    Session(#[from] SessionError),

    /// A room-level error (duplicate nickname, unauthorized, bad state).
    #[error(transparent)]
    Room(#[from] RoomError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
