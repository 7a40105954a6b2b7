//! Session types: what the server knows about one connection.

use std::time::Instant;

use typerace_protocol::{ConnectionId, Role, RoomId};

/// The identity a connection took on when it joined a room.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Binding {
    pub room_id: RoomId,
    pub nickname: String,
    pub role: Role,
}

/// Where a connection is in its lifecycle.
///
/// ```text
///   Connected ──(join_game ok)──→ Joined ──(close)──→ removed
///       │                                               ↑
///       └───────────────────(close)─────────────────────┘
/// ```
///
/// There is no way back from `Joined` to `Connected`:
/// leaving a room means closing the connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    /// Accepted, not yet in a room.
    Connected,

    /// Bound to a room under a nickname.
    Joined(Binding),
}

/// One open connection.
#[derive(Debug, Clone)]
pub struct Session {
    pub conn_id: ConnectionId,
    pub state: SessionState,
    pub opened_at: Instant,
}

impl Session {
    /// Returns the binding if the connection has joined a room.
    pub fn binding(&self) -> Option<&Binding> {
        match &self.state {
            SessionState::Joined(binding) => Some(binding),
            SessionState::Connected => None,
        }
    }
}
