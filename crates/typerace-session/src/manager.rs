//! The session manager: tracks every open connection and its binding.
//!
//! # Concurrency note
//!
//! `SessionManager` is a plain `HashMap` behind no lock of its own. The
//! server owns one instance behind a `tokio::sync::Mutex` and only holds
//! that lock for the duration of a single call; room work never happens
//! under it.

use std::collections::HashMap;
use std::time::Instant;

use typerace_protocol::ConnectionId;

use crate::{Binding, Session, SessionError, SessionState};

/// Maps each open connection to its session.
///
/// ## Lifecycle
///
/// ```text
/// open() ──→ [Connected] ──bind()──→ [Joined] ──close()──→ binding returned
///                 │                                          to the caller
///                 └──────────────close()──────────────→ None
/// ```
#[derive(Debug, Default)]
pub struct SessionManager {
    sessions: HashMap<ConnectionId, Session>,
}

impl SessionManager {
    /// Creates an empty session manager.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a freshly accepted connection.
    ///
    /// # Errors
    /// Returns [`SessionError::AlreadyOpen`] if the connection is already
    /// registered.
    pub fn open(&mut self, conn_id: ConnectionId) -> Result<(), SessionError> {
        if self.sessions.contains_key(&conn_id) {
            return Err(SessionError::AlreadyOpen(conn_id));
        }
        self.sessions.insert(
            conn_id,
            Session {
                conn_id,
                state: SessionState::Connected,
                opened_at: Instant::now(),
            },
        );
        tracing::debug!(%conn_id, "session opened");
        Ok(())
    }

    /// Checks that the connection may still join a room.
    ///
    /// The handler calls this before asking a room for a slot, so a second
    /// `join_game` never reaches any room.
    ///
    /// # Errors
    /// - [`SessionError::NotFound`]: connection was never opened
    /// - [`SessionError::AlreadyJoined`]: connection is already bound
    pub fn ensure_unbound(&self, conn_id: ConnectionId) -> Result<(), SessionError> {
        let session = self
            .sessions
            .get(&conn_id)
            .ok_or(SessionError::NotFound(conn_id))?;
        match &session.state {
            SessionState::Connected => Ok(()),
            SessionState::Joined(binding) => Err(SessionError::AlreadyJoined {
                room: binding.room_id.as_str().to_string(),
                nickname: binding.nickname.clone(),
            }),
        }
    }

    /// Binds a connection to the room and nickname it just joined as.
    ///
    /// # Errors
    /// Same as [`ensure_unbound`](Self::ensure_unbound).
    pub fn bind(
        &mut self,
        conn_id: ConnectionId,
        binding: Binding,
    ) -> Result<&Binding, SessionError> {
        self.ensure_unbound(conn_id)?;
        let session = self
            .sessions
            .get_mut(&conn_id)
            .ok_or(SessionError::NotFound(conn_id))?;

        tracing::info!(
            %conn_id,
            room_id = %binding.room_id,
            nickname = %binding.nickname,
            role = %binding.role,
            "connection bound"
        );
        session.state = SessionState::Joined(binding);
        session
            .binding()
            .ok_or(SessionError::NotJoined(conn_id))
    }

    /// Returns the binding of a connection, if it has joined a room.
    pub fn binding(&self, conn_id: ConnectionId) -> Option<&Binding> {
        self.sessions.get(&conn_id).and_then(Session::binding)
    }

    /// Like [`binding`](Self::binding) but as an error the handler can
    /// forward to the client.
    ///
    /// # Errors
    /// Returns [`SessionError::NotJoined`] for unbound or unknown
    /// connections.
    pub fn require_binding(&self, conn_id: ConnectionId) -> Result<&Binding, SessionError> {
        self.binding(conn_id).ok_or(SessionError::NotJoined(conn_id))
    }

    /// Forgets a connection. Returns its binding so the caller can remove
    /// the player from the room.
    ///
    /// Closing an unknown connection is a no-op.
    pub fn close(&mut self, conn_id: ConnectionId) -> Option<Binding> {
        let session = self.sessions.remove(&conn_id)?;
        tracing::debug!(
            %conn_id,
            open_for_ms = session.opened_at.elapsed().as_millis() as u64,
            "session closed"
        );
        match session.state {
            SessionState::Joined(binding) => Some(binding),
            SessionState::Connected => None,
        }
    }

    /// Looks up a session by connection.
    pub fn get(&self, conn_id: ConnectionId) -> Option<&Session> {
        self.sessions.get(&conn_id)
    }

    /// Number of open connections, bound or not.
    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    /// Returns `true` if no connection is open.
    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    /// Number of connections that have joined a room.
    pub fn bound_count(&self) -> usize {
        self.sessions
            .values()
            .filter(|s| s.binding().is_some())
            .count()
    }
}
