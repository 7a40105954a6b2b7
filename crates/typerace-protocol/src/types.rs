//! Core protocol types: identities, roles, lifecycle state, and the
//! read-only views of a room that clients render.
//!
//! These are the nouns of the wire format. They are produced by the room
//! engine and serialized as-is, so the JSON shape of each type is part of
//! the client contract (see the tests at the bottom of this file).

use std::fmt;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Identity types
// ---------------------------------------------------------------------------

/// The key of a room.
///
/// Clients pick room names themselves (or get the server's default room),
/// so this wraps a `String` rather than a generated number.
/// `#[serde(transparent)]` keeps it a plain JSON string on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoomId(pub String);

impl RoomId {
    /// Creates a room ID from anything string-like.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the room name.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RoomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "room:{}", self.0)
    }
}

/// Opaque identifier for one transport connection.
///
/// A connection is not a player: it becomes bound to a `(room, nickname)`
/// pair only after a successful `join_game`. Never sent on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConnectionId(u64);

impl ConnectionId {
    /// Creates a new `ConnectionId` from a raw `u64`.
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    /// Returns the underlying `u64` value.
    pub fn into_inner(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "conn-{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Role
// ---------------------------------------------------------------------------

/// What a participant is allowed to do in a room. Fixed at join time.
///
/// - **Player**: races; may send `typing_update`.
/// - **Spectator**: watches; receives every broadcast, may not type.
/// - **Admin**: runs the room; the only role that may start or reset.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    Player,
    Spectator,
    Admin,
}

impl Role {
    /// Returns `true` for the role that may start and reset games.
    pub fn is_privileged(&self) -> bool {
        matches!(self, Self::Admin)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Player => write!(f, "player"),
            Self::Spectator => write!(f, "spectator"),
            Self::Admin => write!(f, "admin"),
        }
    }
}

// ---------------------------------------------------------------------------
// GameState
// ---------------------------------------------------------------------------

/// The lifecycle state of a room's game.
///
/// ```text
///            start_game          first finisher
/// Waiting ─────────────→ Playing ─────────────→ Finished
///    ↑                      │                      │
///    └──────── reset_game ──┴──────────────────────┘
/// ```
///
/// Only one game is ever active per room. `Waiting` is re-enterable into
/// `Playing` directly after a reset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GameState {
    #[default]
    Waiting,
    Playing,
    Finished,
}

impl GameState {
    /// Returns `true` if `start_game` is legal in this state.
    pub fn can_start(&self) -> bool {
        matches!(self, Self::Waiting)
    }

    /// Returns `true` if `reset_game` is legal in this state.
    pub fn can_reset(&self) -> bool {
        matches!(self, Self::Playing | Self::Finished)
    }

    /// Returns `true` while keystroke updates are scored.
    pub fn accepts_input(&self) -> bool {
        matches!(self, Self::Playing)
    }

    /// Returns `true` if moving to `target` is a legal transition.
    pub fn can_transition_to(self, target: Self) -> bool {
        matches!(
            (self, target),
            (Self::Waiting, Self::Playing)
                | (Self::Playing, Self::Finished)
                | (Self::Playing, Self::Waiting)
                | (Self::Finished, Self::Waiting)
        )
    }
}

impl fmt::Display for GameState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Waiting => write!(f, "waiting"),
            Self::Playing => write!(f, "playing"),
            Self::Finished => write!(f, "finished"),
        }
    }
}

// ---------------------------------------------------------------------------
// Views
// ---------------------------------------------------------------------------

/// One mistyped character: where it is, what the sentence wanted there,
/// and what was typed instead.
///
/// Positions count Unicode scalar values, not bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypingError {
    pub position: usize,
    pub expected: char,
    pub actual: char,
}

/// A player's live state as every observer sees it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerView {
    pub nickname: String,
    pub role: Role,
    pub current_input: String,
    pub errors: Vec<TypingError>,
    pub is_finished: bool,
    /// Seconds from game start to the finishing keystroke.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub finish_time: Option<f64>,
    /// Share of the target sentence covered by `current_input`, 0..=100.
    pub progress: u8,
}

/// A full, consistent picture of a room at one instant.
///
/// Built inside the room's serialized event loop, so it is never torn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoomSnapshot {
    pub room_id: RoomId,
    pub state: GameState,
    /// Present only while a game is `playing` or `finished`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_sentence: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub winner: Option<String>,
    /// Participants with the `player` role, in join order.
    pub players: Vec<PlayerView>,
    pub spectator_count: usize,
    pub admin_count: usize,
}
