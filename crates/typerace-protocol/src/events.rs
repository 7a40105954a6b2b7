//! Inbound and outbound events.
//!
//! Both directions are closed sets of tagged variants. serde rejects any
//! frame whose `event` name or `data` shape doesn't match a variant, which
//! is how malformed input is stopped at the boundary instead of inside a
//! room.
//!
//! `#[serde(tag = "event", content = "data")]` gives the "adjacently
//! tagged" JSON shape browser clients already use for socket events:
//!
//! ```text
//! { "event": "typing_update", "data": { "text": "The qu" } }
//! ```
//!
//! Inbound, `data` may be missing or `null` for events that carry nothing
//! (`{ "event": "reset_game" }`), since socket clients emit those bare.

use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};

use crate::{PlayerView, ProtocolError, Role, RoomSnapshot};

// ---------------------------------------------------------------------------
// ClientEvent: client → server
// ---------------------------------------------------------------------------

/// Everything a client may ask the server to do.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum ClientEvent {
    /// Join a room under a nickname. `room` falls back to the server's
    /// default room; `role` falls back to `player`.
    JoinGame {
        nickname: String,
        role: Role,
        #[serde(skip_serializing_if = "Option::is_none")]
        room: Option<String>,
    },

    /// The full text the player has typed so far (not a diff).
    TypingUpdate { text: String },

    /// Admin only. `language` falls back to the room's default.
    StartGame {
        #[serde(skip_serializing_if = "Option::is_none")]
        language: Option<String>,
    },

    /// Admin only.
    ResetGame {},

    /// Ask for a fresh snapshot of the joined room.
    GetRoomInfo {},
}

/// Event names a client may send.
#[derive(Deserialize)]
#[serde(rename_all = "snake_case")]
enum ClientEventName {
    JoinGame,
    TypingUpdate,
    StartGame,
    ResetGame,
    GetRoomInfo,
}

/// Every field any inbound event can carry. Which ones are required
/// depends on the event name.
#[derive(Default, Deserialize)]
struct ClientData {
    nickname: Option<String>,
    role: Option<Role>,
    room: Option<String>,
    text: Option<String>,
    language: Option<String>,
}

/// The inbound frame before the event name picks a variant.
#[derive(Deserialize)]
struct ClientFrame {
    event: ClientEventName,
    #[serde(default)]
    data: Option<ClientData>,
}

impl<'de> Deserialize<'de> for ClientEvent {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let ClientFrame { event, data } = ClientFrame::deserialize(deserializer)?;
        let data = data.unwrap_or_default();

        Ok(match event {
            ClientEventName::JoinGame => Self::JoinGame {
                nickname: data
                    .nickname
                    .ok_or_else(|| <D::Error as de::Error>::missing_field("nickname"))?,
                role: data.role.unwrap_or_default(),
                room: data.room,
            },
            ClientEventName::TypingUpdate => Self::TypingUpdate {
                text: data
                    .text
                    .ok_or_else(|| <D::Error as de::Error>::missing_field("text"))?,
            },
            ClientEventName::StartGame => Self::StartGame {
                language: data.language,
            },
            ClientEventName::ResetGame => Self::ResetGame {},
            ClientEventName::GetRoomInfo => Self::GetRoomInfo {},
        })
    }
}

impl ClientEvent {
    /// Applies the boundary rules serde can't express and normalizes the
    /// event: nicknames and room names are trimmed and must not be blank.
    ///
    /// # Errors
    /// Returns [`ProtocolError::InvalidMessage`] for a blank nickname or
    /// a blank explicit room name.
    pub fn validated(self) -> Result<Self, ProtocolError> {
        match self {
            Self::JoinGame {
                nickname,
                role,
                room,
            } => {
                let nickname = nickname.trim();
                if nickname.is_empty() {
                    return Err(ProtocolError::InvalidMessage(
                        "nickname must not be empty".into(),
                    ));
                }
                let room = match room {
                    Some(room) if room.trim().is_empty() => {
                        return Err(ProtocolError::InvalidMessage(
                            "room must not be empty".into(),
                        ));
                    }
                    Some(room) => Some(room.trim().to_string()),
                    None => None,
                };
                Ok(Self::JoinGame {
                    nickname: nickname.to_string(),
                    role,
                    room,
                })
            }
            other => Ok(other),
        }
    }

    /// The wire name of this event, for logging.
    pub fn name(&self) -> &'static str {
        match self {
            Self::JoinGame { .. } => "join_game",
            Self::TypingUpdate { .. } => "typing_update",
            Self::StartGame { .. } => "start_game",
            Self::ResetGame {} => "reset_game",
            Self::GetRoomInfo {} => "get_room_info",
        }
    }
}

// ---------------------------------------------------------------------------
// ServerEvent: server → client(s)
// ---------------------------------------------------------------------------

/// Everything the server may tell a client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum ServerEvent {
    /// Unicast to a connection whose join succeeded.
    Joined {
        nickname: String,
        role: Role,
        room_info: RoomSnapshot,
    },

    /// Broadcast whenever membership changes.
    RoomUpdate { players: Vec<PlayerView> },

    /// Broadcast after the `room_update` of a successful join.
    PlayerJoined { nickname: String, role: Role },

    /// Unicast reply to `get_room_info`.
    RoomInfo { room_info: RoomSnapshot },

    /// Broadcast when an admin starts a game.
    GameStarted {
        sentence: String,
        room_info: RoomSnapshot,
    },

    /// Broadcast after every accepted keystroke update, with the full
    /// player list.
    TypingBroadcast { players: Vec<PlayerView> },

    /// Broadcast exactly once per game, replacing the `typing_broadcast`
    /// of the winning update.
    GameOver {
        winner: String,
        finish_time: f64,
        room_info: RoomSnapshot,
    },

    /// Broadcast when an admin resets the room.
    GameReset { room_info: RoomSnapshot },

    /// Unicast to the initiating connection only. Never broadcast.
    Error { message: String },
}

impl ServerEvent {
    /// The wire name of this event, for logging.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Joined { .. } => "joined",
            Self::RoomUpdate { .. } => "room_update",
            Self::PlayerJoined { .. } => "player_joined",
            Self::RoomInfo { .. } => "room_info",
            Self::GameStarted { .. } => "game_started",
            Self::TypingBroadcast { .. } => "typing_broadcast",
            Self::GameOver { .. } => "game_over",
            Self::GameReset { .. } => "game_reset",
            Self::Error { .. } => "error",
        }
    }
}

// ---------------------------------------------------------------------------
// Envelope
// ---------------------------------------------------------------------------

/// The outbound wrapper around every [`ServerEvent`].
///
/// `seq` is assigned by the issuing room and increases by one for every
/// event that room emits, broadcast or unicast. All subscribers of a room
/// therefore observe the same relative order, and a client can spot a
/// gap. Errors raised before a connection reaches any room carry `seq 0`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    pub seq: u64,
    pub payload: ServerEvent,
}
