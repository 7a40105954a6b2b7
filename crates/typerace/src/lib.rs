//! # typerace
//!
//! A real-time multiplayer typing-race server.
//!
//! Players join a room over WebSocket, an admin starts a game, and every
//! keystroke update is scored and broadcast to the whole room until the
//! first player types the sentence exactly.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use clap::Parser;
//! use typerace::prelude::*;
//!
//! # async fn run() -> Result<(), TyperaceError> {
//! let config = ServerConfig::from(ServerArgs::parse());
//! let server = TyperaceServer::builder().config(config).build().await?;
//! server.run().await
//! # }
//! ```

mod config;
mod error;
mod handler;
pub mod logging;
mod server;

pub use config::{
    ENV_ALLOW_LATE_JOIN, ENV_BIND, ENV_DEFAULT_ROOM, ENV_LANGUAGE, ENV_MAX_PLAYERS,
    ENV_ROOM_TTL_SECS, ServerArgs, ServerConfig,
};
pub use error::TyperaceError;
pub use server::{TyperaceServer, TyperaceServerBuilder};

pub mod prelude {
    pub use crate::logging::init_tracing;
    pub use crate::{ServerArgs, ServerConfig, TyperaceError, TyperaceServer, TyperaceServerBuilder};
    pub use typerace_protocol::{
        ClientEvent, Envelope, GameState, PlayerView, Role, RoomId, RoomSnapshot, ServerEvent,
        TypingError,
    };
    pub use typerace_room::{
        BuiltinSentences, FixedSentence, RoomConfig, RoomError, SentenceProvider,
    };
    pub use typerace_session::SessionError;
}
