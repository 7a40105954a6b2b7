//! Wire protocol for typerace.
//!
//! This crate defines everything that crosses the socket between a
//! browser client and the room engine:
//!
//! - **Types** ([`RoomSnapshot`], [`PlayerView`], [`GameState`], etc.):
//!   the read-only views of a room that clients render.
//! - **Events** ([`ClientEvent`], [`ServerEvent`], [`Envelope`]): the
//!   closed set of things a client may ask for and the server may say.
//! - **Codec** ([`Codec`] trait, [`JsonCodec`]): how events become
//!   bytes and back.
//! - **Errors** ([`ProtocolError`]): what can go wrong at that boundary.
//!
//! # Architecture
//!
//! The protocol layer knows nothing about sockets or rooms. It only
//! describes shapes, so a malformed frame is rejected here, before any
//! room state is touched.
//!
//! ```text
//! Transport (frames) → Protocol (ClientEvent) → Session → Room actor
//! Room actor → Protocol (Envelope<ServerEvent>) → Transport (frames)
//! ```

mod codec;
mod error;
mod events;
mod types;

pub use codec::Codec;
#[cfg(feature = "json")]
pub use codec::JsonCodec;
pub use error::ProtocolError;
pub use events::{ClientEvent, Envelope, ServerEvent};
pub use types::{
    ConnectionId, GameState, PlayerView, Role, RoomId, RoomSnapshot,
    TypingError,
};
