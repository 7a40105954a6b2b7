//! Room engine for typerace.
//!
//! Each room runs as an isolated Tokio task (actor model) that owns the
//! room's members, its game lifecycle and its broadcast fan-out. All
//! mutations of one room are serialized through the actor's queue;
//! different rooms run in parallel and share nothing.
//!
//! # Key types
//!
//! - [`RoomRegistry`]: creates rooms on first join, routes members
//! - [`RoomHandle`]: send commands to a running room actor
//! - [`GameRoom`]: the pure state machine the actor drives
//! - [`PlayerRegistry`]: members and their per-game fields
//! - [`Broadcaster`]: per-room sequence numbers and subscriber queues
//! - [`SentenceProvider`]: where target sentences come from
//! - [`progress`]: per-character scoring of typed input

mod broadcast;
mod config;
mod error;
mod game;
mod manager;
pub mod progress;
mod registry;
mod room;
mod sentence;

pub use broadcast::{Broadcaster, Subscriber};
pub use config::RoomConfig;
pub use error::RoomError;
pub use game::GameRoom;
pub use manager::RoomRegistry;
pub use registry::{ActiveGame, InputOutcome, Player, PlayerRegistry};
pub use room::{RoomAction, RoomHandle};
pub use sentence::{BuiltinSentences, FixedSentence, SentenceProvider};
