//! Connection session management for typerace.
//!
//! A transport connection is anonymous until it joins a room. This crate
//! records that binding, and only that:
//!
//! 1. **open**: the connection was accepted
//! 2. **bind**: `join_game` succeeded; the connection now *is*
//!    `(room, nickname)` for the rest of its life
//! 3. **close**: the transport went away; the caller gets the binding
//!    back so it can run the room's disconnect path
//!
//! # How it fits in the stack
//!
//! ```text
//! Server handler (above)  ← asks "who is this connection?"
//!     ↕
//! Session Layer (this crate)  ← ConnectionId → (RoomId, nickname, role)
//!     ↕
//! Protocol Layer (below)  ← provides ConnectionId, RoomId, Role
//! ```

mod error;
mod manager;
mod session;

pub use error::SessionError;
pub use manager::SessionManager;
pub use session::{Binding, Session, SessionState};
