//! Transport abstraction layer for typerace.
//!
//! The room engine only needs three things from the network: a stream of
//! new connections, a way to read frames from each, and a way to write
//! frames to each. [`Transport`] and [`Connection`] describe that; the
//! WebSocket implementation provides it.
//!
//! A connection is always [`split`](Connection::split) into a sender and a
//! receiver half so the reader loop and the writer task never contend for
//! the same lock.
//!
//! # Feature Flags
//!
//! - `websocket` (default): WebSocket transport via `tokio-tungstenite`

#![allow(async_fn_in_trait)]

mod error;
#[cfg(feature = "websocket")]
mod websocket;

use std::net::SocketAddr;

pub use error::TransportError;
pub use typerace_protocol::ConnectionId;
#[cfg(feature = "websocket")]
pub use websocket::{
    WebSocketConnection, WebSocketReceiver, WebSocketSender, WebSocketTransport,
};

/// Accepts new incoming connections.
pub trait Transport: Send + Sync + 'static {
    /// The connection type produced by this transport.
    type Connection: Connection;
    /// The error type for transport operations.
    type Error: std::error::Error + Send + Sync;

    /// Waits for and accepts the next incoming connection.
    async fn accept(&mut self) -> Result<Self::Connection, Self::Error>;

    /// Returns the address the transport is listening on.
    fn local_addr(&self) -> std::io::Result<SocketAddr>;
}

/// A freshly accepted connection, before it is split.
pub trait Connection: Send + 'static {
    /// The half that writes frames.
    type Sender: Send + 'static;
    /// The half that reads frames.
    type Receiver: Send + 'static;

    /// Returns the unique identifier for this connection.
    fn id(&self) -> ConnectionId;

    /// Splits the connection into independently owned halves.
    fn split(self) -> (Self::Sender, Self::Receiver);
}
