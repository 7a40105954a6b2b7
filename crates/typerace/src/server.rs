//! `TyperaceServer` builder and server loop.
//!
//! This is the entry point for running a typerace server. It ties
//! together all the layers: transport → protocol → session → room.

use std::sync::Arc;

use tokio::sync::Mutex;
use typerace_protocol::{Codec, JsonCodec, RoomId};
use typerace_room::{BuiltinSentences, RoomConfig, RoomRegistry, SentenceProvider};
use typerace_session::SessionManager;
use typerace_transport::{Transport, WebSocketTransport};

use crate::handler::handle_connection;
use crate::{ServerConfig, TyperaceError};

/// Shared server state passed to each connection handler task.
///
/// The session lock is held for one manager call at a time and never
/// across an await. `RoomRegistry` guards its own map and waits on room
/// actors outside that lock.
pub(crate) struct ServerState<C: Codec> {
    pub(crate) sessions: Mutex<SessionManager>,
    pub(crate) rooms: RoomRegistry,
    pub(crate) codec: C,
    pub(crate) default_room: RoomId,
}

/// Builder for configuring and starting a typerace server.
///
/// # Example
///
/// ```rust,no_run
/// use typerace::prelude::*;
///
/// # async fn run() -> Result<(), TyperaceError> {
/// let server = TyperaceServer::builder()
///     .bind("0.0.0.0:8080")
///     .default_room("lobby")
///     .build()
///     .await?;
/// server.run().await
/// # }
/// ```
pub struct TyperaceServerBuilder {
    config: ServerConfig,
    sentences: Arc<dyn SentenceProvider>,
}

impl TyperaceServerBuilder {
    /// Creates a builder with default settings and the bundled sentences.
    pub fn new() -> Self {
        Self {
            config: ServerConfig::default(),
            sentences: Arc::new(BuiltinSentences),
        }
    }

    /// Replaces every setting at once, e.g. with a config built from
    /// [`ServerArgs`](crate::ServerArgs).
    pub fn config(mut self, config: ServerConfig) -> Self {
        self.config = config;
        self
    }

    /// Sets the address to bind the server to.
    pub fn bind(mut self, addr: &str) -> Self {
        self.config.bind_addr = addr.to_string();
        self
    }

    /// Sets the room used when `join_game` doesn't name one.
    pub fn default_room(mut self, room: &str) -> Self {
        self.config.default_room = room.to_string();
        self
    }

    /// Sets the policy applied to every room.
    pub fn room_config(mut self, config: RoomConfig) -> Self {
        self.config.room = config;
        self
    }

    /// Sets where target sentences come from.
    pub fn sentences(mut self, provider: impl SentenceProvider) -> Self {
        self.sentences = Arc::new(provider);
        self
    }

    /// Binds the listener and returns a server ready to [`run`](TyperaceServer::run).
    ///
    /// Uses `JsonCodec` and `WebSocketTransport`.
    pub async fn build(self) -> Result<TyperaceServer<JsonCodec>, TyperaceError> {
        let transport = WebSocketTransport::bind(&self.config.bind_addr).await?;

        let state = Arc::new(ServerState {
            sessions: Mutex::new(SessionManager::new()),
            rooms: RoomRegistry::new(self.config.room.clone(), self.sentences),
            codec: JsonCodec,
            default_room: RoomId::new(self.config.default_room.clone()),
        });

        Ok(TyperaceServer {
            transport,
            state,
            config: self.config,
        })
    }
}

impl Default for TyperaceServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A typerace server bound to its address.
///
/// Call [`run()`](Self::run) to start accepting connections.
pub struct TyperaceServer<C: Codec> {
    transport: WebSocketTransport,
    state: Arc<ServerState<C>>,
    config: ServerConfig,
}

impl TyperaceServer<JsonCodec> {
    /// Creates a new builder.
    pub fn builder() -> TyperaceServerBuilder {
        TyperaceServerBuilder::new()
    }
}

impl<C: Codec> TyperaceServer<C> {
    /// Returns the local address the server is bound to.
    pub fn local_addr(&self) -> std::io::Result<std::net::SocketAddr> {
        self.transport.local_addr()
    }

    /// The settings the server was built with.
    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Runs the accept loop, spawning one handler task per connection.
    /// Runs until the process is terminated.
    pub async fn run(mut self) -> Result<(), TyperaceError> {
        tracing::info!(
            default_room = %self.state.default_room,
            max_players = self.config.room.max_players,
            "typerace server running"
        );

        loop {
            match self.transport.accept().await {
                Ok(conn) => {
                    let state = Arc::clone(&self.state);
                    tokio::spawn(async move {
                        if let Err(e) = handle_connection(conn, state).await {
                            tracing::debug!(error = %e, "connection ended with error");
                        }
                    });
                }
                Err(e) => {
                    tracing::warn!(error = %e, "accept failed");
                }
            }
        }
    }
}
