//! Room actor: an isolated Tokio task that owns one [`GameRoom`].
//!
//! Each room runs in its own task and is reached only through an mpsc
//! channel, so every join, keystroke, start and reset for a room is
//! handled one at a time, in arrival order. The event a command produces
//! is handed to the room's [`Broadcaster`] before the next command is
//! read, which gives all subscribers the same total order.

use std::ops::ControlFlow;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, oneshot};
use tokio::time::{self, Instant};
use typerace_protocol::{ConnectionId, Role, RoomId, RoomSnapshot, ServerEvent};

use crate::{Broadcaster, GameRoom, RoomConfig, RoomError, SentenceProvider, Subscriber};

/// A request from a joined member.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoomAction {
    /// The full text typed so far.
    Typing { text: String },
    /// Admin only.
    Start { language: Option<String> },
    /// Admin only.
    Reset,
    /// Unicast a fresh snapshot back to the member.
    Info,
}

impl RoomAction {
    fn name(&self) -> &'static str {
        match self {
            Self::Typing { .. } => "typing",
            Self::Start { .. } => "start",
            Self::Reset => "reset",
            Self::Info => "info",
        }
    }
}

/// Commands sent to a room actor through its channel.
///
/// Variants carrying a `oneshot::Sender` expect a reply; the rest are
/// fire-and-forget and report failures to the member as an `error` event.
pub(crate) enum RoomCommand {
    Join {
        conn_id: ConnectionId,
        nickname: String,
        role: Role,
        subscriber: Subscriber,
        reply: oneshot::Sender<Result<(), RoomError>>,
    },

    /// Replies with the number of members left.
    Leave {
        conn_id: ConnectionId,
        nickname: String,
        reply: oneshot::Sender<usize>,
    },

    Action {
        conn_id: ConnectionId,
        nickname: String,
        action: RoomAction,
    },

    Snapshot {
        reply: oneshot::Sender<RoomSnapshot>,
    },

    Shutdown,
}

/// Handle to a running room actor.
///
/// Cheap to clone: it's an `mpsc::Sender` wrapper. The registry keeps one
/// per room and connection handlers cache a clone after joining.
#[derive(Debug, Clone)]
pub struct RoomHandle {
    room_id: RoomId,
    sender: mpsc::Sender<RoomCommand>,
}

impl RoomHandle {
    pub fn room_id(&self) -> &RoomId {
        &self.room_id
    }

    /// Returns `true` once the actor has stopped.
    pub fn is_closed(&self) -> bool {
        self.sender.is_closed()
    }

    /// Returns `true` if both handles reach the same actor.
    pub fn same_room(&self, other: &RoomHandle) -> bool {
        self.sender.same_channel(&other.sender)
    }

    fn unavailable(&self) -> RoomError {
        RoomError::Unavailable(self.room_id.clone())
    }

    /// Adds a member. On success the member's `subscriber` receives
    /// `joined`, then the whole room receives `room_update` followed by
    /// `player_joined`.
    pub async fn join(
        &self,
        conn_id: ConnectionId,
        nickname: String,
        role: Role,
        subscriber: Subscriber,
    ) -> Result<(), RoomError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.sender
            .send(RoomCommand::Join {
                conn_id,
                nickname,
                role,
                subscriber,
                reply: reply_tx,
            })
            .await
            .map_err(|_| self.unavailable())?;
        reply_rx.await.map_err(|_| self.unavailable())?
    }

    /// Removes a member and returns how many are left.
    pub async fn leave(&self, conn_id: ConnectionId, nickname: String) -> Result<usize, RoomError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.sender
            .send(RoomCommand::Leave {
                conn_id,
                nickname,
                reply: reply_tx,
            })
            .await
            .map_err(|_| self.unavailable())?;
        reply_rx.await.map_err(|_| self.unavailable())
    }

    /// Queues a member's request (fire-and-forget).
    pub async fn act(
        &self,
        conn_id: ConnectionId,
        nickname: String,
        action: RoomAction,
    ) -> Result<(), RoomError> {
        self.sender
            .send(RoomCommand::Action {
                conn_id,
                nickname,
                action,
            })
            .await
            .map_err(|_| self.unavailable())
    }

    /// Requests a snapshot of the room.
    pub async fn snapshot(&self) -> Result<RoomSnapshot, RoomError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.sender
            .send(RoomCommand::Snapshot { reply: reply_tx })
            .await
            .map_err(|_| self.unavailable())?;
        reply_rx.await.map_err(|_| self.unavailable())
    }

    /// Tells the room to stop.
    pub async fn shutdown(&self) -> Result<(), RoomError> {
        self.sender
            .send(RoomCommand::Shutdown)
            .await
            .map_err(|_| self.unavailable())
    }
}

struct RoomActor {
    room: GameRoom,
    hub: Broadcaster,
    sentences: Arc<dyn SentenceProvider>,
    empty_room_ttl: Duration,
    /// Set while the room is empty and waiting to be evicted.
    evict_at: Option<Instant>,
    receiver: mpsc::Receiver<RoomCommand>,
}

impl RoomActor {
    async fn run(mut self) {
        let room_id = self.room.room_id().clone();
        tracing::info!(%room_id, "room actor started");

        loop {
            let cmd = match self.evict_at {
                Some(deadline) => tokio::select! {
                    cmd = self.receiver.recv() => cmd,
                    () = time::sleep_until(deadline) => {
                        tracing::info!(%room_id, "empty room expired");
                        break;
                    }
                },
                None => self.receiver.recv().await,
            };
            let Some(cmd) = cmd else { break };
            if self.handle(cmd).is_break() {
                break;
            }
        }

        tracing::info!(%room_id, "room actor stopped");
    }

    fn handle(&mut self, cmd: RoomCommand) -> ControlFlow<()> {
        match cmd {
            RoomCommand::Join {
                conn_id,
                nickname,
                role,
                subscriber,
                reply,
            } => {
                let result = self.handle_join(conn_id, nickname, role, subscriber);
                let failed = result.is_err();
                let _ = reply.send(result);
                if failed {
                    return self.evict_if_empty();
                }
            }
            RoomCommand::Leave {
                conn_id,
                nickname,
                reply,
            } => {
                self.handle_leave(conn_id, &nickname);
                let _ = reply.send(self.room.member_count());
                return self.evict_if_empty();
            }
            RoomCommand::Action {
                conn_id,
                nickname,
                action,
            } => self.handle_action(conn_id, &nickname, action),
            RoomCommand::Snapshot { reply } => {
                let _ = reply.send(self.room.snapshot());
            }
            RoomCommand::Shutdown => {
                tracing::info!(room_id = %self.room.room_id(), "room shutting down");
                return ControlFlow::Break(());
            }
        }
        ControlFlow::Continue(())
    }

    fn handle_join(
        &mut self,
        conn_id: ConnectionId,
        nickname: String,
        role: Role,
        subscriber: Subscriber,
    ) -> Result<(), RoomError> {
        let room_info = self.room.join(&nickname, role).inspect_err(|e| {
            tracing::debug!(
                room_id = %self.room.room_id(),
                %conn_id,
                nickname = %nickname,
                error = %e,
                "join rejected"
            );
        })?;

        self.evict_at = None;
        self.hub.subscribe(conn_id, subscriber);
        self.hub.unicast(
            conn_id,
            ServerEvent::Joined {
                nickname: nickname.clone(),
                role,
                room_info,
            },
        );
        self.hub.broadcast(ServerEvent::RoomUpdate {
            players: self.room.players(),
        });
        self.hub.broadcast(ServerEvent::PlayerJoined { nickname, role });
        Ok(())
    }

    fn handle_leave(&mut self, conn_id: ConnectionId, nickname: &str) {
        self.hub.unsubscribe(conn_id);
        if self.room.leave(nickname).is_some() {
            self.hub.broadcast(ServerEvent::RoomUpdate {
                players: self.room.players(),
            });
        }
    }

    fn handle_action(&mut self, conn_id: ConnectionId, nickname: &str, action: RoomAction) {
        let name = action.name();
        let now = Instant::now().into_std();
        let result = match action {
            RoomAction::Typing { text } => self.room.typing(nickname, &text, now),
            RoomAction::Start { language } => self
                .room
                .start(nickname, language.as_deref(), self.sentences.as_ref(), now)
                .map(Some),
            RoomAction::Reset => self.room.reset(nickname).map(Some),
            RoomAction::Info => {
                let room_info = self.room.snapshot();
                self.hub.unicast(conn_id, ServerEvent::RoomInfo { room_info });
                return;
            }
        };

        match result {
            Ok(Some(event)) => {
                self.hub.broadcast(event);
            }
            Ok(None) => {}
            Err(e) => {
                tracing::debug!(
                    room_id = %self.room.room_id(),
                    %conn_id,
                    nickname,
                    action = name,
                    error = %e,
                    "action rejected"
                );
                self.hub.unicast(
                    conn_id,
                    ServerEvent::Error {
                        message: e.to_string(),
                    },
                );
            }
        }
    }

    /// Stops right away when the room is empty and the TTL is zero,
    /// otherwise arms the eviction deadline.
    fn evict_if_empty(&mut self) -> ControlFlow<()> {
        if !self.room.is_empty() || self.evict_at.is_some() {
            return ControlFlow::Continue(());
        }
        if self.empty_room_ttl.is_zero() {
            tracing::info!(room_id = %self.room.room_id(), "room empty, stopping");
            return ControlFlow::Break(());
        }
        self.evict_at = Some(Instant::now() + self.empty_room_ttl);
        tracing::debug!(
            room_id = %self.room.room_id(),
            ttl_secs = self.empty_room_ttl.as_secs_f64(),
            "room empty, eviction scheduled"
        );
        ControlFlow::Continue(())
    }
}

/// Spawns a room actor and returns a handle to it.
pub(crate) fn spawn_room(
    room_id: RoomId,
    config: RoomConfig,
    sentences: Arc<dyn SentenceProvider>,
) -> RoomHandle {
    let (tx, rx) = mpsc::channel(config.channel_size.max(1));
    let empty_room_ttl = config.empty_room_ttl;

    let actor = RoomActor {
        room: GameRoom::new(room_id.clone(), config),
        hub: Broadcaster::new(room_id.clone()),
        sentences,
        empty_room_ttl,
        evict_at: None,
        receiver: rx,
    };
    tokio::spawn(actor.run());

    RoomHandle {
        room_id,
        sender: tx,
    }
}
