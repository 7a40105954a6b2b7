//! Per-connection handler: decode, route, and clean up.
//!
//! Each accepted connection gets its own Tokio task running this handler.
//! The flow is:
//!   1. Open a session and split the socket
//!   2. Spawn a writer task that drains the connection's outbound queue
//!   3. Loop: decode each frame into a `ClientEvent` and dispatch it
//!   4. On close, a drop guard removes the member from its room
//!
//! Events reach the socket only through the outbound queue. Rooms push
//! onto it directly; errors raised here, before any room is involved,
//! go out with `seq 0`.

use std::sync::Arc;

use tokio::sync::mpsc;
use typerace_protocol::{ClientEvent, Codec, ConnectionId, Envelope, RoomId, ServerEvent};
use typerace_room::{RoomAction, RoomHandle, Subscriber};
use typerace_session::{Binding, SessionError};
use typerace_transport::{Connection, WebSocketConnection, WebSocketSender};

use crate::TyperaceError;
use crate::server::ServerState;

/// Drop guard that runs the disconnect path when the handler exits.
///
/// This ensures cleanup happens even if the handler panics. Since `Drop`
/// is synchronous, we spawn a fire-and-forget task for the async cleanup.
struct ConnectionGuard<C: Codec> {
    conn_id: ConnectionId,
    state: Arc<ServerState<C>>,
}

impl<C: Codec> Drop for ConnectionGuard<C> {
    fn drop(&mut self) {
        let conn_id = self.conn_id;
        let state = Arc::clone(&self.state);
        tokio::spawn(async move { disconnect(&state, conn_id).await });
    }
}

/// Closes the session and, if the connection had joined, removes the
/// member from its room.
async fn disconnect<C: Codec>(state: &ServerState<C>, conn_id: ConnectionId) {
    let binding = state.sessions.lock().await.close(conn_id);
    let Some(Binding {
        room_id, nickname, ..
    }) = binding
    else {
        return;
    };

    let result = state.rooms.leave(&room_id, conn_id, &nickname).await;
    match result {
        Ok(remaining) => {
            tracing::info!(%conn_id, %room_id, %nickname, remaining, "member disconnected");
        }
        Err(e) => {
            tracing::warn!(%conn_id, %room_id, %nickname, error = %e, "leave failed");
        }
    }
}

/// The room a connection joined, cached so keystrokes skip the registry.
struct JoinedRoom {
    nickname: String,
    handle: RoomHandle,
}

/// Handles a single connection from accept to close.
pub(crate) async fn handle_connection<C: Codec>(
    conn: WebSocketConnection,
    state: Arc<ServerState<C>>,
) -> Result<(), TyperaceError> {
    let conn_id = conn.id();
    state.sessions.lock().await.open(conn_id)?;
    let _guard = ConnectionGuard {
        conn_id,
        state: Arc::clone(&state),
    };
    tracing::debug!(%conn_id, "connection opened");

    let (sender, mut receiver) = conn.split();
    let (outbox, outbox_rx) = mpsc::unbounded_channel();
    tokio::spawn(write_loop(sender, outbox_rx, Arc::clone(&state)));

    let mut joined: Option<JoinedRoom> = None;

    loop {
        let data = match receiver.recv().await {
            Ok(Some(data)) => data,
            Ok(None) => {
                tracing::info!(%conn_id, "connection closed cleanly");
                break;
            }
            Err(e) => {
                tracing::debug!(%conn_id, error = %e, "recv error");
                break;
            }
        };

        let event = match state
            .codec
            .decode::<ClientEvent>(&data)
            .and_then(ClientEvent::validated)
        {
            Ok(event) => event,
            Err(e) => {
                tracing::debug!(%conn_id, error = %e, "rejected inbound frame");
                send_error(&outbox, &e);
                continue;
            }
        };

        let name = event.name();
        if let Err(e) = dispatch(&state, conn_id, &outbox, &mut joined, event).await {
            tracing::debug!(%conn_id, event = name, error = %e, "event rejected");
            send_error(&outbox, &e);
        }
    }

    // _guard drops here → disconnect path runs. The writer task ends once
    // the room drops its copy of the outbox.
    Ok(())
}

/// Routes one decoded event. Room-level failures of queued actions are
/// reported by the room itself; errors returned here are sent by the
/// caller with `seq 0`.
async fn dispatch<C: Codec>(
    state: &ServerState<C>,
    conn_id: ConnectionId,
    outbox: &Subscriber,
    joined: &mut Option<JoinedRoom>,
    event: ClientEvent,
) -> Result<(), TyperaceError> {
    let action = match event {
        ClientEvent::JoinGame {
            nickname,
            role,
            room,
        } => {
            state.sessions.lock().await.ensure_unbound(conn_id)?;
            let room_id = room.map_or_else(|| state.default_room.clone(), RoomId::new);

            let handle = state
                .rooms
                .join(&room_id, conn_id, &nickname, role, outbox.clone())
                .await?;
            state.sessions.lock().await.bind(
                conn_id,
                Binding {
                    room_id,
                    nickname: nickname.clone(),
                    role,
                },
            )?;
            *joined = Some(JoinedRoom { nickname, handle });
            return Ok(());
        }
        ClientEvent::TypingUpdate { text } => RoomAction::Typing { text },
        ClientEvent::StartGame { language } => RoomAction::Start { language },
        ClientEvent::ResetGame {} => RoomAction::Reset,
        ClientEvent::GetRoomInfo {} => RoomAction::Info,
    };

    let room = joined.as_ref().ok_or(SessionError::NotJoined(conn_id))?;
    room.handle
        .act(conn_id, room.nickname.clone(), action)
        .await?;
    Ok(())
}

/// Drains the outbound queue into the socket until either side closes.
async fn write_loop<C: Codec>(
    mut sender: WebSocketSender,
    mut outbox: mpsc::UnboundedReceiver<Arc<Envelope>>,
    state: Arc<ServerState<C>>,
) {
    let conn_id = sender.id();
    while let Some(envelope) = outbox.recv().await {
        let bytes = match state.codec.encode(envelope.as_ref()) {
            Ok(bytes) => bytes,
            Err(e) => {
                tracing::warn!(%conn_id, seq = envelope.seq, error = %e, "failed to encode event");
                continue;
            }
        };
        if let Err(e) = sender.send(bytes).await {
            tracing::debug!(%conn_id, error = %e, "send failed, stopping writer");
            return;
        }
    }
    let _ = sender.close().await;
}

/// Queues an `error` event that didn't come from a room.
fn send_error(outbox: &Subscriber, error: &dyn std::fmt::Display) {
    let envelope = Envelope {
        seq: 0,
        payload: ServerEvent::Error {
            message: error.to_string(),
        },
    };
    let _ = outbox.send(Arc::new(envelope));
}
