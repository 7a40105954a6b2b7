//! WebSocket transport implementation using `tokio-tungstenite`.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};

use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use tokio::net::{TcpListener, TcpStream};
use tokio_tungstenite::WebSocketStream;
use tokio_tungstenite::tungstenite::Message;

use crate::{Connection, ConnectionId, Transport, TransportError};

/// Counter for generating unique connection IDs.
static NEXT_CONNECTION_ID: AtomicU64 = AtomicU64::new(1);

type WsStream = WebSocketStream<TcpStream>;

/// A WebSocket-based [`Transport`] that listens for incoming connections.
pub struct WebSocketTransport {
    listener: TcpListener,
}

impl WebSocketTransport {
    /// Binds a new WebSocket transport to the given address.
    pub async fn bind(addr: &str) -> Result<Self, TransportError> {
        let listener = TcpListener::bind(addr)
            .await
            .map_err(TransportError::BindFailed)?;
        tracing::info!(addr, "WebSocket transport listening");
        Ok(Self { listener })
    }
}

impl Transport for WebSocketTransport {
    type Connection = WebSocketConnection;
    type Error = TransportError;

    async fn accept(&mut self) -> Result<Self::Connection, Self::Error> {
        let (stream, addr) = self
            .listener
            .accept()
            .await
            .map_err(TransportError::AcceptFailed)?;

        let ws = tokio_tungstenite::accept_async(stream)
            .await
            .map_err(|e| TransportError::HandshakeFailed(e.to_string()))?;

        let id = ConnectionId::new(NEXT_CONNECTION_ID.fetch_add(1, Ordering::Relaxed));
        tracing::debug!(conn_id = %id, %addr, "accepted WebSocket connection");

        Ok(WebSocketConnection { id, ws })
    }

    fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }
}

/// A single upgraded WebSocket connection.
pub struct WebSocketConnection {
    id: ConnectionId,
    ws: WsStream,
}

impl Connection for WebSocketConnection {
    type Sender = WebSocketSender;
    type Receiver = WebSocketReceiver;

    fn id(&self) -> ConnectionId {
        self.id
    }

    fn split(self) -> (WebSocketSender, WebSocketReceiver) {
        let (sink, stream) = self.ws.split();
        (
            WebSocketSender { id: self.id, sink },
            WebSocketReceiver {
                id: self.id,
                stream,
            },
        )
    }
}

/// The writing half of a WebSocket connection.
pub struct WebSocketSender {
    id: ConnectionId,
    sink: SplitSink<WsStream, Message>,
}

impl WebSocketSender {
    /// Returns the connection this half belongs to.
    pub fn id(&self) -> ConnectionId {
        self.id
    }

    /// Writes one frame. UTF-8 payloads (every JSON event) go out as text
    /// frames, anything else as binary.
    pub async fn send(&mut self, data: Vec<u8>) -> Result<(), TransportError> {
        let msg = match String::from_utf8(data) {
            Ok(text) => Message::text(text),
            Err(e) => Message::binary(e.into_bytes()),
        };
        self.sink
            .send(msg)
            .await
            .map_err(|e| TransportError::SendFailed(e.to_string()))
    }

    /// Sends a close frame and flushes the sink.
    pub async fn close(&mut self) -> Result<(), TransportError> {
        self.sink
            .close()
            .await
            .map_err(|e| TransportError::SendFailed(e.to_string()))
    }
}

/// The reading half of a WebSocket connection.
pub struct WebSocketReceiver {
    id: ConnectionId,
    stream: SplitStream<WsStream>,
}

impl WebSocketReceiver {
    /// Returns the connection this half belongs to.
    pub fn id(&self) -> ConnectionId {
        self.id
    }

    /// Receives the next data frame.
    ///
    /// Returns `Ok(None)` when the peer closes cleanly. Ping/pong frames
    /// are answered by tungstenite and skipped here.
    pub async fn recv(&mut self) -> Result<Option<Vec<u8>>, TransportError> {
        loop {
            match self.stream.next().await {
                Some(Ok(Message::Text(text))) => {
                    return Ok(Some(text.as_bytes().to_vec()));
                }
                Some(Ok(Message::Binary(data))) => return Ok(Some(data.to_vec())),
                Some(Ok(Message::Close(_))) | None => return Ok(None),
                Some(Ok(_)) => continue,
                Some(Err(e)) => {
                    return Err(TransportError::ReceiveFailed(e.to_string()));
                }
            }
        }
    }
}
