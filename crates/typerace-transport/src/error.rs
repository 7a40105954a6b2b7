/// Errors that can occur in the transport layer.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// Binding the listening socket failed.
    #[error("bind failed: {0}")]
    BindFailed(#[source] std::io::Error),

    /// Accepting a TCP connection failed.
    #[error("accept failed: {0}")]
    AcceptFailed(#[source] std::io::Error),

    /// The TCP connection was accepted but the WebSocket upgrade failed.
    #[error("websocket handshake failed: {0}")]
    HandshakeFailed(String),

    /// Writing a frame failed. The peer is most likely gone.
    #[error("send failed: {0}")]
    SendFailed(String),

    /// Reading a frame failed (reset, protocol violation).
    #[error("receive failed: {0}")]
    ReceiveFailed(String),
}
