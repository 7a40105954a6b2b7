//! Integration tests for the WebSocket transport.
//!
//! These spin up a real listener on an OS-assigned port and talk to it
//! with a plain `tokio-tungstenite` client.

#[cfg(feature = "websocket")]
mod websocket {
    use futures_util::{SinkExt, StreamExt};
    use tokio_tungstenite::tungstenite::Message;
    use typerace_transport::{Connection, Transport, WebSocketTransport};

    type ClientWs = tokio_tungstenite::WebSocketStream<
        tokio_tungstenite::MaybeTlsStream<tokio::net::TcpStream>,
    >;

    async fn connect_client(addr: std::net::SocketAddr) -> ClientWs {
        let (ws, _) = tokio_tungstenite::connect_async(format!("ws://{addr}"))
            .await
            .expect("client should connect");
        ws
    }

    #[tokio::test]
    async fn test_websocket_split_halves_send_and_receive() {
        let mut transport = WebSocketTransport::bind("127.0.0.1:0")
            .await
            .expect("should bind");
        let addr = transport.local_addr().expect("bound address");

        let server = tokio::spawn(async move { transport.accept().await.expect("should accept") });
        let mut client = connect_client(addr).await;
        let conn = server.await.expect("task should complete");

        let id = conn.id();
        assert!(id.into_inner() > 0);

        let (mut sender, mut receiver) = conn.split();
        assert_eq!(sender.id(), id);
        assert_eq!(receiver.id(), id);

        // JSON goes out as a text frame.
        sender
            .send(br#"{"event":"error"}"#.to_vec())
            .await
            .expect("send should succeed");
        let msg = client.next().await.unwrap().unwrap();
        assert!(msg.is_text());
        assert_eq!(msg.into_text().unwrap().as_str(), r#"{"event":"error"}"#);

        // Both text and binary frames are accepted inbound.
        client.send(Message::text("hello")).await.unwrap();
        client
            .send(Message::binary(b"bytes".to_vec()))
            .await
            .unwrap();
        assert_eq!(receiver.recv().await.unwrap().unwrap(), b"hello");
        assert_eq!(receiver.recv().await.unwrap().unwrap(), b"bytes");

        sender.close().await.expect("close should succeed");
    }

    #[tokio::test]
    async fn test_websocket_non_utf8_goes_out_as_binary() {
        let mut transport = WebSocketTransport::bind("127.0.0.1:0").await.unwrap();
        let addr = transport.local_addr().unwrap();

        let server = tokio::spawn(async move { transport.accept().await.unwrap() });
        let mut client = connect_client(addr).await;
        let (mut sender, _receiver) = server.await.unwrap().split();

        sender.send(vec![0xff, 0xfe]).await.unwrap();
        let msg = client.next().await.unwrap().unwrap();
        assert!(msg.is_binary());
        assert_eq!(msg.into_data().as_ref(), &[0xffu8, 0xfe]);
    }

    #[tokio::test]
    async fn test_websocket_recv_returns_none_on_client_close() {
        let mut transport = WebSocketTransport::bind("127.0.0.1:0").await.unwrap();
        let addr = transport.local_addr().unwrap();

        let server = tokio::spawn(async move { transport.accept().await.unwrap() });
        let mut client = connect_client(addr).await;
        let (_sender, mut receiver) = server.await.unwrap().split();

        client.send(Message::Close(None)).await.unwrap();

        let result = receiver.recv().await.expect("recv should not error");
        assert!(result.is_none(), "should return None on client close");
    }

    #[tokio::test]
    async fn test_websocket_connection_ids_are_unique() {
        let mut transport = WebSocketTransport::bind("127.0.0.1:0").await.unwrap();
        let addr = transport.local_addr().unwrap();

        let server = tokio::spawn(async move {
            let a = transport.accept().await.unwrap();
            let b = transport.accept().await.unwrap();
            (a.id(), b.id())
        });
        let _c1 = connect_client(addr).await;
        let _c2 = connect_client(addr).await;

        let (a, b) = server.await.unwrap();
        assert_ne!(a, b);
    }
}
