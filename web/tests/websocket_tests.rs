//! End-to-end tests of `/ws/greetings` over a real socket.

#![allow(clippy::unwrap_used)] // Tests can unwrap
#![allow(clippy::expect_used)] // Tests can expect

use futures::{SinkExt, StreamExt};
use reservation_core::{GreetingService, SystemClock};
use reservation_testing::InMemoryReservationRepository;
use reservation_web::{AppState, build_router};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::{TcpListener, TcpStream};
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Spawns the router on an ephemeral port with a fast greeting interval.
async fn spawn_server() -> SocketAddr {
    let state = AppState::new(
        Arc::new(InMemoryReservationRepository::new()),
        GreetingService::with_interval(Arc::new(SystemClock), Duration::from_millis(50)),
    );
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        let _ = axum::serve(listener, build_router(state)).await;
    });

    addr
}

async fn connect(addr: SocketAddr) -> WsStream {
    let (ws, _) = tokio_tungstenite::connect_async(format!("ws://{addr}/ws/greetings"))
        .await
        .expect("Failed to connect");
    ws
}

/// Receive the next text frame, skipping control frames.
async fn recv_text(ws: &mut WsStream) -> String {
    loop {
        let frame = tokio::time::timeout(Duration::from_secs(5), ws.next())
            .await
            .expect("Timed out waiting for a greeting")
            .expect("WebSocket closed")
            .expect("WebSocket error");
        if let Message::Text(text) = frame {
            return text.to_string();
        }
    }
}

#[tokio::test]
async fn test_greets_with_first_frame_name() {
    let addr = spawn_server().await;
    let mut ws = connect(addr).await;

    ws.send(Message::text("Josh")).await.unwrap();

    let first = recv_text(&mut ws).await;
    let second = recv_text(&mut ws).await;
    let third = recv_text(&mut ws).await;

    for message in [&first, &second, &third] {
        assert!(message.starts_with("Hello Josh @ "), "unexpected greeting: {message}");
    }
    assert_ne!(first, second);
    assert_ne!(second, third);
}

#[tokio::test]
async fn test_later_frames_do_not_change_name() {
    let addr = spawn_server().await;
    let mut ws = connect(addr).await;

    ws.send(Message::binary(vec![0u8, 1])).await.unwrap();
    ws.send(Message::text("Madhura")).await.unwrap();
    ws.send(Message::text("Mark")).await.unwrap();

    for _ in 0..3 {
        let message = recv_text(&mut ws).await;
        assert!(message.contains("Madhura"), "unexpected greeting: {message}");
        assert!(!message.contains("Mark"));
    }
}

#[tokio::test]
async fn test_client_close_ends_session() {
    let addr = spawn_server().await;
    let mut ws = connect(addr).await;

    ws.send(Message::text("Olga")).await.unwrap();
    recv_text(&mut ws).await;

    ws.close(None).await.unwrap();

    // After our close, the stream drains to the close handshake and ends.
    let drained = tokio::time::timeout(Duration::from_secs(5), async {
        while let Some(Ok(frame)) = ws.next().await {
            if frame.is_close() {
                break;
            }
        }
    })
    .await;
    assert!(drained.is_ok(), "Server kept the session open after close");
}

#[tokio::test]
async fn test_close_before_name_sends_nothing() {
    let addr = spawn_server().await;
    let mut ws = connect(addr).await;

    ws.close(None).await.unwrap();

    let next = tokio::time::timeout(Duration::from_secs(5), ws.next())
        .await
        .expect("Server did not finish the close handshake");
    assert!(
        !matches!(next, Some(Ok(Message::Text(_)))),
        "No greeting may be sent without a name"
    );
}
