//! WebSocket greeting stream.
//!
//! # Message Protocol
//!
//! ```text
//! Client                     Handler                    GreetingService
//!   │                           │                              │
//!   ├─ Connect ────────────────>│                              │
//!   ├─ Text "Josh" ────────────>│                              │
//!   │                           ├─ greet({name: "Josh"}) ─────>│
//!   │                           │<──────── every interval ─────┤
//!   │<─ Text "Hello Josh @ …" ──┤                              │
//!   ├─ Close ──────────────────>│                              │
//!   │                           ├─ drop stream                 │
//! ```
//!
//! Only the first text frame is read as the name. Later frames are ignored,
//! and a close before any name ends the session without greeting.

use crate::state::AppState;
use axum::{
    extract::{
        State, WebSocketUpgrade,
        ws::{Message, WebSocket},
    },
    response::Response,
};
use futures::{SinkExt, StreamExt};
use reservation_core::{GreetingRequest, GreetingService, ReservationRepository};
use tracing::{debug, info, warn};

/// Upgrade `GET /ws/greetings` to a websocket.
#[allow(clippy::unused_async)] // Axum handler signature requires async
pub async fn handle<R: ReservationRepository + 'static>(
    ws: WebSocketUpgrade,
    State(state): State<AppState<R>>,
) -> Response {
    let greetings = state.greetings().clone();
    ws.on_upgrade(move |socket| handle_socket(socket, greetings))
}

/// Drives one greeting session from name to disconnect.
async fn handle_socket(socket: WebSocket, greetings: GreetingService) {
    let (mut sender, mut receiver) = socket.split();

    let Some(name) = first_text(&mut receiver).await else {
        debug!("WebSocket closed before a name was sent");
        return;
    };

    info!(name = %name, "Greeting session started");
    metrics::gauge!("greeting_sessions_active").increment(1.0);

    let stream = greetings.greet(GreetingRequest::new(name));
    futures::pin_mut!(stream);

    loop {
        tokio::select! {
            Some(response) = stream.next() => {
                if sender.send(Message::Text(response.message)).await.is_err() {
                    debug!("Client gone, stopping greetings");
                    break;
                }
                metrics::counter!("greetings_sent_total").increment(1);
            }
            frame = receiver.next() => match frame {
                Some(Ok(Message::Close(_))) | None => {
                    debug!("Client requested close");
                    break;
                }
                Some(Err(e)) => {
                    warn!(error = %e, "WebSocket receive failed");
                    break;
                }
                Some(Ok(_)) => {}
            },
        }
    }

    metrics::gauge!("greeting_sessions_active").decrement(1.0);
    info!("Greeting session closed");
}

/// Wait for the first text frame, skipping anything else.
///
/// Returns `None` when the socket closes or errors first.
async fn first_text<S>(receiver: &mut S) -> Option<String>
where
    S: futures::Stream<Item = Result<Message, axum::Error>> + Unpin,
{
    while let Some(frame) = receiver.next().await {
        match frame {
            Ok(Message::Text(text)) => return Some(text),
            Ok(Message::Close(_)) => return None,
            Ok(_) => {}
            Err(e) => {
                warn!(error = %e, "WebSocket receive failed");
                return None;
            }
        }
    }
    None
}
