//! WebSocket streaming endpoint
//!
//! Pushes newly created posts to every connected viewer. Delivery is
//! best-effort, at-most-once: a connection that falls behind the
//! channel capacity skips what it missed, and nothing is replayed on
//! reconnect. Inbound frames are ignored.

use axum::{
    extract::State,
    extract::ws::{Message, WebSocket, WebSocketUpgrade},
    response::IntoResponse,
};
use futures::{SinkExt, StreamExt};
use tokio::sync::broadcast::error::RecvError;

use crate::AppState;
use crate::metrics::WS_CONNECTIONS_ACTIVE;

/// GET /ws
///
/// Upgrades to a WebSocket subscribed to the new-post channel.
pub async fn websocket(State(state): State<AppState>, ws: WebSocketUpgrade) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

async fn handle_socket(socket: WebSocket, state: AppState) {
    WS_CONNECTIONS_ACTIVE.inc();
    tracing::debug!("WebSocket client connected");

    let mut rx = state.broadcaster.subscribe();
    let (mut sink, mut stream) = socket.split();

    loop {
        tokio::select! {
            broadcast = rx.recv() => match broadcast {
                Ok(payload) => {
                    if sink.send(Message::Text(payload)).await.is_err() {
                        break;
                    }
                }
                Err(RecvError::Lagged(skipped)) => {
                    tracing::debug!(skipped, "WebSocket client lagged; messages dropped");
                }
                Err(RecvError::Closed) => break,
            },
            incoming = stream.next() => match incoming {
                Some(Ok(Message::Close(_))) | Some(Err(_)) | None => break,
                // Inbound frames carry no commands
                Some(Ok(_)) => {}
            },
        }
    }

    WS_CONNECTIONS_ACTIVE.dec();
    tracing::debug!("WebSocket client disconnected");
}
