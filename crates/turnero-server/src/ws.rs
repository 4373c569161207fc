//! `WebSocket` handler: one task per observer.
//!
//! Clients connect to `GET /ws`. The first frame they receive is the
//! current `STATE`; after that they receive one `STATE` frame per accepted
//! mutation from any client. Text frames they send are submitted as
//! operations. Invalid or rejected operations get no reply at all; the
//! client learns of success by seeing a snapshot whose `lastAction`
//! carries its `clientId`.
//!
//! If a client falls behind, stale frames are skipped and the client
//! resumes from the most recent snapshot.

use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket};
use axum::extract::{State, WebSocketUpgrade};
use axum::response::IntoResponse;
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, warn};

use crate::error::ObserverError;
use crate::state::{AppState, Observer};

/// Upgrade an HTTP request to a `WebSocket` observer session.
///
/// # Route
///
/// `GET /ws`
pub async fn ws_queue(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(|socket| handle_ws(socket, state))
}

/// Handle the `WebSocket` lifecycle: send the initial snapshot, then
/// interleave broadcast frames with inbound operations until either side
/// goes away.
async fn handle_ws(mut socket: WebSocket, state: Arc<AppState>) {
    let Observer {
        initial,
        mut updates,
    } = match state.connect().await {
        Ok(observer) => observer,
        Err(e) => {
            warn!(error = %e, "Failed to register WebSocket observer");
            return;
        }
    };
    debug!(
        observers = state.hub().observer_count(),
        "WebSocket observer connected"
    );

    if socket.send(Message::Text(initial)).await.is_err() {
        debug!("WebSocket observer disconnected before initial snapshot");
        return;
    }

    loop {
        tokio::select! {
            // A snapshot committed by some client.
            result = updates.recv() => {
                match result {
                    Ok(frame) => {
                        if socket.send(Message::Text(frame)).await.is_err() {
                            debug!("WebSocket observer disconnected (send failed)");
                            return;
                        }
                    }
                    Err(RecvError::Lagged(n)) => {
                        debug!(skipped = n, "WebSocket observer lagged, skipping ahead");
                    }
                    Err(RecvError::Closed) => {
                        debug!("Broadcast channel closed, shutting down WebSocket");
                        return;
                    }
                }
            }
            // An operation (or control frame) from this client.
            msg = socket.recv() => {
                match msg {
                    Some(Ok(Message::Text(text))) => submit(&state, text.as_str()).await,
                    Some(Ok(Message::Binary(bytes))) => {
                        if let Ok(text) = std::str::from_utf8(&bytes) {
                            submit(&state, text).await;
                        }
                    }
                    Some(Ok(Message::Ping(data))) => {
                        if socket.send(Message::Pong(data)).await.is_err() {
                            debug!("WebSocket observer disconnected (pong failed)");
                            return;
                        }
                    }
                    Some(Ok(Message::Close(_))) | None => {
                        debug!("WebSocket observer disconnected");
                        return;
                    }
                    Some(Err(e)) => {
                        debug!("WebSocket error: {e}");
                        return;
                    }
                    Some(Ok(Message::Pong(_))) => {}
                }
            }
        }
    }
}

/// Submit an inbound frame, dropping failures silently on the wire.
async fn submit(state: &AppState, raw: &str) {
    match state.submit(raw).await {
        Ok(_) => {}
        Err(e @ (ObserverError::Decode(_) | ObserverError::Rejected(_))) => {
            debug!(error = %e, "Dropped inbound message");
        }
        Err(e @ ObserverError::Serialization(_)) => {
            warn!(error = %e, "Applied operation could not be broadcast");
        }
    }
}
