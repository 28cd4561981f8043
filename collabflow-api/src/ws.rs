//! WebSocket change broadcasting.
//!
//! Clients connect to receive live change events for tasks and comments.
//! Distribution is a single tokio broadcast channel: every connected
//! client receives every event, including the client whose request caused
//! it. Event payloads are the [`ChangeEvent`] wire format, serialized as
//! JSON text frames.

use crate::auth::AuthContext;
use crate::error::ApiResult;
use axum::{
    extract::{
        ws::{Message, WebSocket},
        State, WebSocketUpgrade,
    },
    response::Response,
};
use collabflow_events::ChangeEvent;
use futures_util::{SinkExt, StreamExt};
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::{debug, error, info, warn};

/// Broadcast state shared across the application.
///
/// Injected into mutation handlers (to publish) and the upgrade handler
/// (to subscribe).
#[derive(Clone)]
pub struct WsState {
    tx: broadcast::Sender<ChangeEvent>,
}

impl WsState {
    /// Create a new broadcast state with the specified channel capacity.
    ///
    /// The capacity bounds how many events a slow consumer can fall
    /// behind before it starts missing messages.
    pub fn new(capacity: usize) -> Self {
        let (tx, _rx) = broadcast::channel(capacity);
        Self { tx }
    }

    /// Publish an event to all connected clients.
    ///
    /// Non-blocking. With no clients connected the event is dropped;
    /// a client with a full buffer misses it (lagged).
    pub fn broadcast(&self, event: ChangeEvent) {
        let event_type = event.event_type();
        match self.tx.send(event) {
            Ok(receiver_count) => {
                debug!(
                    event_type = event_type,
                    receivers = receiver_count,
                    "Broadcast event"
                );
            }
            Err(_) => {
                // No receivers connected - this is fine
                debug!(event_type = event_type, "No receivers for event");
            }
        }
    }

    /// Subscribe to the event stream.
    ///
    /// The receiver must be polled to avoid lagging.
    pub fn subscribe(&self) -> broadcast::Receiver<ChangeEvent> {
        self.tx.subscribe()
    }
}

/// WebSocket upgrade handler.
///
/// Upgrades an authenticated HTTP connection and streams every change
/// event from the moment of subscription. There is no per-client
/// filtering and no replay of missed events; a reconnecting client
/// refetches listings to resynchronize.
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<WsState>>,
    auth: AuthContext,
) -> ApiResult<Response> {
    info!(
        user_id = auth.user_id,
        email = %auth.email,
        "WebSocket connection request"
    );

    Ok(ws.on_upgrade(move |socket| handle_socket(socket, state, auth.user_id)))
}

/// Handle an individual WebSocket connection.
///
/// Runs for the lifetime of the connection, forwarding broadcast events
/// to the client and draining inbound frames.
async fn handle_socket(socket: WebSocket, state: Arc<WsState>, user_id: i64) {
    info!(user_id, "WebSocket connected");

    let (mut sender, mut receiver) = socket.split();
    let mut rx = state.subscribe();

    // Drain inbound frames; clients only listen on this channel.
    let mut recv_task = tokio::spawn(async move {
        while let Some(msg) = receiver.next().await {
            match msg {
                Ok(Message::Close(_)) => {
                    debug!(user_id, "Client sent close frame");
                    break;
                }
                Ok(Message::Ping(_)) => {
                    // Pong is automatically sent by axum
                    debug!(user_id, "Received ping");
                }
                Ok(Message::Pong(_)) => {
                    debug!(user_id, "Received pong");
                }
                Ok(Message::Text(text)) => {
                    debug!(user_id, text = %text, "Received text message (ignored)");
                }
                Ok(Message::Binary(data)) => {
                    debug!(user_id, len = data.len(), "Received binary message (ignored)");
                }
                Err(e) => {
                    warn!(user_id, error = %e, "WebSocket receive error");
                    break;
                }
            }
        }
    });

    loop {
        tokio::select! {
            result = rx.recv() => {
                match result {
                    Ok(event) => {
                        if let Err(e) = send_event(&mut sender, &event).await {
                            error!(user_id, error = %e, "Failed to send event, closing connection");
                            break;
                        }
                    }
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        // The client missed events; it must refetch to catch up.
                        warn!(user_id, skipped, "Client lagged, events were dropped");
                    }
                    Err(broadcast::error::RecvError::Closed) => {
                        info!(user_id, "Broadcast channel closed");
                        break;
                    }
                }
            }

            _ = &mut recv_task => {
                debug!(user_id, "Receiver task finished");
                break;
            }
        }
    }

    info!(user_id, "WebSocket disconnected");
}

/// Serialize an event and send it as a text frame.
async fn send_event(
    sender: &mut futures_util::stream::SplitSink<WebSocket, Message>,
    event: &ChangeEvent,
) -> Result<(), axum::Error> {
    let json = serde_json::to_string(event).map_err(|e| {
        error!(error = %e, "Failed to serialize event");
        axum::Error::new(e)
    })?;

    sender.send(Message::Text(json.into())).await
}
