use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        Path, State,
    },
    response::{IntoResponse, Json},
};
use futures_util::{SinkExt, StreamExt};
use serde_json::json;
use tokio::time::{interval, Duration};

use crate::{
    models::UserId,
    services::connection_registry::{ClientHandle, ConnectionRegistry, Outbound},
    AppState,
};

// per-socket outbound queue
const OUTBOUND_BUFFER: usize = 64;
const PING_EVERY: Duration = Duration::from_secs(25);

// GET /ws/:user_id
pub async fn ws_notifications(
    ws: WebSocketUpgrade,
    State(state): State<AppState>,
    Path(user_id): Path<UserId>,
) -> impl IntoResponse {
    let registry = state.connections.clone();
    ws.on_upgrade(move |socket| handle_notifications_socket(socket, registry, user_id))
}

async fn handle_notifications_socket(socket: WebSocket, registry: ConnectionRegistry, user_id: UserId) {
    let (handle, mut outbound) = ClientHandle::new(OUTBOUND_BUFFER);
    let connection_id = handle.id();
    registry.register(user_id, handle);

    let (mut ws_write, mut ws_read) = socket.split();

    // Ping browser to keep alive
    let mut ping = interval(PING_EVERY);
    ping.tick().await;

    loop {
        tokio::select! {
            _ = ping.tick() => {
                if ws_write.send(Message::Ping(b"ping".to_vec())).await.is_err() {
                    break;
                }
            }

            out = outbound.recv() => {
                match out {
                    Some(Outbound::Text(txt)) => {
                        if ws_write.send(Message::Text(txt)).await.is_err() {
                            break;
                        }
                    }
                    // replaced by a newer connection, or explicitly disconnected
                    Some(Outbound::Close) | None => break,
                }
            }

            client_msg = ws_read.next() => {
                match client_msg {
                    Some(Ok(Message::Text(txt))) => {
                        // no client->server protocol yet; echo as a liveness reply
                        if ws_write.send(Message::Text(txt)).await.is_err() {
                            break;
                        }
                    }
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Ok(_)) => {}
                    Some(Err(e)) => {
                        tracing::debug!("ws read error for user {}: {}", user_id, e);
                        break;
                    }
                }
            }
        }
    }

    registry.unregister_connection(user_id, connection_id);
    let _ = ws_write.close().await;
}

// POST /api/connections/:user_id/disconnect
pub async fn post_disconnect(
    State(state): State<AppState>,
    Path(user_id): Path<UserId>,
) -> impl IntoResponse {
    let disconnected = state.connections.unregister(user_id);
    Json(json!({ "disconnected": disconnected }))
}
