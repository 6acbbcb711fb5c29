//! WebSocket connection handlers.

use std::sync::Arc;

use axum::{
    extract::{
        State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::IntoResponse,
};
use futures_util::{sink::SinkExt, stream::StreamExt};
use tokio::sync::mpsc;

use crate::{
    domain::{ChatId, ConnectionId, Role},
    infrastructure::dto::websocket::ClientFrame,
    ui::state::AppState,
};

/// Protocol state of one connection. A connection starts idle and holds
/// at most one subscription; a new subscribe replaces the old one.
enum ConnectionState {
    Idle,
    Subscribed { chat_id: ChatId, role: Role },
}

pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

/// Spawns a task that drains the connection's frame channel into the
/// WebSocket sink. Broadcasts and direct pushes both arrive through this
/// channel, already serialized.
fn pusher_loop(
    mut rx: mpsc::UnboundedReceiver<String>,
    mut sender: futures_util::stream::SplitSink<WebSocket, Message>,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(frame) = rx.recv().await {
            if sender.send(Message::Text(frame.into())).await.is_err() {
                break;
            }
        }
    })
}

async fn handle_socket(socket: WebSocket, state: Arc<AppState>) {
    let connection = ConnectionId::new();
    let (tx, rx) = mpsc::unbounded_channel();
    state.registry.register(connection, tx).await;
    tracing::info!("Connection {} accepted", connection);

    let (sender, mut receiver) = socket.split();

    let state_clone = state.clone();

    // Task receiving frames from this client
    let mut recv_task = tokio::spawn(async move {
        // Subscription mirrored locally so typing frames can be
        // validated without a registry lookup.
        let mut conn_state = ConnectionState::Idle;

        while let Some(msg) = receiver.next().await {
            let msg = match msg {
                Ok(msg) => msg,
                Err(e) => {
                    tracing::debug!("WebSocket error on {}: {}", connection, e);
                    break;
                }
            };

            match msg {
                Message::Text(text) => {
                    let frame = match serde_json::from_str::<ClientFrame>(&text) {
                        Ok(frame) => frame,
                        Err(e) => {
                            // Malformed input never tears the socket down.
                            tracing::debug!("Ignoring malformed frame: {}", e);
                            continue;
                        }
                    };
                    process_frame(&state_clone, connection, frame, &mut conn_state).await;
                }
                Message::Ping(_) => {
                    // Ping/pong is handled automatically by the WebSocket protocol
                    tracing::debug!("Received ping");
                }
                Message::Close(_) => {
                    tracing::info!("Connection {} requested close", connection);
                    break;
                }
                _ => {}
            }
        }
    });

    // Task pushing frames to this client
    let mut send_task = pusher_loop(rx, sender);

    // If any one of the tasks completes, abort the other
    tokio::select! {
        _ = &mut recv_task => send_task.abort(),
        _ = &mut send_task => recv_task.abort(),
    };

    state.disconnect_usecase.execute(connection).await;
    tracing::info!("Connection {} closed", connection);
}

async fn process_frame(
    state: &Arc<AppState>,
    connection: ConnectionId,
    frame: ClientFrame,
    conn_state: &mut ConnectionState,
) {
    match frame {
        ClientFrame::Subscribe { chat_id, role } => {
            let chat_id = match ChatId::new(chat_id) {
                Ok(id) => id,
                Err(e) => {
                    tracing::debug!("Ignoring subscribe frame: {}", e);
                    return;
                }
            };
            match state
                .subscribe_chat_usecase
                .execute(connection, chat_id.clone(), role)
                .await
            {
                Ok(()) => {
                    tracing::info!(
                        "Connection {} subscribed to chat '{}' as {}",
                        connection,
                        chat_id,
                        role
                    );
                    *conn_state = ConnectionState::Subscribed { chat_id, role };
                }
                Err(e) => {
                    tracing::warn!("Subscribe to chat '{}' rejected: {}", chat_id, e);
                }
            }
        }
        ClientFrame::Typing {
            chat_id, typing, ..
        } => {
            // Typing only counts for the chat this connection watches,
            // under the role it subscribed with.
            match conn_state {
                ConnectionState::Subscribed {
                    chat_id: current,
                    role,
                } if current.as_str() == chat_id => {
                    state.set_typing_usecase.execute(current, *role, typing).await;
                }
                _ => {
                    tracing::debug!(
                        "Ignoring typing frame for chat '{}' from unsubscribed connection {}",
                        chat_id,
                        connection
                    );
                }
            }
        }
    }
}
