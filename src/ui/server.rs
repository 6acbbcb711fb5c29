//! Server execution logic.

use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post},
};
use tower_http::trace::TraceLayer;

use super::{
    handler::{
        assign_chat, close_chat, create_chat, delete_chat, export_chat, get_admin_chat, get_chat,
        get_presence, health_check, list_chats, mark_read, post_message, unassign_chat,
        websocket_handler,
    },
    signal::shutdown_signal,
    state::AppState,
};

/// Build the full route table over a wired [`AppState`].
///
/// Split out from [`Server::run`] so integration tests can serve the same
/// router on an ephemeral port.
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        // WebSocket endpoint
        .route("/ws", get(websocket_handler))
        // Public HTTP endpoints
        .route("/api/health", get(health_check))
        .route("/api/presence", get(get_presence))
        .route("/api/chats", post(create_chat))
        .route("/api/chats/{chat_id}", get(get_chat))
        .route("/api/chats/{chat_id}/message", post(post_message))
        // Admin HTTP endpoints
        .route("/api/admin/chats", get(list_chats))
        .route(
            "/api/admin/chats/{chat_id}",
            get(get_admin_chat).delete(delete_chat),
        )
        .route("/api/admin/chats/{chat_id}/assign", post(assign_chat))
        .route("/api/admin/chats/{chat_id}/unassign", post(unassign_chat))
        .route("/api/admin/chats/{chat_id}/close", post(close_chat))
        .route("/api/admin/chats/{chat_id}/mark-read", post(mark_read))
        .route("/api/admin/chats/{chat_id}/export", get(export_chat))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Support chat server
///
/// Encapsulates the wired application state and runs the HTTP/WebSocket
/// surface until a shutdown signal arrives.
pub struct Server {
    state: Arc<AppState>,
}

impl Server {
    pub fn new(state: Arc<AppState>) -> Self {
        Self { state }
    }

    /// Run the support chat server
    ///
    /// # Arguments
    ///
    /// * `host` - The host address to bind to (e.g., "127.0.0.1")
    /// * `port` - The port number to bind to (e.g., 8080)
    ///
    /// # Errors
    ///
    /// Returns an error if the server fails to bind to the specified
    /// address or if there's an error during server execution.
    pub async fn run(self, host: String, port: u16) -> Result<(), Box<dyn std::error::Error>> {
        let app = build_router(self.state);

        let bind_addr = format!("{}:{}", host, port);
        let listener = tokio::net::TcpListener::bind(&bind_addr).await?;

        tracing::info!(
            "Support chat server listening on {}",
            listener.local_addr()?
        );
        tracing::info!("Connect to: ws://{}/ws", bind_addr);
        tracing::info!("Press Ctrl+C to shutdown gracefully");

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        tracing::info!("Server shutdown complete");

        Ok(())
    }
}
