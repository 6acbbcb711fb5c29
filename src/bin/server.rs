//! Live support-chat server.
//!
//! Serves the HTTP API and the WebSocket push channel.
//!
//! Run with:
//! ```not_rust
//! cargo run --bin server
//! cargo run --bin server -- --host 0.0.0.0 --port 3000
//! ```

use std::sync::Arc;

use clap::Parser;

use pitwall_chat::{
    common::{logger::setup_logger, time::SystemClock},
    infrastructure::{
        InMemoryChatRepository, PresenceTracker, SubscriptionRegistry, WsDispatcher,
    },
    ui::{Server, state::AppState},
};

#[derive(Parser, Debug)]
#[command(name = "server")]
#[command(about = "Live support-chat server", long_about = None)]
struct Args {
    /// Host address to bind the server to
    #[arg(short = 'H', long, default_value = "127.0.0.1")]
    host: String,

    /// Port number to bind the server to
    #[arg(short = 'p', long, default_value = "8080")]
    port: u16,
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    setup_logger(env!("CARGO_BIN_NAME"), "debug");

    let args = Args::parse();

    // Wire dependencies: store, registry, presence, dispatcher, state.
    let repository = Arc::new(InMemoryChatRepository::new(Arc::new(SystemClock)));
    let registry = Arc::new(SubscriptionRegistry::new());
    let presence = Arc::new(PresenceTracker::new());
    let dispatcher = Arc::new(WsDispatcher::new(registry.clone(), presence.clone()));

    let state = Arc::new(AppState::wire(repository, registry, presence, dispatcher));

    let server = Server::new(state);
    if let Err(e) = server.run(args.host, args.port).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}
