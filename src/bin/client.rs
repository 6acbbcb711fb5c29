//! Terminal client for the live support chat.
//!
//! Opens (or resumes) a chat, prints the history and incoming frames, and
//! sends typed lines as messages. Pass `--admin NAME` to join an existing
//! chat from the admin side.
//!
//! Run with:
//! ```not_rust
//! cargo run --bin client -- --name Ana
//! cargo run --bin client -- --chat-id <id>
//! cargo run --bin client -- --chat-id <id> --admin Carlos
//! ```

use clap::Parser;

use pitwall_chat::client::{SessionConfig, run_session};
use pitwall_chat::common::logger::setup_logger;

#[derive(Parser, Debug)]
#[command(name = "client")]
#[command(about = "Terminal client for the live support chat", long_about = None)]
struct Args {
    /// HTTP base URL of the chat server
    #[arg(short = 'u', long, default_value = "http://127.0.0.1:8080")]
    url: String,

    /// Display name when opening a new chat
    #[arg(short = 'n', long)]
    name: Option<String>,

    /// Existing chat to resume (required with --admin)
    #[arg(short = 'c', long)]
    chat_id: Option<String>,

    /// Join as an admin under this display name
    #[arg(short = 'a', long)]
    admin: Option<String>,
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    setup_logger(env!("CARGO_BIN_NAME"), "info");

    let args = Args::parse();

    let config = SessionConfig {
        base_url: args.url,
        name: args.name,
        chat_id: args.chat_id,
        admin: args.admin,
    };

    if let Err(e) = run_session(config).await {
        tracing::error!("Client error: {}", e);
        std::process::exit(1);
    }
}
