//! Terminal client session: HTTP for writes, the push socket for reads.

use std::io::Write as _;
use std::sync::Arc;

use futures_util::{SinkExt, StreamExt};
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use tokio::sync::mpsc;
use tokio_tungstenite::{connect_async, tungstenite::protocol::Message};

use crate::domain::Role;
use crate::infrastructure::dto::http::{
    ChatDto, CreateChatRequest, CreateChatResponse, MessageDto, PostMessageRequest,
    PostMessageResponse,
};
use crate::infrastructure::dto::websocket::{ClientFrame, ServerFrame};

use super::{
    cache::{CacheReconciler, MemoryCache, OpenOutcome},
    error::ClientError,
    formatter::MessageFormatter,
};

/// Everything a session needs, resolved from the command line.
pub struct SessionConfig {
    /// HTTP base URL of the server, e.g. `http://127.0.0.1:8080`.
    pub base_url: String,
    /// Requester display name when opening a new chat.
    pub name: Option<String>,
    /// Existing chat to resume. Required for admin sessions.
    pub chat_id: Option<String>,
    /// Admin display name; when set the session joins as an admin.
    pub admin: Option<String>,
}

async fn fetch_snapshot(
    http: &reqwest::Client,
    base_url: &str,
    chat_id: &str,
) -> Result<ChatDto, ClientError> {
    let response = http
        .get(format!("{}/api/chats/{}", base_url, chat_id))
        .send()
        .await?;
    if response.status() == reqwest::StatusCode::NOT_FOUND {
        return Err(ClientError::ChatNotFound(chat_id.to_string()));
    }
    if !response.status().is_success() {
        return Err(ClientError::Http(format!(
            "snapshot fetch returned {}",
            response.status()
        )));
    }
    Ok(response.json::<ChatDto>().await?)
}

async fn create_chat(
    http: &reqwest::Client,
    base_url: &str,
    name: Option<String>,
) -> Result<String, ClientError> {
    let response = http
        .post(format!("{}/api/chats", base_url))
        .json(&CreateChatRequest { name, email: None })
        .send()
        .await?;
    if !response.status().is_success() {
        return Err(ClientError::Http(format!(
            "chat creation returned {}",
            response.status()
        )));
    }
    Ok(response.json::<CreateChatResponse>().await?.id)
}

async fn post_message(
    http: &reqwest::Client,
    base_url: &str,
    chat_id: &str,
    from: Role,
    text: String,
    author: Option<String>,
) -> Result<MessageDto, ClientError> {
    let response = http
        .post(format!("{}/api/chats/{}/message", base_url, chat_id))
        .json(&PostMessageRequest { text, from, author })
        .send()
        .await?;
    if !response.status().is_success() {
        return Err(ClientError::Http(format!(
            "message post returned {}",
            response.status()
        )));
    }
    Ok(response.json::<PostMessageResponse>().await?.message)
}

/// Derive the WebSocket endpoint from the HTTP base URL.
fn ws_url(base_url: &str) -> String {
    let base = base_url.trim_end_matches('/');
    let ws = if let Some(rest) = base.strip_prefix("https://") {
        format!("wss://{}", rest)
    } else if let Some(rest) = base.strip_prefix("http://") {
        format!("ws://{}", rest)
    } else {
        format!("ws://{}", base)
    };
    format!("{}/ws", ws)
}

fn redisplay_prompt(prompt: &str) {
    print!("{}", prompt);
    let _ = std::io::stdout().flush();
}

/// Run an interactive chat session until the connection drops or the user
/// exits.
pub async fn run_session(config: SessionConfig) -> Result<(), Box<dyn std::error::Error>> {
    let http = reqwest::Client::new();
    let role = if config.admin.is_some() {
        Role::Admin
    } else {
        Role::User
    };

    let mut chat_id = match (config.chat_id, role) {
        (Some(id), _) => id,
        (None, Role::User) => create_chat(&http, &config.base_url, config.name.clone()).await?,
        (None, Role::Admin) => {
            return Err("an admin session needs --chat-id".into());
        }
    };

    // Revalidate the id before use: the server affirmatively saying the
    // chat is gone means a stale id, not an outage. A requester gets a
    // fresh chat in that case; an admin has nothing to join.
    let mut fetched = fetch_snapshot(&http, &config.base_url, &chat_id).await;
    if matches!(fetched, Err(ClientError::ChatNotFound(_))) {
        match role {
            Role::User => {
                tracing::warn!("Chat '{}' no longer exists, opening a fresh one", chat_id);
                chat_id = create_chat(&http, &config.base_url, config.name.clone()).await?;
                fetched = fetch_snapshot(&http, &config.base_url, &chat_id).await;
            }
            Role::Admin => {
                return Err(Box::new(ClientError::ChatNotFound(chat_id)));
            }
        }
    }

    // Resolve the opening snapshot, falling back to the local cache when
    // the server is unreachable.
    let mut reconciler = CacheReconciler::new(Arc::new(MemoryCache::new()));
    let outcome = reconciler.open(&chat_id, fetched);
    match outcome {
        OpenOutcome::Unavailable => {
            return Err(Box::new(ClientError::Connection(
                "server unreachable and no cached copy of this chat".to_string(),
            )));
        }
        OpenOutcome::Degraded => {
            let chat = reconciler.snapshot().expect("degraded open has a snapshot");
            print!("{}", MessageFormatter::format_history(chat, true));
            println!("Reconnect later to send messages.");
            return Ok(());
        }
        OpenOutcome::Live => {
            let chat = reconciler.snapshot().expect("live open has a snapshot");
            print!("{}", MessageFormatter::format_history(chat, false));
        }
    }

    let requester_name = reconciler
        .snapshot()
        .map(|chat| chat.name.clone())
        .unwrap_or_default();
    let display_name = config
        .admin
        .clone()
        .or(config.name.clone())
        .unwrap_or_else(|| requester_name.clone());
    let prompt = format!("{}> ", display_name);

    let url = ws_url(&config.base_url);
    let (ws_stream, _response) = connect_async(&url)
        .await
        .map_err(|e| ClientError::Connection(e.to_string()))?;
    tracing::info!("Connected to {}", url);
    println!("\nType messages and press Enter to send. Press Ctrl+C to exit.\n");

    let (mut write, mut read) = ws_stream.split();

    let subscribe = ClientFrame::Subscribe {
        chat_id: chat_id.clone(),
        role,
    };
    write
        .send(Message::Text(serde_json::to_string(&subscribe)?.into()))
        .await?;

    // Task printing incoming frames and mirroring them into the cache
    let prompt_for_read = prompt.clone();
    let mut read_task = tokio::spawn(async move {
        while let Some(message) = read.next().await {
            match message {
                Ok(Message::Text(text)) => {
                    let frame = match serde_json::from_str::<ServerFrame>(&text) {
                        Ok(frame) => frame,
                        Err(e) => {
                            tracing::debug!("Ignoring unknown frame: {}", e);
                            continue;
                        }
                    };
                    reconciler.apply(&frame);
                    let rendered = match &frame {
                        // The opening snapshot was already printed over HTTP.
                        ServerFrame::Init { .. } => String::new(),
                        ServerFrame::Message { message } => {
                            format!(
                                "\n{}",
                                MessageFormatter::format_message(message, &requester_name)
                            )
                        }
                        ServerFrame::Typing { from, typing } => {
                            format!("\n{}", MessageFormatter::format_typing(*from, *typing))
                        }
                        ServerFrame::Presence { admin_count } => {
                            format!("\n{}", MessageFormatter::format_presence(*admin_count))
                        }
                        ServerFrame::Assigned { assigned_admin } => {
                            format!(
                                "\n{}",
                                MessageFormatter::format_assigned(assigned_admin.as_deref())
                            )
                        }
                        ServerFrame::Status { status } => {
                            format!("\n{}", MessageFormatter::format_status(*status))
                        }
                    };
                    if !rendered.is_empty() {
                        print!("{}", rendered);
                        redisplay_prompt(&prompt_for_read);
                    }
                }
                Ok(Message::Close(_)) => {
                    tracing::info!("Server closed the connection");
                    break;
                }
                Err(e) => {
                    tracing::warn!("WebSocket read error: {}", e);
                    break;
                }
                _ => {}
            }
        }
    });

    // Blocking thread for rustyline (synchronous readline)
    let (input_tx, mut input_rx) = mpsc::unbounded_channel::<String>();
    let prompt_for_readline = prompt.clone();
    let _readline_handle = std::thread::spawn(move || {
        let mut rl = match DefaultEditor::new() {
            Ok(rl) => rl,
            Err(e) => {
                eprintln!("Failed to initialize readline: {}", e);
                return;
            }
        };

        loop {
            match rl.readline(&prompt_for_readline) {
                Ok(line) => {
                    let line = line.trim();
                    if !line.is_empty() {
                        rl.add_history_entry(line).ok();
                        if input_tx.send(line.to_string()).is_err() {
                            break;
                        }
                    }
                }
                Err(ReadlineError::Interrupted) => {
                    tracing::info!("Interrupted");
                    break;
                }
                Err(ReadlineError::Eof) => {
                    tracing::info!("EOF");
                    break;
                }
                Err(err) => {
                    tracing::error!("Readline error: {}", err);
                    break;
                }
            }
        }
    });

    // Task posting typed lines over HTTP, bracketed by typing signals
    let author = config.admin.clone();
    let base_url = config.base_url.clone();
    let mut write_task = tokio::spawn(async move {
        while let Some(line) = input_rx.recv().await {
            let start = ClientFrame::Typing {
                chat_id: chat_id.clone(),
                typing: true,
                role,
            };
            if send_frame(&mut write, &start).await.is_err() {
                break;
            }

            match post_message(&http, &base_url, &chat_id, role, line, author.clone()).await {
                Ok(_) => {}
                Err(e) => {
                    eprintln!("Failed to send message: {}", e);
                }
            }

            let stop = ClientFrame::Typing {
                chat_id: chat_id.clone(),
                typing: false,
                role,
            };
            if send_frame(&mut write, &stop).await.is_err() {
                break;
            }
        }
    });

    // If any one of the tasks completes, abort the other
    tokio::select! {
        _ = &mut read_task => write_task.abort(),
        _ = &mut write_task => read_task.abort(),
    };

    Ok(())
}

async fn send_frame<S>(write: &mut S, frame: &ClientFrame) -> Result<(), ()>
where
    S: SinkExt<Message> + Unpin,
{
    let json = match serde_json::to_string(frame) {
        Ok(json) => json,
        Err(e) => {
            tracing::error!("Failed to serialize frame: {}", e);
            return Ok(());
        }
    };
    if write.send(Message::Text(json.into())).await.is_err() {
        tracing::warn!("Failed to send frame, connection lost");
        return Err(());
    }
    Ok(())
}
