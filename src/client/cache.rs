//! Client-side snapshot cache and its reconciliation rules.
//!
//! The client keeps the last snapshot it saw for each chat. On open, a
//! fresh server read always replaces the cached copy; the cache is only
//! shown when the server cannot be reached. While the socket is live,
//! durable frames are mirrored into the cache so the next degraded open
//! starts from the most recent state.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use crate::infrastructure::dto::http::ChatDto;
use crate::infrastructure::dto::websocket::ServerFrame;

use super::error::ClientError;

/// Storage for chat snapshots keyed by chat id.
pub trait SnapshotCache: Send + Sync {
    fn load(&self, chat_id: &str) -> Option<ChatDto>;
    fn store(&self, chat: &ChatDto);
    fn remove(&self, chat_id: &str);
}

/// In-memory cache. Stands in for the browser's local storage in the
/// terminal client; lives only as long as the process.
#[derive(Default)]
pub struct MemoryCache {
    inner: Mutex<HashMap<String, ChatDto>>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SnapshotCache for MemoryCache {
    fn load(&self, chat_id: &str) -> Option<ChatDto> {
        self.inner.lock().unwrap().get(chat_id).cloned()
    }

    fn store(&self, chat: &ChatDto) {
        self.inner
            .lock()
            .unwrap()
            .insert(chat.id.clone(), chat.clone());
    }

    fn remove(&self, chat_id: &str) {
        self.inner.lock().unwrap().remove(chat_id);
    }
}

/// How a chat open resolved.
#[derive(Debug, PartialEq, Eq)]
pub enum OpenOutcome {
    /// Fresh server snapshot.
    Live,
    /// Server unreachable, showing the cached copy read-only.
    Degraded,
    /// No usable snapshot: the server is unreachable with nothing cached,
    /// or it answered that the chat no longer exists.
    Unavailable,
}

/// Holds the chat state the client is currently displaying and keeps it
/// consistent with the cache.
pub struct CacheReconciler {
    cache: Arc<dyn SnapshotCache>,
    current: Option<ChatDto>,
}

impl CacheReconciler {
    pub fn new(cache: Arc<dyn SnapshotCache>) -> Self {
        Self {
            cache,
            current: None,
        }
    }

    /// Resolve an open attempt. The server result wins whenever there is
    /// one; the cache is strictly a fallback.
    pub fn open(&mut self, chat_id: &str, fetched: Result<ChatDto, ClientError>) -> OpenOutcome {
        match fetched {
            Ok(chat) => {
                self.cache.store(&chat);
                self.current = Some(chat);
                OpenOutcome::Live
            }
            Err(ClientError::ChatNotFound(_)) => {
                // The server was reached and says the chat is gone; a
                // cached copy must not outlive that answer.
                self.cache.remove(chat_id);
                self.current = None;
                OpenOutcome::Unavailable
            }
            Err(e) => {
                tracing::warn!("Snapshot fetch failed, falling back to cache: {}", e);
                match self.cache.load(chat_id) {
                    Some(chat) => {
                        self.current = Some(chat);
                        OpenOutcome::Degraded
                    }
                    None => OpenOutcome::Unavailable,
                }
            }
        }
    }

    /// Mirror a push frame into the displayed state and the cache.
    /// Ephemeral frames (typing, presence) are display-only and skipped.
    pub fn apply(&mut self, frame: &ServerFrame) {
        match frame {
            ServerFrame::Init { chat } => {
                self.cache.store(chat);
                self.current = Some(chat.clone());
            }
            ServerFrame::Message { message } => {
                if let Some(chat) = &mut self.current {
                    // A message accepted while the subscription was being
                    // set up can arrive both inside the snapshot and as
                    // its own frame; keep it once.
                    if !chat.messages.contains(message) {
                        chat.messages.push(message.clone());
                        self.cache.store(chat);
                    }
                }
            }
            ServerFrame::Assigned { assigned_admin } => {
                if let Some(chat) = &mut self.current {
                    chat.assigned_admin = assigned_admin.clone();
                    self.cache.store(chat);
                }
            }
            ServerFrame::Status { status } => {
                if let Some(chat) = &mut self.current {
                    chat.status = *status;
                    self.cache.store(chat);
                }
            }
            ServerFrame::Typing { .. } | ServerFrame::Presence { .. } => {}
        }
    }

    /// The chat state currently on display, if any.
    pub fn snapshot(&self) -> Option<&ChatDto> {
        self.current.as_ref()
    }
}
