//! Ephemeral presence and typing state.
//!
//! Everything here lives in memory only, is never persisted, and resets
//! to empty on process restart; it repopulates naturally as clients
//! reconnect and resubscribe.

use std::collections::HashMap;
use std::time::Duration;

use tokio::sync::Mutex;

use crate::domain::{ChatId, Role};

/// Quiet period after which a typing flag expires server-side if the
/// client never sends an explicit stop signal. Clients debounce at 2 s;
/// the server allows some slack on top.
pub const TYPING_EXPIRY: Duration = Duration::from_secs(5);

#[derive(Default)]
struct PresenceInner {
    admin_counts: HashMap<ChatId, usize>,
    global_admins: usize,
    /// Current typing generation per (chat, role); absent means not typing.
    typing: HashMap<(ChatId, Role), u64>,
    next_generation: u64,
}

/// Tracker of per-chat admin viewer counts and typing flags.
///
/// All operations are O(1) map updates behind one mutex, safe to call
/// from any connection handler concurrently.
pub struct PresenceTracker {
    inner: Mutex<PresenceInner>,
}

impl PresenceTracker {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(PresenceInner::default()),
        }
    }

    /// Record an admin connection subscribing to a chat; returns the new
    /// per-chat count.
    pub async fn admin_connected(&self, chat_id: &ChatId) -> usize {
        let mut inner = self.inner.lock().await;
        let count = inner.admin_counts.entry(chat_id.clone()).or_insert(0);
        *count += 1;
        let count = *count;
        inner.global_admins += 1;
        count
    }

    /// Record an admin leaving a chat; the counter is clamped at zero so
    /// a double disconnect cannot underflow it. Returns the new count.
    pub async fn admin_disconnected(&self, chat_id: &ChatId) -> usize {
        let mut inner = self.inner.lock().await;
        let decremented;
        let count = match inner.admin_counts.get_mut(chat_id) {
            Some(count) if *count > 1 => {
                *count -= 1;
                decremented = true;
                *count
            }
            Some(_) => {
                inner.admin_counts.remove(chat_id);
                decremented = true;
                0
            }
            None => {
                decremented = false;
                0
            }
        };
        if decremented {
            inner.global_admins = inner.global_admins.saturating_sub(1);
        }
        count
    }

    /// Number of admin connections currently subscribed to a chat.
    pub async fn admin_count(&self, chat_id: &ChatId) -> usize {
        let inner = self.inner.lock().await;
        inner.admin_counts.get(chat_id).copied().unwrap_or(0)
    }

    /// Number of admin connections subscribed to any chat, for the global
    /// "support online" indicator.
    pub async fn global_admin_count(&self) -> usize {
        let inner = self.inner.lock().await;
        inner.global_admins
    }

    /// Raise the typing flag for one side of a chat and return a
    /// generation token. A later [`clear_if_current`](Self::clear_if_current)
    /// with the same token only takes effect if no newer signal arrived,
    /// which is what lets a delayed expiry task lose to fresh keystrokes.
    pub async fn begin_typing(&self, chat_id: &ChatId, role: Role) -> u64 {
        let mut inner = self.inner.lock().await;
        inner.next_generation += 1;
        let generation = inner.next_generation;
        inner.typing.insert((chat_id.clone(), role), generation);
        generation
    }

    /// Lower the typing flag unconditionally (explicit stop signal).
    pub async fn clear_typing(&self, chat_id: &ChatId, role: Role) {
        let mut inner = self.inner.lock().await;
        inner.typing.remove(&(chat_id.clone(), role));
    }

    /// Lower the typing flag only if `generation` is still the current
    /// one. Returns whether the flag was cleared.
    pub async fn clear_if_current(&self, chat_id: &ChatId, role: Role, generation: u64) -> bool {
        let mut inner = self.inner.lock().await;
        let key = (chat_id.clone(), role);
        if inner.typing.get(&key) == Some(&generation) {
            inner.typing.remove(&key);
            true
        } else {
            false
        }
    }

    /// Whether one side of a chat is currently typing.
    pub async fn is_typing(&self, chat_id: &ChatId, role: Role) -> bool {
        let inner = self.inner.lock().await;
        inner.typing.contains_key(&(chat_id.clone(), role))
    }
}

impl Default for PresenceTracker {
    fn default() -> Self {
        Self::new()
    }
}
