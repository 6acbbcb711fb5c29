//! Subscription registry: which connections are live, and which chat each
//! one is watching.
//!
//! A connection subscribes to at most one chat at a time; subscribing to a
//! new chat implicitly unsubscribes from the previous one. Disconnect
//! handling is idempotent so the lazy pruning done by the dispatcher and
//! the socket teardown path can both run safely.

use std::collections::{HashMap, HashSet};

use tokio::sync::{Mutex, mpsc};

use crate::domain::{ChatId, ConnectionId, Role};

/// Channel used to hand outbound frames to a connection's send task.
pub type FrameSender = mpsc::UnboundedSender<String>;

/// Active chat association of a connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Subscription {
    pub chat_id: ChatId,
    pub role: Role,
}

struct ConnectionEntry {
    sender: FrameSender,
    subscription: Option<Subscription>,
}

#[derive(Default)]
struct RegistryInner {
    connections: HashMap<ConnectionId, ConnectionEntry>,
    subscribers: HashMap<ChatId, HashSet<ConnectionId>>,
}

impl RegistryInner {
    fn detach(&mut self, connection: ConnectionId) -> Option<Subscription> {
        let entry = self.connections.get_mut(&connection)?;
        let subscription = entry.subscription.take()?;
        if let Some(set) = self.subscribers.get_mut(&subscription.chat_id) {
            set.remove(&connection);
            if set.is_empty() {
                self.subscribers.remove(&subscription.chat_id);
            }
        }
        Some(subscription)
    }
}

/// Registry of live connections and their chat subscriptions.
///
/// Constructed once per process and shared; all access goes through the
/// contract methods so the broadcast layer stays testable with fake
/// connections.
pub struct SubscriptionRegistry {
    inner: Mutex<RegistryInner>,
}

impl SubscriptionRegistry {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(RegistryInner::default()),
        }
    }

    /// Register a freshly accepted connection, not yet tied to any chat.
    pub async fn register(&self, connection: ConnectionId, sender: FrameSender) {
        let mut inner = self.inner.lock().await;
        inner.connections.insert(
            connection,
            ConnectionEntry {
                sender,
                subscription: None,
            },
        );
        tracing::debug!("Connection {} registered", connection);
    }

    /// Subscribe a connection to a chat, detaching it from any previous
    /// chat first. Returns `None` when the connection is unknown (already
    /// pruned); otherwise `Some(previous)` carrying the subscription the
    /// connection held before, if any.
    pub async fn subscribe(
        &self,
        connection: ConnectionId,
        chat_id: ChatId,
        role: Role,
    ) -> Option<Option<Subscription>> {
        let mut inner = self.inner.lock().await;
        if !inner.connections.contains_key(&connection) {
            return None;
        }
        let previous = inner.detach(connection);
        inner
            .subscribers
            .entry(chat_id.clone())
            .or_default()
            .insert(connection);
        let entry = inner
            .connections
            .get_mut(&connection)
            .expect("connection checked above");
        entry.subscription = Some(Subscription { chat_id, role });
        Some(previous)
    }

    /// Remove a connection from every registry structure. Idempotent:
    /// returns the subscription it held the first time, `None` after.
    pub async fn on_disconnect(&self, connection: ConnectionId) -> Option<Subscription> {
        let mut inner = self.inner.lock().await;
        let subscription = inner.detach(connection);
        if inner.connections.remove(&connection).is_some() {
            tracing::debug!("Connection {} removed from registry", connection);
        }
        subscription
    }

    /// Live senders for every subscriber of a chat.
    pub async fn subscribers_of(&self, chat_id: &ChatId) -> Vec<(ConnectionId, FrameSender)> {
        let inner = self.inner.lock().await;
        let Some(set) = inner.subscribers.get(chat_id) else {
            return Vec::new();
        };
        set.iter()
            .filter_map(|id| {
                inner
                    .connections
                    .get(id)
                    .map(|entry| (*id, entry.sender.clone()))
            })
            .collect()
    }

    /// Sender for a single connection, if it is still registered.
    pub async fn sender_of(&self, connection: ConnectionId) -> Option<FrameSender> {
        let inner = self.inner.lock().await;
        inner
            .connections
            .get(&connection)
            .map(|entry| entry.sender.clone())
    }

    /// Current subscription of a connection.
    pub async fn subscription_of(&self, connection: ConnectionId) -> Option<Subscription> {
        let inner = self.inner.lock().await;
        inner
            .connections
            .get(&connection)
            .and_then(|entry| entry.subscription.clone())
    }
}

impl Default for SubscriptionRegistry {
    fn default() -> Self {
        Self::new()
    }
}
