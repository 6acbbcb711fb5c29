//! Event dispatcher trait and connection identity.
//!
//! Usecases depend on this trait rather than on the WebSocket plumbing,
//! so the fan-out layer can be mocked in tests.

use std::fmt;

use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;
use uuid::Uuid;

use super::chat::ChatId;
use super::error::PushError;
use super::event::ChatEvent;

/// Identity of one live bidirectional connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectionId(Uuid);

impl ConnectionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ConnectionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Fan-out of chat events to live subscribers.
///
/// `publish` is best-effort: delivery failures are swallowed and the dead
/// connection is pruned, never reported to the publisher. `push_to`
/// targets a single connection (used for the `init` snapshot).
#[cfg_attr(test, automock)]
#[async_trait]
pub trait EventDispatcher: Send + Sync {
    async fn publish(&self, chat_id: &ChatId, event: ChatEvent);

    async fn push_to(&self, connection: ConnectionId, event: ChatEvent) -> Result<(), PushError>;
}
