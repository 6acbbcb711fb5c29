//! Error types of the chat domain.

use thiserror::Error;

use super::dispatcher::ConnectionId;

/// Errors raised by chat-store mutations.
///
/// The `ui` layer maps these onto HTTP status codes: `Validation` → 400,
/// `NotFound` → 404, `Conflict` → 409.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChatStoreError {
    /// Bad input to a store mutation (empty name, empty message text).
    #[error("invalid input: {0}")]
    Validation(String),

    /// Unknown chat id.
    #[error("chat '{0}' not found")]
    NotFound(String),

    /// A write lost a race (assignment claim) or hit a closed chat.
    #[error("{0}")]
    Conflict(String),
}

/// Failure to push a frame to a single connection.
///
/// Never surfaced to publishers: a dead connection is pruned from the
/// registry and the loss is swallowed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PushError {
    #[error("connection {0} is not registered")]
    NotRegistered(ConnectionId),

    #[error("connection {0} is gone")]
    ConnectionGone(ConnectionId),
}
