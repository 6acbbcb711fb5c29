//! Domain model of the support-chat engine.
//!
//! The domain layer owns the chat entities and the traits the rest of the
//! system depends on (repository, event dispatcher). It has no knowledge
//! of HTTP, WebSockets or any concrete storage.

pub mod chat;
pub mod dispatcher;
pub mod error;
pub mod event;
pub mod repository;

pub use chat::{Chat, ChatId, ChatStatus, DEFAULT_REQUESTER_NAME, Message, Role};
pub use dispatcher::{ConnectionId, EventDispatcher};
pub use error::{ChatStoreError, PushError};
pub use event::ChatEvent;
pub use repository::ChatRepository;

#[cfg(test)]
pub use dispatcher::MockEventDispatcher;
