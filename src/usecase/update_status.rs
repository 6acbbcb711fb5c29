//! UseCases: close/reopen a chat, clear the unread flag.

use std::sync::Arc;

use crate::domain::{
    Chat, ChatEvent, ChatId, ChatRepository, ChatStatus, ChatStoreError, EventDispatcher,
};

pub struct SetStatusUseCase {
    repository: Arc<dyn ChatRepository>,
    dispatcher: Arc<dyn EventDispatcher>,
}

impl SetStatusUseCase {
    pub fn new(repository: Arc<dyn ChatRepository>, dispatcher: Arc<dyn EventDispatcher>) -> Self {
        Self {
            repository,
            dispatcher,
        }
    }

    /// `close = true` closes the chat, `false` reopens it. Subscribers on
    /// both sides learn about it through a `status` frame so the send
    /// affordance can be disabled immediately.
    pub async fn execute(&self, chat_id: &ChatId, close: bool) -> Result<Chat, ChatStoreError> {
        let status = if close {
            ChatStatus::Closed
        } else {
            ChatStatus::Open
        };
        let chat = self.repository.set_status(chat_id, status).await?;
        self.dispatcher
            .publish(chat_id, ChatEvent::Status(chat.status))
            .await;
        Ok(chat)
    }
}

/// Clears the unread flag when an admin opens the chat. No event: the
/// flag only drives the admin list view, which reloads over HTTP.
pub struct MarkReadUseCase {
    repository: Arc<dyn ChatRepository>,
}

impl MarkReadUseCase {
    pub fn new(repository: Arc<dyn ChatRepository>) -> Self {
        Self { repository }
    }

    pub async fn execute(&self, chat_id: &ChatId) -> Result<Chat, ChatStoreError> {
        self.repository.mark_read(chat_id).await
    }
}
