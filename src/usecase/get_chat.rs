//! UseCases: read a chat snapshot, list all chats.

use std::sync::Arc;

use crate::domain::{Chat, ChatId, ChatRepository, ChatStoreError};

/// Fallback/resume read path: the same snapshot the `init` frame carries.
pub struct GetChatUseCase {
    repository: Arc<dyn ChatRepository>,
}

impl GetChatUseCase {
    pub fn new(repository: Arc<dyn ChatRepository>) -> Self {
        Self { repository }
    }

    pub async fn execute(&self, id: &ChatId) -> Result<Chat, ChatStoreError> {
        self.repository.get_chat(id).await
    }
}

/// Admin list view, newest chats first.
pub struct ListChatsUseCase {
    repository: Arc<dyn ChatRepository>,
}

impl ListChatsUseCase {
    pub fn new(repository: Arc<dyn ChatRepository>) -> Self {
        Self { repository }
    }

    pub async fn execute(&self) -> Vec<Chat> {
        self.repository.list_chats().await
    }
}
