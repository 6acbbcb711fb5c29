//! UseCase: irrecoverably delete a chat and its history.

use std::sync::Arc;

use crate::domain::{ChatId, ChatRepository, ChatStoreError};

pub struct DeleteChatUseCase {
    repository: Arc<dyn ChatRepository>,
}

impl DeleteChatUseCase {
    pub fn new(repository: Arc<dyn ChatRepository>) -> Self {
        Self { repository }
    }

    pub async fn execute(&self, chat_id: &ChatId) -> Result<(), ChatStoreError> {
        self.repository.delete_chat(chat_id).await
    }
}
