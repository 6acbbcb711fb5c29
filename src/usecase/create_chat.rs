//! UseCase: open a new support chat.

use std::sync::Arc;

use crate::domain::{Chat, ChatRepository, ChatStoreError};

pub struct CreateChatUseCase {
    repository: Arc<dyn ChatRepository>,
}

impl CreateChatUseCase {
    pub fn new(repository: Arc<dyn ChatRepository>) -> Self {
        Self { repository }
    }

    /// Create a chat for a requester. Nothing is broadcast: the creator
    /// learns the id from the HTTP response and subscribers only exist
    /// after the first `subscribe` frame.
    pub async fn execute(
        &self,
        name: Option<String>,
        email: Option<String>,
    ) -> Result<Chat, ChatStoreError> {
        self.repository.create_chat(name, email).await
    }
}
