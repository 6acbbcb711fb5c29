//! UseCases: claim a chat for an admin, release a claim.

use std::sync::Arc;

use crate::domain::{Chat, ChatEvent, ChatId, ChatRepository, ChatStoreError, EventDispatcher};

/// First-claim-wins assignment. The losing concurrent claim gets
/// `Conflict` and should refresh and retry.
pub struct AssignChatUseCase {
    repository: Arc<dyn ChatRepository>,
    dispatcher: Arc<dyn EventDispatcher>,
}

impl AssignChatUseCase {
    pub fn new(repository: Arc<dyn ChatRepository>, dispatcher: Arc<dyn EventDispatcher>) -> Self {
        Self {
            repository,
            dispatcher,
        }
    }

    pub async fn execute(&self, chat_id: &ChatId, admin: String) -> Result<Chat, ChatStoreError> {
        let chat = self.repository.assign(chat_id, admin).await?;
        self.dispatcher
            .publish(
                chat_id,
                ChatEvent::Assigned {
                    assigned_admin: chat.assigned_admin.clone(),
                },
            )
            .await;
        Ok(chat)
    }
}

pub struct UnassignChatUseCase {
    repository: Arc<dyn ChatRepository>,
    dispatcher: Arc<dyn EventDispatcher>,
}

impl UnassignChatUseCase {
    pub fn new(repository: Arc<dyn ChatRepository>, dispatcher: Arc<dyn EventDispatcher>) -> Self {
        Self {
            repository,
            dispatcher,
        }
    }

    pub async fn execute(&self, chat_id: &ChatId) -> Result<Chat, ChatStoreError> {
        let chat = self.repository.unassign(chat_id).await?;
        self.dispatcher
            .publish(
                chat_id,
                ChatEvent::Assigned {
                    assigned_admin: None,
                },
            )
            .await;
        Ok(chat)
    }
}
