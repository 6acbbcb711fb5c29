//! UseCase: append a message to a chat and fan it out.
//!
//! This is the authoritative write path (HTTP). The broadcast happens
//! strictly after the store accepted the write: a message a subscriber
//! sees is always one a concurrent store read would also find.

use std::sync::Arc;

use crate::domain::{ChatEvent, ChatId, ChatRepository, ChatStoreError, EventDispatcher, Message, Role};

pub struct PostMessageUseCase {
    repository: Arc<dyn ChatRepository>,
    dispatcher: Arc<dyn EventDispatcher>,
}

impl PostMessageUseCase {
    pub fn new(repository: Arc<dyn ChatRepository>, dispatcher: Arc<dyn EventDispatcher>) -> Self {
        Self {
            repository,
            dispatcher,
        }
    }

    pub async fn execute(
        &self,
        chat_id: &ChatId,
        from: Role,
        text: String,
        author: Option<String>,
    ) -> Result<Message, ChatStoreError> {
        // Write first; a failed write must not trigger any fan-out.
        let message = self
            .repository
            .append_message(chat_id, from, text, author)
            .await?;

        self.dispatcher
            .publish(chat_id, ChatEvent::Message(message.clone()))
            .await;

        Ok(message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::time::SystemClock;
    use crate::domain::ChatStatus;
    use crate::infrastructure::InMemoryChatRepository;
    use crate::usecase::test_support::RecordingDispatcher;

    struct Fixture {
        repository: Arc<InMemoryChatRepository>,
        dispatcher: Arc<RecordingDispatcher>,
        usecase: PostMessageUseCase,
    }

    fn fixture() -> Fixture {
        let repository = Arc::new(InMemoryChatRepository::new(Arc::new(SystemClock)));
        let dispatcher = Arc::new(RecordingDispatcher::new());
        let usecase = PostMessageUseCase::new(repository.clone(), dispatcher.clone());
        Fixture {
            repository,
            dispatcher,
            usecase,
        }
    }

    #[tokio::test]
    async fn test_message_is_stored_then_published() {
        // given:
        let f = fixture();
        let chat = f
            .repository
            .create_chat(Some("Ana".to_string()), None)
            .await
            .unwrap();

        // when:
        let message = f
            .usecase
            .execute(&chat.id, Role::User, "Oi".to_string(), None)
            .await
            .unwrap();

        // then: durable and broadcast as the same message
        let stored = f.repository.get_chat(&chat.id).await.unwrap();
        assert_eq!(stored.messages.len(), 1);

        let published = f.dispatcher.published_events();
        assert_eq!(published.len(), 1);
        assert_eq!(published[0].0, chat.id);
        assert_eq!(published[0].1, ChatEvent::Message(message));
    }

    #[tokio::test]
    async fn test_failed_write_publishes_nothing() {
        // given: a closed chat
        let f = fixture();
        let chat = f
            .repository
            .create_chat(Some("Ana".to_string()), None)
            .await
            .unwrap();
        f.repository
            .set_status(&chat.id, ChatStatus::Closed)
            .await
            .unwrap();

        // when:
        let result = f
            .usecase
            .execute(&chat.id, Role::User, "Oi".to_string(), None)
            .await;

        // then:
        assert!(matches!(result, Err(ChatStoreError::Conflict(_))));
        assert!(f.dispatcher.published_events().is_empty());
    }

    #[tokio::test]
    async fn test_empty_text_is_rejected_before_any_side_effect() {
        let f = fixture();
        let chat = f
            .repository
            .create_chat(Some("Ana".to_string()), None)
            .await
            .unwrap();

        let result = f
            .usecase
            .execute(&chat.id, Role::User, "   ".to_string(), None)
            .await;

        assert!(matches!(result, Err(ChatStoreError::Validation(_))));
        assert!(f.dispatcher.published_events().is_empty());
        let stored = f.repository.get_chat(&chat.id).await.unwrap();
        assert!(stored.messages.is_empty());
    }

    #[tokio::test]
    async fn test_publish_is_called_exactly_once_per_write() {
        // given: a dispatcher that expects a single message event
        let repository = Arc::new(InMemoryChatRepository::new(Arc::new(SystemClock)));
        let chat = repository
            .create_chat(Some("Ana".to_string()), None)
            .await
            .unwrap();
        let mut mock = crate::domain::MockEventDispatcher::new();
        mock.expect_publish()
            .withf(|_, event| matches!(event, ChatEvent::Message(_)))
            .times(1)
            .return_const(());
        let usecase = PostMessageUseCase::new(repository, Arc::new(mock));

        // when:
        usecase
            .execute(&chat.id, Role::User, "Oi".to_string(), None)
            .await
            .unwrap();

        // then: mockall verifies the expectation on drop
    }

    #[tokio::test]
    async fn test_unknown_chat_is_not_found() {
        let f = fixture();
        let result = f
            .usecase
            .execute(&ChatId::generate(), Role::User, "Oi".to_string(), None)
            .await;
        assert!(matches!(result, Err(ChatStoreError::NotFound(_))));
    }
}
