//! In-memory chat repository.
//!
//! A `HashMap` behind a single `tokio::sync::Mutex` serves as the store.
//! The single lock serializes every mutation, which is what makes
//! `assign` linearizable per chat and gives `append_message` a total
//! order matching acceptance order.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::common::time::Clock;
use crate::domain::{Chat, ChatId, ChatRepository, ChatStatus, ChatStoreError, Message, Role};

/// In-memory implementation of [`ChatRepository`].
pub struct InMemoryChatRepository {
    chats: Mutex<HashMap<ChatId, Chat>>,
    clock: Arc<dyn Clock>,
}

impl InMemoryChatRepository {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            chats: Mutex::new(HashMap::new()),
            clock,
        }
    }

    /// Run a mutation against one chat under the store lock and return a
    /// snapshot of the result.
    async fn mutate<F>(&self, id: &ChatId, f: F) -> Result<Chat, ChatStoreError>
    where
        F: FnOnce(&mut Chat) -> Result<(), ChatStoreError>,
    {
        let mut chats = self.chats.lock().await;
        let chat = chats
            .get_mut(id)
            .ok_or_else(|| ChatStoreError::NotFound(id.to_string()))?;
        f(chat)?;
        Ok(chat.clone())
    }
}

#[async_trait]
impl ChatRepository for InMemoryChatRepository {
    async fn create_chat(
        &self,
        name: Option<String>,
        email: Option<String>,
    ) -> Result<Chat, ChatStoreError> {
        let chat = Chat::new(name, email, self.clock.now())?;
        let mut chats = self.chats.lock().await;
        chats.insert(chat.id.clone(), chat.clone());
        tracing::info!("Chat '{}' created for '{}'", chat.id, chat.name);
        Ok(chat)
    }

    async fn get_chat(&self, id: &ChatId) -> Result<Chat, ChatStoreError> {
        let chats = self.chats.lock().await;
        chats
            .get(id)
            .cloned()
            .ok_or_else(|| ChatStoreError::NotFound(id.to_string()))
    }

    async fn list_chats(&self) -> Vec<Chat> {
        let chats = self.chats.lock().await;
        let mut list: Vec<Chat> = chats.values().cloned().collect();
        // Newest first, the order the admin list view expects.
        list.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        list
    }

    async fn append_message(
        &self,
        id: &ChatId,
        from: Role,
        text: String,
        author: Option<String>,
    ) -> Result<Message, ChatStoreError> {
        // The timestamp is assigned under the lock so that append order
        // and time order agree.
        let chat = self
            .mutate(id, |chat| {
                let message = Message::new(from, text, self.clock.now(), author)?;
                chat.append(message)?;
                Ok(())
            })
            .await?;
        Ok(chat.messages.last().cloned().expect("message just appended"))
    }

    async fn assign(&self, id: &ChatId, admin: String) -> Result<Chat, ChatStoreError> {
        self.mutate(id, |chat| chat.claim(&admin)).await
    }

    async fn unassign(&self, id: &ChatId) -> Result<Chat, ChatStoreError> {
        self.mutate(id, |chat| {
            chat.release();
            Ok(())
        })
        .await
    }

    async fn set_status(&self, id: &ChatId, status: ChatStatus) -> Result<Chat, ChatStoreError> {
        self.mutate(id, |chat| {
            chat.set_status(status);
            Ok(())
        })
        .await
    }

    async fn mark_read(&self, id: &ChatId) -> Result<Chat, ChatStoreError> {
        self.mutate(id, |chat| {
            chat.mark_read();
            Ok(())
        })
        .await
    }

    async fn delete_chat(&self, id: &ChatId) -> Result<(), ChatStoreError> {
        let mut chats = self.chats.lock().await;
        chats
            .remove(id)
            .map(|_| tracing::info!("Chat '{}' deleted", id))
            .ok_or_else(|| ChatStoreError::NotFound(id.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::time::SystemClock;

    fn create_test_repository() -> InMemoryChatRepository {
        InMemoryChatRepository::new(Arc::new(SystemClock))
    }

    #[tokio::test]
    async fn test_create_and_get_chat() {
        // given:
        let repo = create_test_repository();

        // when:
        let chat = repo
            .create_chat(Some("Ana".to_string()), Some("ana@example.com".to_string()))
            .await
            .unwrap();
        let fetched = repo.get_chat(&chat.id).await.unwrap();

        // then:
        assert_eq!(fetched, chat);
        assert_eq!(fetched.name, "Ana");
        assert_eq!(fetched.status, ChatStatus::Open);
    }

    #[tokio::test]
    async fn test_get_unknown_chat_is_not_found() {
        let repo = create_test_repository();
        let id = ChatId::generate();
        let result = repo.get_chat(&id).await;
        assert!(matches!(result, Err(ChatStoreError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_append_message_sets_unread_for_user() {
        // given:
        let repo = create_test_repository();
        let chat = repo.create_chat(Some("Ana".to_string()), None).await.unwrap();

        // when:
        let message = repo
            .append_message(&chat.id, Role::User, "Oi".to_string(), None)
            .await
            .unwrap();

        // then:
        assert_eq!(message.text, "Oi");
        let fetched = repo.get_chat(&chat.id).await.unwrap();
        assert!(fetched.unread);
        assert_eq!(fetched.messages.len(), 1);
    }

    #[tokio::test]
    async fn test_append_to_closed_chat_is_conflict() {
        // given:
        let repo = create_test_repository();
        let chat = repo.create_chat(Some("Ana".to_string()), None).await.unwrap();
        repo.set_status(&chat.id, ChatStatus::Closed).await.unwrap();

        // when:
        let result = repo
            .append_message(&chat.id, Role::User, "Oi".to_string(), None)
            .await;

        // then:
        assert!(matches!(result, Err(ChatStoreError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_append_order_matches_acceptance_order_under_concurrency() {
        // given:
        let repo = Arc::new(create_test_repository());
        let chat = repo.create_chat(Some("Ana".to_string()), None).await.unwrap();

        // when: 20 concurrent appends
        let mut handles = Vec::new();
        for i in 0..20 {
            let repo = repo.clone();
            let id = chat.id.clone();
            handles.push(tokio::spawn(async move {
                repo.append_message(&id, Role::User, format!("msg {i}"), None)
                    .await
            }));
        }
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        // then: all accepted, timestamps non-decreasing in store order
        let fetched = repo.get_chat(&chat.id).await.unwrap();
        assert_eq!(fetched.messages.len(), 20);
        for pair in fetched.messages.windows(2) {
            assert!(pair[0].ts <= pair[1].ts);
        }
    }

    #[tokio::test]
    async fn test_concurrent_assign_exactly_one_wins() {
        // given:
        let repo = Arc::new(create_test_repository());
        let chat = repo.create_chat(Some("Ana".to_string()), None).await.unwrap();

        // when: five admins race for the claim
        let mut handles = Vec::new();
        for i in 0..5 {
            let repo = repo.clone();
            let id = chat.id.clone();
            handles.push(tokio::spawn(
                async move { repo.assign(&id, format!("admin-{i}")).await },
            ));
        }
        let mut successes = 0;
        let mut conflicts = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(_) => successes += 1,
                Err(ChatStoreError::Conflict(_)) => conflicts += 1,
                Err(other) => panic!("unexpected error: {other}"),
            }
        }

        // then:
        assert_eq!(successes, 1);
        assert_eq!(conflicts, 4);
        let fetched = repo.get_chat(&chat.id).await.unwrap();
        assert!(fetched.assigned_admin.is_some());
    }

    #[tokio::test]
    async fn test_unassign_then_reassign() {
        let repo = create_test_repository();
        let chat = repo.create_chat(Some("Ana".to_string()), None).await.unwrap();
        repo.assign(&chat.id, "Carlos".to_string()).await.unwrap();
        repo.unassign(&chat.id).await.unwrap();
        let reassigned = repo.assign(&chat.id, "Beatriz".to_string()).await.unwrap();
        assert_eq!(reassigned.assigned_admin.as_deref(), Some("Beatriz"));
    }

    #[tokio::test]
    async fn test_mark_read_clears_unread() {
        let repo = create_test_repository();
        let chat = repo.create_chat(Some("Ana".to_string()), None).await.unwrap();
        repo.append_message(&chat.id, Role::User, "Oi".to_string(), None)
            .await
            .unwrap();
        let updated = repo.mark_read(&chat.id).await.unwrap();
        assert!(!updated.unread);
    }

    #[tokio::test]
    async fn test_delete_chat_removes_history() {
        // given:
        let repo = create_test_repository();
        let chat = repo.create_chat(Some("Ana".to_string()), None).await.unwrap();

        // when:
        repo.delete_chat(&chat.id).await.unwrap();

        // then:
        assert!(matches!(
            repo.get_chat(&chat.id).await,
            Err(ChatStoreError::NotFound(_))
        ));
        assert!(matches!(
            repo.delete_chat(&chat.id).await,
            Err(ChatStoreError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_list_chats_newest_first() {
        // given:
        let repo = create_test_repository();
        let first = repo.create_chat(Some("Ana".to_string()), None).await.unwrap();
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        let second = repo.create_chat(Some("Bruno".to_string()), None).await.unwrap();

        // when:
        let list = repo.list_chats().await;

        // then:
        assert_eq!(list.len(), 2);
        assert_eq!(list[0].id, second.id);
        assert_eq!(list[1].id, first.id);
    }
}
