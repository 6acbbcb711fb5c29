//! UseCase: attach a connection to a chat and bring it up to date.
//!
//! Ordering matters here: the connection is added to the subscriber set
//! *before* the snapshot for the `init` frame is read, so a message
//! accepted in between reaches the new subscriber as a broadcast instead
//! of falling into a gap between snapshot and subscription.

use std::sync::Arc;

use crate::domain::{
    ChatEvent, ChatId, ChatRepository, ChatStoreError, ConnectionId, EventDispatcher, Role,
};
use crate::infrastructure::{PresenceTracker, SubscriptionRegistry};

pub struct SubscribeChatUseCase {
    repository: Arc<dyn ChatRepository>,
    registry: Arc<SubscriptionRegistry>,
    presence: Arc<PresenceTracker>,
    dispatcher: Arc<dyn EventDispatcher>,
}

impl SubscribeChatUseCase {
    pub fn new(
        repository: Arc<dyn ChatRepository>,
        registry: Arc<SubscriptionRegistry>,
        presence: Arc<PresenceTracker>,
        dispatcher: Arc<dyn EventDispatcher>,
    ) -> Self {
        Self {
            repository,
            registry,
            presence,
            dispatcher,
        }
    }

    /// Subscribe `connection` to `chat_id`. The chat must already exist;
    /// chats are created on the HTTP path, never by the socket.
    pub async fn execute(
        &self,
        connection: ConnectionId,
        chat_id: ChatId,
        role: Role,
    ) -> Result<(), ChatStoreError> {
        // Existence check before touching any registry state.
        self.repository.get_chat(&chat_id).await?;

        let Some(previous) = self
            .registry
            .subscribe(connection, chat_id.clone(), role)
            .await
        else {
            // Connection vanished between frame receipt and now.
            return Ok(());
        };

        // Settle the previous subscription's presence count before
        // counting the new one, so a repeated subscribe to the same chat
        // nets out to zero instead of inflating the counter. The old chat
        // is only notified when the connection actually left it.
        if let Some(previous) = previous
            && previous.role == Role::Admin
        {
            let count = self.presence.admin_disconnected(&previous.chat_id).await;
            if previous.chat_id != chat_id {
                self.dispatcher
                    .publish(
                        &previous.chat_id,
                        ChatEvent::Presence { admin_count: count },
                    )
                    .await;
            }
        }

        if role == Role::Admin {
            self.presence.admin_connected(&chat_id).await;
        }

        // Snapshot read after registration: anything newer arrives as a
        // broadcast.
        let snapshot = self.repository.get_chat(&chat_id).await?;
        if let Err(e) = self
            .dispatcher
            .push_to(connection, ChatEvent::Init(snapshot))
            .await
        {
            tracing::warn!("Failed to push init snapshot: {}", e);
            return Ok(());
        }

        let count = self.presence.admin_count(&chat_id).await;
        self.dispatcher
            .publish(&chat_id, ChatEvent::Presence { admin_count: count })
            .await;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::time::SystemClock;
    use crate::domain::Chat;
    use crate::infrastructure::InMemoryChatRepository;
    use crate::usecase::test_support::RecordingDispatcher;
    use tokio::sync::mpsc;

    struct Fixture {
        repository: Arc<InMemoryChatRepository>,
        registry: Arc<SubscriptionRegistry>,
        presence: Arc<PresenceTracker>,
        dispatcher: Arc<RecordingDispatcher>,
        usecase: SubscribeChatUseCase,
    }

    fn fixture() -> Fixture {
        let repository = Arc::new(InMemoryChatRepository::new(Arc::new(SystemClock)));
        let registry = Arc::new(SubscriptionRegistry::new());
        let presence = Arc::new(PresenceTracker::new());
        let dispatcher = Arc::new(RecordingDispatcher::new());
        let usecase = SubscribeChatUseCase::new(
            repository.clone(),
            registry.clone(),
            presence.clone(),
            dispatcher.clone(),
        );
        Fixture {
            repository,
            registry,
            presence,
            dispatcher,
            usecase,
        }
    }

    async fn register(f: &Fixture) -> ConnectionId {
        let connection = ConnectionId::new();
        let (tx, rx) = mpsc::unbounded_channel();
        // keep the receiver alive for the duration of the test
        std::mem::forget(rx);
        f.registry.register(connection, tx).await;
        connection
    }

    async fn create_chat(f: &Fixture) -> Chat {
        f.repository
            .create_chat(Some("Ana".to_string()), None)
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_subscribe_pushes_init_then_presence() {
        // given:
        let f = fixture();
        let chat = create_chat(&f).await;
        let connection = register(&f).await;

        // when:
        f.usecase
            .execute(connection, chat.id.clone(), Role::User)
            .await
            .unwrap();

        // then: the subscriber got the snapshot directly
        let pushed = f.dispatcher.pushed_events();
        assert_eq!(pushed.len(), 1);
        assert_eq!(pushed[0].0, connection);
        assert!(matches!(pushed[0].1, ChatEvent::Init(_)));

        // and the chat saw a presence update (no admins yet)
        let published = f.dispatcher.published_events();
        assert_eq!(published.len(), 1);
        assert_eq!(published[0].1, ChatEvent::Presence { admin_count: 0 });
    }

    #[tokio::test]
    async fn test_admin_subscribe_bumps_presence() {
        // given:
        let f = fixture();
        let chat = create_chat(&f).await;
        let connection = register(&f).await;

        // when:
        f.usecase
            .execute(connection, chat.id.clone(), Role::Admin)
            .await
            .unwrap();

        // then:
        assert_eq!(f.presence.admin_count(&chat.id).await, 1);
        let published = f.dispatcher.published_events();
        assert_eq!(published.last().unwrap().1, ChatEvent::Presence { admin_count: 1 });
    }

    #[tokio::test]
    async fn test_subscribe_to_unknown_chat_fails_without_registry_change() {
        // given:
        let f = fixture();
        let connection = register(&f).await;

        // when:
        let result = f
            .usecase
            .execute(connection, ChatId::generate(), Role::User)
            .await;

        // then:
        assert!(matches!(result, Err(ChatStoreError::NotFound(_))));
        assert!(f.registry.subscription_of(connection).await.is_none());
        assert!(f.dispatcher.pushed_events().is_empty());
    }

    #[tokio::test]
    async fn test_duplicate_admin_subscribe_counts_once() {
        // given: an admin already subscribed to the chat
        let f = fixture();
        let chat = create_chat(&f).await;
        let connection = register(&f).await;
        f.usecase
            .execute(connection, chat.id.clone(), Role::Admin)
            .await
            .unwrap();

        // when: the same connection subscribes to the same chat again
        f.usecase
            .execute(connection, chat.id.clone(), Role::Admin)
            .await
            .unwrap();

        // then: one admin connection counts as one viewer
        assert_eq!(f.presence.admin_count(&chat.id).await, 1);
        assert_eq!(f.presence.global_admin_count().await, 1);
        let published = f.dispatcher.published_events();
        assert_eq!(
            published.last().unwrap().1,
            ChatEvent::Presence { admin_count: 1 }
        );
    }

    #[tokio::test]
    async fn test_admin_switching_chats_moves_presence_count() {
        // given: an admin subscribed to chat A
        let f = fixture();
        let chat_a = create_chat(&f).await;
        let chat_b = create_chat(&f).await;
        let connection = register(&f).await;
        f.usecase
            .execute(connection, chat_a.id.clone(), Role::Admin)
            .await
            .unwrap();
        assert_eq!(f.presence.admin_count(&chat_a.id).await, 1);

        // when: it subscribes to chat B
        f.usecase
            .execute(connection, chat_b.id.clone(), Role::Admin)
            .await
            .unwrap();

        // then: counts moved, and chat A was told
        assert_eq!(f.presence.admin_count(&chat_a.id).await, 0);
        assert_eq!(f.presence.admin_count(&chat_b.id).await, 1);
        let to_a: Vec<_> = f
            .dispatcher
            .published_events()
            .into_iter()
            .filter(|(id, _)| *id == chat_a.id)
            .collect();
        assert_eq!(
            to_a.last().unwrap().1,
            ChatEvent::Presence { admin_count: 0 }
        );
    }
}
