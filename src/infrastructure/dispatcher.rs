//! WebSocket broadcast dispatcher.
//!
//! Serializes a chat event into a frame once, then hands it to the send
//! channel of every subscriber. A failed send means the connection's send
//! task is gone; the connection is pruned from the registry lazily and
//! the failure never reaches the publisher.

use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::{ChatEvent, ChatId, ConnectionId, EventDispatcher, PushError, Role};

use super::dto::websocket::ServerFrame;
use super::presence::PresenceTracker;
use super::registry::SubscriptionRegistry;

pub struct WsDispatcher {
    registry: Arc<SubscriptionRegistry>,
    presence: Arc<PresenceTracker>,
}

impl WsDispatcher {
    pub fn new(registry: Arc<SubscriptionRegistry>, presence: Arc<PresenceTracker>) -> Self {
        Self { registry, presence }
    }

    fn serialize(event: ChatEvent) -> Option<String> {
        match serde_json::to_string(&ServerFrame::from(event)) {
            Ok(json) => Some(json),
            Err(e) => {
                tracing::error!("Failed to serialize server frame: {}", e);
                None
            }
        }
    }

    /// Treat a dead connection as disconnected: drop it from the registry
    /// and keep the presence counter honest if it was an admin viewer.
    async fn prune(&self, connection: ConnectionId) {
        if let Some(subscription) = self.registry.on_disconnect(connection).await {
            tracing::warn!(
                "Pruned dead connection {} from chat '{}'",
                connection,
                subscription.chat_id
            );
            if subscription.role == Role::Admin {
                self.presence
                    .admin_disconnected(&subscription.chat_id)
                    .await;
            }
        }
    }
}

#[async_trait]
impl EventDispatcher for WsDispatcher {
    async fn publish(&self, chat_id: &ChatId, event: ChatEvent) {
        let Some(json) = Self::serialize(event) else {
            return;
        };

        let mut dead = Vec::new();
        for (connection, sender) in self.registry.subscribers_of(chat_id).await {
            if sender.send(json.clone()).is_err() {
                dead.push(connection);
            }
        }
        for connection in dead {
            self.prune(connection).await;
        }
    }

    async fn push_to(&self, connection: ConnectionId, event: ChatEvent) -> Result<(), PushError> {
        let Some(json) = Self::serialize(event) else {
            return Ok(());
        };

        let Some(sender) = self.registry.sender_of(connection).await else {
            return Err(PushError::NotRegistered(connection));
        };
        if sender.send(json).is_err() {
            self.prune(connection).await;
            return Err(PushError::ConnectionGone(connection));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::time::{Clock, FixedClock};
    use crate::domain::{Chat, ChatStatus};
    use tokio::sync::mpsc;

    struct Fixture {
        registry: Arc<SubscriptionRegistry>,
        presence: Arc<PresenceTracker>,
        dispatcher: WsDispatcher,
    }

    fn fixture() -> Fixture {
        let registry = Arc::new(SubscriptionRegistry::new());
        let presence = Arc::new(PresenceTracker::new());
        let dispatcher = WsDispatcher::new(registry.clone(), presence.clone());
        Fixture {
            registry,
            presence,
            dispatcher,
        }
    }

    async fn fake_subscriber(
        registry: &SubscriptionRegistry,
        chat_id: &ChatId,
        role: Role,
    ) -> (ConnectionId, mpsc::UnboundedReceiver<String>) {
        let connection = ConnectionId::new();
        let (tx, rx) = mpsc::unbounded_channel();
        registry.register(connection, tx).await;
        registry.subscribe(connection, chat_id.clone(), role).await;
        (connection, rx)
    }

    #[tokio::test]
    async fn test_publish_reaches_every_subscriber() {
        // given: two subscribers of one chat
        let f = fixture();
        let chat_id = ChatId::generate();
        let (_c1, mut rx1) = fake_subscriber(&f.registry, &chat_id, Role::User).await;
        let (_c2, mut rx2) = fake_subscriber(&f.registry, &chat_id, Role::Admin).await;

        // when:
        f.dispatcher
            .publish(&chat_id, ChatEvent::Status(ChatStatus::Closed))
            .await;

        // then:
        let expected = r#"{"type":"status","status":"closed"}"#;
        assert_eq!(rx1.recv().await.unwrap(), expected);
        assert_eq!(rx2.recv().await.unwrap(), expected);
    }

    #[tokio::test]
    async fn test_publish_does_not_leak_across_chats() {
        // given: subscribers of two different chats
        let f = fixture();
        let chat_a = ChatId::generate();
        let chat_b = ChatId::generate();
        let (_ca, mut rx_a) = fake_subscriber(&f.registry, &chat_a, Role::User).await;
        let (_cb, mut rx_b) = fake_subscriber(&f.registry, &chat_b, Role::User).await;

        // when: an event for chat A only
        f.dispatcher
            .publish(&chat_a, ChatEvent::Presence { admin_count: 1 })
            .await;

        // then: B sees nothing
        assert!(rx_a.recv().await.is_some());
        assert!(rx_b.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_dead_subscriber_is_pruned_silently() {
        // given: one live and one dead subscriber
        let f = fixture();
        let chat_id = ChatId::generate();
        let (_live, mut rx_live) = fake_subscriber(&f.registry, &chat_id, Role::User).await;
        let (dead, rx_dead) = fake_subscriber(&f.registry, &chat_id, Role::Admin).await;
        f.presence.admin_connected(&chat_id).await;
        drop(rx_dead);

        // when:
        f.dispatcher
            .publish(&chat_id, ChatEvent::Presence { admin_count: 1 })
            .await;

        // then: the live one got the frame, the dead one is gone and the
        // admin counter was corrected
        assert!(rx_live.recv().await.is_some());
        assert!(f.registry.subscription_of(dead).await.is_none());
        assert_eq!(f.presence.admin_count(&chat_id).await, 0);
    }

    #[tokio::test]
    async fn test_push_to_unregistered_connection_errors() {
        let f = fixture();
        let result = f
            .dispatcher
            .push_to(
                ConnectionId::new(),
                ChatEvent::Presence { admin_count: 0 },
            )
            .await;
        assert!(matches!(result, Err(PushError::NotRegistered(_))));
    }

    #[tokio::test]
    async fn test_push_to_delivers_init_snapshot() {
        // given:
        let f = fixture();
        let chat_id = ChatId::generate();
        let (connection, mut rx) = fake_subscriber(&f.registry, &chat_id, Role::User).await;
        let now = FixedClock::from_millis(1_700_000_000_000).now();
        let chat = Chat::new(Some("Ana".to_string()), None, now).unwrap();

        // when:
        f.dispatcher
            .push_to(connection, ChatEvent::Init(chat))
            .await
            .unwrap();

        // then:
        let frame = rx.recv().await.unwrap();
        let value: serde_json::Value = serde_json::from_str(&frame).unwrap();
        assert_eq!(value["type"], "init");
        assert_eq!(value["chat"]["name"], "Ana");
    }
}
