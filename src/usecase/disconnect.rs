//! UseCase: connection teardown.
//!
//! Runs on every socket close, and implicitly (via dispatcher pruning)
//! when a push hits a dead connection first. Both paths are idempotent.

use std::sync::Arc;

use crate::domain::{ChatEvent, ConnectionId, EventDispatcher, Role};
use crate::infrastructure::{PresenceTracker, SubscriptionRegistry};

pub struct DisconnectUseCase {
    registry: Arc<SubscriptionRegistry>,
    presence: Arc<PresenceTracker>,
    dispatcher: Arc<dyn EventDispatcher>,
}

impl DisconnectUseCase {
    pub fn new(
        registry: Arc<SubscriptionRegistry>,
        presence: Arc<PresenceTracker>,
        dispatcher: Arc<dyn EventDispatcher>,
    ) -> Self {
        Self {
            registry,
            presence,
            dispatcher,
        }
    }

    pub async fn execute(&self, connection: ConnectionId) {
        let Some(subscription) = self.registry.on_disconnect(connection).await else {
            return;
        };
        tracing::info!(
            "Connection {} left chat '{}'",
            connection,
            subscription.chat_id
        );
        if subscription.role == Role::Admin {
            let count = self.presence.admin_disconnected(&subscription.chat_id).await;
            self.dispatcher
                .publish(
                    &subscription.chat_id,
                    ChatEvent::Presence { admin_count: count },
                )
                .await;
        }
    }
}
