//! UseCase: typing indicator changes.
//!
//! Typing state is ephemeral: it bypasses the store entirely and is
//! fanned out immediately. Clients are expected to send an explicit stop
//! signal after a quiet period, but the server does not trust them to: a
//! raised flag expires on its own if no refresh arrives, so a stuck
//! client can never leave "typing" on forever.

use std::sync::Arc;
use std::time::Duration;

use crate::domain::{ChatEvent, ChatId, EventDispatcher, Role};
use crate::infrastructure::{PresenceTracker, TYPING_EXPIRY};

pub struct SetTypingUseCase {
    presence: Arc<PresenceTracker>,
    dispatcher: Arc<dyn EventDispatcher>,
    expiry: Duration,
}

impl SetTypingUseCase {
    pub fn new(presence: Arc<PresenceTracker>, dispatcher: Arc<dyn EventDispatcher>) -> Self {
        Self::with_expiry(presence, dispatcher, TYPING_EXPIRY)
    }

    pub fn with_expiry(
        presence: Arc<PresenceTracker>,
        dispatcher: Arc<dyn EventDispatcher>,
        expiry: Duration,
    ) -> Self {
        Self {
            presence,
            dispatcher,
            expiry,
        }
    }

    pub async fn execute(&self, chat_id: &ChatId, role: Role, typing: bool) {
        if typing {
            let generation = self.presence.begin_typing(chat_id, role).await;
            self.dispatcher
                .publish(
                    chat_id,
                    ChatEvent::Typing {
                        from: role,
                        typing: true,
                    },
                )
                .await;
            self.schedule_expiry(chat_id.clone(), role, generation);
        } else {
            self.presence.clear_typing(chat_id, role).await;
            self.dispatcher
                .publish(
                    chat_id,
                    ChatEvent::Typing {
                        from: role,
                        typing: false,
                    },
                )
                .await;
        }
    }

    /// Force the flag back down after the quiet period unless a newer
    /// typing signal superseded this generation.
    fn schedule_expiry(&self, chat_id: ChatId, role: Role, generation: u64) {
        let presence = self.presence.clone();
        let dispatcher = self.dispatcher.clone();
        let expiry = self.expiry;
        tokio::spawn(async move {
            tokio::time::sleep(expiry).await;
            if presence.clear_if_current(&chat_id, role, generation).await {
                dispatcher
                    .publish(
                        &chat_id,
                        ChatEvent::Typing {
                            from: role,
                            typing: false,
                        },
                    )
                    .await;
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::usecase::test_support::RecordingDispatcher;

    fn fixture(expiry: Duration) -> (Arc<PresenceTracker>, Arc<RecordingDispatcher>, SetTypingUseCase) {
        let presence = Arc::new(PresenceTracker::new());
        let dispatcher = Arc::new(RecordingDispatcher::new());
        let usecase = SetTypingUseCase::with_expiry(presence.clone(), dispatcher.clone(), expiry);
        (presence, dispatcher, usecase)
    }

    #[tokio::test]
    async fn test_typing_start_and_stop_are_published() {
        // given:
        let (presence, dispatcher, usecase) = fixture(Duration::from_secs(60));
        let chat_id = ChatId::generate();

        // when:
        usecase.execute(&chat_id, Role::User, true).await;
        assert!(presence.is_typing(&chat_id, Role::User).await);
        usecase.execute(&chat_id, Role::User, false).await;

        // then:
        assert!(!presence.is_typing(&chat_id, Role::User).await);
        let published = dispatcher.published_events();
        assert_eq!(published.len(), 2);
        assert_eq!(
            published[0].1,
            ChatEvent::Typing {
                from: Role::User,
                typing: true,
            }
        );
        assert_eq!(
            published[1].1,
            ChatEvent::Typing {
                from: Role::User,
                typing: false,
            }
        );
    }

    #[tokio::test]
    async fn test_stale_typing_expires_server_side() {
        // given: a short expiry and a client that never sends stop
        let (presence, dispatcher, usecase) = fixture(Duration::from_millis(20));
        let chat_id = ChatId::generate();

        // when:
        usecase.execute(&chat_id, Role::Admin, true).await;
        tokio::time::sleep(Duration::from_millis(80)).await;

        // then: the flag cleared itself and the stop was broadcast
        assert!(!presence.is_typing(&chat_id, Role::Admin).await);
        let published = dispatcher.published_events();
        assert_eq!(published.len(), 2);
        assert_eq!(
            published[1].1,
            ChatEvent::Typing {
                from: Role::Admin,
                typing: false,
            }
        );
    }

    #[tokio::test]
    async fn test_refreshed_typing_survives_stale_expiry() {
        // given:
        let (presence, dispatcher, usecase) = fixture(Duration::from_millis(50));
        let chat_id = ChatId::generate();

        // when: a refresh arrives halfway through the first quiet period
        usecase.execute(&chat_id, Role::User, true).await;
        tokio::time::sleep(Duration::from_millis(30)).await;
        usecase.execute(&chat_id, Role::User, true).await;
        tokio::time::sleep(Duration::from_millis(30)).await;

        // then: the first expiry fired but did not clear the fresh flag
        assert!(presence.is_typing(&chat_id, Role::User).await);
        let stops = dispatcher
            .published_events()
            .into_iter()
            .filter(|(_, event)| {
                matches!(
                    event,
                    ChatEvent::Typing {
                        typing: false,
                        ..
                    }
                )
            })
            .count();
        assert_eq!(stops, 0);
    }
}
