//! Conversion between domain entities and wire DTOs.

use crate::common::time::format_ts;
use crate::domain::{Chat, ChatEvent, Message};

use super::http::{ChatDto, MessageDto};
use super::websocket::ServerFrame;

impl From<&Message> for MessageDto {
    fn from(message: &Message) -> Self {
        Self {
            from: message.from,
            text: message.text.clone(),
            ts: format_ts(message.ts),
            author: message.author.clone(),
        }
    }
}

impl From<&Chat> for ChatDto {
    fn from(chat: &Chat) -> Self {
        Self {
            id: chat.id.to_string(),
            name: chat.name.clone(),
            email: chat.email.clone(),
            created_at: format_ts(chat.created_at),
            messages: chat.messages.iter().map(MessageDto::from).collect(),
            status: chat.status,
            assigned_admin: chat.assigned_admin.clone(),
            unread: chat.unread,
        }
    }
}

impl From<ChatEvent> for ServerFrame {
    fn from(event: ChatEvent) -> Self {
        match event {
            ChatEvent::Init(chat) => ServerFrame::Init {
                chat: ChatDto::from(&chat),
            },
            ChatEvent::Message(message) => ServerFrame::Message {
                message: MessageDto::from(&message),
            },
            ChatEvent::Typing { from, typing } => ServerFrame::Typing { from, typing },
            ChatEvent::Presence { admin_count } => ServerFrame::Presence { admin_count },
            ChatEvent::Assigned { assigned_admin } => ServerFrame::Assigned { assigned_admin },
            ChatEvent::Status(status) => ServerFrame::Status { status },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::time::{Clock, FixedClock};
    use crate::domain::{ChatStatus, Role};

    fn sample_chat() -> Chat {
        let now = FixedClock::from_millis(1_700_000_000_000).now();
        let mut chat = Chat::new(Some("Ana".to_string()), None, now).unwrap();
        chat.append(Message::new(Role::User, "Oi", now, None).unwrap())
            .unwrap();
        chat.claim("Carlos").unwrap();
        chat
    }

    #[test]
    fn test_chat_to_dto_carries_everything() {
        // given:
        let chat = sample_chat();

        // when:
        let dto = ChatDto::from(&chat);

        // then:
        assert_eq!(dto.id, chat.id.to_string());
        assert_eq!(dto.name, "Ana");
        assert_eq!(dto.messages.len(), 1);
        assert_eq!(dto.messages[0].text, "Oi");
        assert_eq!(dto.assigned_admin.as_deref(), Some("Carlos"));
        assert_eq!(dto.status, ChatStatus::Open);
        assert!(dto.unread);
    }

    #[test]
    fn test_message_ts_is_rfc3339() {
        let chat = sample_chat();
        let dto = MessageDto::from(&chat.messages[0]);
        assert_eq!(dto.ts, "2023-11-14T22:13:20.000Z");
    }

    #[test]
    fn test_event_to_frame_mapping() {
        // given:
        let chat = sample_chat();

        // when / then:
        let init = ServerFrame::from(ChatEvent::Init(chat.clone()));
        assert!(matches!(init, ServerFrame::Init { .. }));

        let typing = ServerFrame::from(ChatEvent::Typing {
            from: Role::Admin,
            typing: true,
        });
        assert_eq!(
            typing,
            ServerFrame::Typing {
                from: Role::Admin,
                typing: true,
            }
        );

        let status = ServerFrame::from(ChatEvent::Status(ChatStatus::Closed));
        assert_eq!(
            status,
            ServerFrame::Status {
                status: ChatStatus::Closed,
            }
        );
    }
}
