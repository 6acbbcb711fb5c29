//! UseCase: render a chat's full history as a downloadable transcript.

use std::fmt::Write as _;
use std::sync::Arc;

use crate::common::time::format_ts;
use crate::domain::{ChatId, ChatRepository, ChatStatus, ChatStoreError, Role};

pub struct ExportChatUseCase {
    repository: Arc<dyn ChatRepository>,
}

impl ExportChatUseCase {
    pub fn new(repository: Arc<dyn ChatRepository>) -> Self {
        Self { repository }
    }

    /// Plain-text dump of the chat: header block followed by one line per
    /// message.
    pub async fn execute(&self, chat_id: &ChatId) -> Result<String, ChatStoreError> {
        let chat = self.repository.get_chat(chat_id).await?;

        let mut out = String::new();
        let _ = writeln!(out, "Chat {}", chat.id);
        let _ = writeln!(out, "Requester: {}", chat.name);
        if let Some(email) = &chat.email {
            let _ = writeln!(out, "Email: {}", email);
        }
        let _ = writeln!(out, "Created: {}", format_ts(chat.created_at));
        let _ = writeln!(
            out,
            "Status: {}",
            match chat.status {
                ChatStatus::Open => "open",
                ChatStatus::Closed => "closed",
            }
        );
        if let Some(admin) = &chat.assigned_admin {
            let _ = writeln!(out, "Assigned: {}", admin);
        }
        let _ = writeln!(out);

        for message in &chat.messages {
            let sender = match (&message.from, &message.author) {
                (Role::Admin, Some(author)) => format!("admin ({author})"),
                (Role::Admin, None) => "admin".to_string(),
                (Role::User, _) => chat.name.clone(),
            };
            let _ = writeln!(
                out,
                "[{}] {}: {}",
                format_ts(message.ts),
                sender,
                message.text
            );
        }

        Ok(out)
    }
}
