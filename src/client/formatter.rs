//! Message formatting utilities for client display.

use crate::domain::{ChatStatus, Role};
use crate::infrastructure::dto::http::{ChatDto, MessageDto};

/// Message formatter for client display
pub struct MessageFormatter;

impl MessageFormatter {
    /// Format the chat header and history shown when a chat opens.
    pub fn format_history(chat: &ChatDto, degraded: bool) -> String {
        let mut output = String::new();
        output.push_str("\n============================================================\n");
        output.push_str(&format!("Chat {} with {}\n", chat.id, chat.name));
        if let Some(admin) = &chat.assigned_admin {
            output.push_str(&format!("Assigned to {}\n", admin));
        }
        if chat.status == ChatStatus::Closed {
            output.push_str("(this chat is closed)\n");
        }
        if degraded {
            output.push_str("(offline copy, the server could not be reached)\n");
        }
        output.push_str("============================================================\n");
        for message in &chat.messages {
            output.push_str(&Self::format_message(message, &chat.name));
        }
        output
    }

    /// One chat message, prefixed with the sender's display name.
    pub fn format_message(message: &MessageDto, requester_name: &str) -> String {
        let sender = match (&message.from, &message.author) {
            (Role::Admin, Some(author)) => author.clone(),
            (Role::Admin, None) => "admin".to_string(),
            (Role::User, _) => requester_name.to_string(),
        };
        format!("[{}] {}: {}\n", message.ts, sender, message.text)
    }

    pub fn format_typing(from: Role, typing: bool) -> String {
        if typing {
            format!("... {} is typing\n", from)
        } else {
            format!("... {} stopped typing\n", from)
        }
    }

    pub fn format_presence(admin_count: usize) -> String {
        match admin_count {
            0 => "* no admins online\n".to_string(),
            1 => "* 1 admin online\n".to_string(),
            n => format!("* {} admins online\n", n),
        }
    }

    pub fn format_assigned(assigned_admin: Option<&str>) -> String {
        match assigned_admin {
            Some(admin) => format!("* {} took this chat\n", admin),
            None => "* chat released back to the queue\n".to_string(),
        }
    }

    pub fn format_status(status: ChatStatus) -> String {
        match status {
            ChatStatus::Closed => "* chat closed\n".to_string(),
            ChatStatus::Open => "* chat reopened\n".to_string(),
        }
    }
}
