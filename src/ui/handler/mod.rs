//! HTTP and WebSocket endpoint handlers.

mod http;
mod websocket;

pub use http::{
    assign_chat, close_chat, create_chat, delete_chat, export_chat, get_admin_chat, get_chat,
    get_presence, health_check, list_chats, mark_read, post_message, unassign_chat,
};
pub use websocket::websocket_handler;
