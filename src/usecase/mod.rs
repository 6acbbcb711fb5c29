//! Application usecases: one struct per operation, holding its
//! dependencies behind the domain traits so each can be tested with a
//! fake store or dispatcher.

pub mod assign_chat;
pub mod create_chat;
pub mod delete_chat;
pub mod disconnect;
pub mod export_chat;
pub mod get_chat;
pub mod post_message;
pub mod subscribe_chat;
pub mod typing;
pub mod update_status;

pub use assign_chat::{AssignChatUseCase, UnassignChatUseCase};
pub use create_chat::CreateChatUseCase;
pub use delete_chat::DeleteChatUseCase;
pub use disconnect::DisconnectUseCase;
pub use export_chat::ExportChatUseCase;
pub use get_chat::{GetChatUseCase, ListChatsUseCase};
pub use post_message::PostMessageUseCase;
pub use subscribe_chat::SubscribeChatUseCase;
pub use typing::SetTypingUseCase;
pub use update_status::{MarkReadUseCase, SetStatusUseCase};
