//! Shared server state.

use std::sync::Arc;

use crate::domain::{ChatRepository, EventDispatcher};
use crate::infrastructure::{PresenceTracker, SubscriptionRegistry};
use crate::usecase::{
    AssignChatUseCase, CreateChatUseCase, DeleteChatUseCase, DisconnectUseCase, ExportChatUseCase,
    GetChatUseCase, ListChatsUseCase, MarkReadUseCase, PostMessageUseCase, SetStatusUseCase,
    SetTypingUseCase, SubscribeChatUseCase, UnassignChatUseCase,
};

/// Shared application state: one UseCase instance per operation, plus the
/// registry the socket handler needs to register raw connections and the
/// presence tracker backing the global "support online" read.
pub struct AppState {
    pub create_chat_usecase: Arc<CreateChatUseCase>,
    pub get_chat_usecase: Arc<GetChatUseCase>,
    pub list_chats_usecase: Arc<ListChatsUseCase>,
    pub post_message_usecase: Arc<PostMessageUseCase>,
    pub assign_chat_usecase: Arc<AssignChatUseCase>,
    pub unassign_chat_usecase: Arc<UnassignChatUseCase>,
    pub set_status_usecase: Arc<SetStatusUseCase>,
    pub mark_read_usecase: Arc<MarkReadUseCase>,
    pub delete_chat_usecase: Arc<DeleteChatUseCase>,
    pub export_chat_usecase: Arc<ExportChatUseCase>,
    pub subscribe_chat_usecase: Arc<SubscribeChatUseCase>,
    pub set_typing_usecase: Arc<SetTypingUseCase>,
    pub disconnect_usecase: Arc<DisconnectUseCase>,
    pub registry: Arc<SubscriptionRegistry>,
    pub presence: Arc<PresenceTracker>,
}

impl AppState {
    /// Wire every UseCase from the four shared components.
    pub fn wire(
        repository: Arc<dyn ChatRepository>,
        registry: Arc<SubscriptionRegistry>,
        presence: Arc<PresenceTracker>,
        dispatcher: Arc<dyn EventDispatcher>,
    ) -> Self {
        Self {
            create_chat_usecase: Arc::new(CreateChatUseCase::new(repository.clone())),
            get_chat_usecase: Arc::new(GetChatUseCase::new(repository.clone())),
            list_chats_usecase: Arc::new(ListChatsUseCase::new(repository.clone())),
            post_message_usecase: Arc::new(PostMessageUseCase::new(
                repository.clone(),
                dispatcher.clone(),
            )),
            assign_chat_usecase: Arc::new(AssignChatUseCase::new(
                repository.clone(),
                dispatcher.clone(),
            )),
            unassign_chat_usecase: Arc::new(UnassignChatUseCase::new(
                repository.clone(),
                dispatcher.clone(),
            )),
            set_status_usecase: Arc::new(SetStatusUseCase::new(
                repository.clone(),
                dispatcher.clone(),
            )),
            mark_read_usecase: Arc::new(MarkReadUseCase::new(repository.clone())),
            delete_chat_usecase: Arc::new(DeleteChatUseCase::new(repository.clone())),
            export_chat_usecase: Arc::new(ExportChatUseCase::new(repository.clone())),
            subscribe_chat_usecase: Arc::new(SubscribeChatUseCase::new(
                repository,
                registry.clone(),
                presence.clone(),
                dispatcher.clone(),
            )),
            set_typing_usecase: Arc::new(SetTypingUseCase::new(presence.clone(), dispatcher.clone())),
            disconnect_usecase: Arc::new(DisconnectUseCase::new(
                registry.clone(),
                presence.clone(),
                dispatcher,
            )),
            registry,
            presence,
        }
    }
}
