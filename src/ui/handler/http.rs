//! HTTP API endpoint handlers.
//!
//! Handlers parse the path and body, call one UseCase and translate the
//! result to a status code. Everything else lives below this layer.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};

use crate::{
    domain::{ChatId, ChatStoreError},
    infrastructure::dto::http::{
        AssignRequest, ChatDto, CloseRequest, CreateChatRequest, CreateChatResponse, ErrorBody,
        MessageDto, PostMessageRequest, PostMessageResponse, PresenceBody,
    },
    ui::state::AppState,
};

/// Wraps a domain error so it can be returned straight from a handler.
pub struct ApiError(ChatStoreError);

impl From<ChatStoreError> for ApiError {
    fn from(e: ChatStoreError) -> Self {
        Self(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            ChatStoreError::Validation(_) => StatusCode::BAD_REQUEST,
            ChatStoreError::NotFound(_) => StatusCode::NOT_FOUND,
            ChatStoreError::Conflict(_) => StatusCode::CONFLICT,
        };
        (
            status,
            Json(ErrorBody {
                error: self.0.to_string(),
            }),
        )
            .into_response()
    }
}

/// Health check endpoint
pub async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({"status": "ok"}))
}

/// Number of admin connections currently watching any chat. Drives the
/// site-wide "support online" indicator.
pub async fn get_presence(State(state): State<Arc<AppState>>) -> Json<PresenceBody> {
    Json(PresenceBody {
        admins_online: state.presence.global_admin_count().await,
    })
}

/// Open a new chat for a requester.
pub async fn create_chat(
    State(state): State<Arc<AppState>>,
    Json(request): Json<CreateChatRequest>,
) -> Result<(StatusCode, Json<CreateChatResponse>), ApiError> {
    let chat = state
        .create_chat_usecase
        .execute(request.name, request.email)
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(CreateChatResponse {
            id: chat.id.to_string(),
        }),
    ))
}

/// Snapshot read used by clients to resume a chat.
pub async fn get_chat(
    State(state): State<Arc<AppState>>,
    Path(chat_id): Path<String>,
) -> Result<Json<ChatDto>, ApiError> {
    let chat_id = ChatId::new(chat_id)?;
    let chat = state.get_chat_usecase.execute(&chat_id).await?;
    Ok(Json(ChatDto::from(&chat)))
}

/// The authoritative write path for messages.
pub async fn post_message(
    State(state): State<Arc<AppState>>,
    Path(chat_id): Path<String>,
    Json(request): Json<PostMessageRequest>,
) -> Result<Json<PostMessageResponse>, ApiError> {
    let chat_id = ChatId::new(chat_id)?;
    let message = state
        .post_message_usecase
        .execute(&chat_id, request.from, request.text, request.author)
        .await?;
    Ok(Json(PostMessageResponse {
        message: MessageDto::from(&message),
    }))
}

/// Admin overview, newest chats first.
pub async fn list_chats(State(state): State<Arc<AppState>>) -> Json<Vec<ChatDto>> {
    let chats = state.list_chats_usecase.execute().await;
    Json(chats.iter().map(ChatDto::from).collect())
}

/// Admin read of a single chat. Same shape as the public read; the admin
/// routes exist so a reverse proxy can gate them separately.
pub async fn get_admin_chat(
    State(state): State<Arc<AppState>>,
    Path(chat_id): Path<String>,
) -> Result<Json<ChatDto>, ApiError> {
    get_chat(State(state), Path(chat_id)).await
}

/// Claim a chat for an admin. The losing side of a concurrent claim
/// receives 409.
pub async fn assign_chat(
    State(state): State<Arc<AppState>>,
    Path(chat_id): Path<String>,
    Json(request): Json<AssignRequest>,
) -> Result<Json<ChatDto>, ApiError> {
    let chat_id = ChatId::new(chat_id)?;
    let chat = state
        .assign_chat_usecase
        .execute(&chat_id, request.admin)
        .await?;
    Ok(Json(ChatDto::from(&chat)))
}

pub async fn unassign_chat(
    State(state): State<Arc<AppState>>,
    Path(chat_id): Path<String>,
) -> Result<Json<ChatDto>, ApiError> {
    let chat_id = ChatId::new(chat_id)?;
    let chat = state.unassign_chat_usecase.execute(&chat_id).await?;
    Ok(Json(ChatDto::from(&chat)))
}

/// Close or reopen a chat.
pub async fn close_chat(
    State(state): State<Arc<AppState>>,
    Path(chat_id): Path<String>,
    Json(request): Json<CloseRequest>,
) -> Result<Json<ChatDto>, ApiError> {
    let chat_id = ChatId::new(chat_id)?;
    let chat = state
        .set_status_usecase
        .execute(&chat_id, request.close)
        .await?;
    Ok(Json(ChatDto::from(&chat)))
}

pub async fn mark_read(
    State(state): State<Arc<AppState>>,
    Path(chat_id): Path<String>,
) -> Result<Json<ChatDto>, ApiError> {
    let chat_id = ChatId::new(chat_id)?;
    let chat = state.mark_read_usecase.execute(&chat_id).await?;
    Ok(Json(ChatDto::from(&chat)))
}

pub async fn delete_chat(
    State(state): State<Arc<AppState>>,
    Path(chat_id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let chat_id = ChatId::new(chat_id)?;
    state.delete_chat_usecase.execute(&chat_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Download the chat history as a plain-text transcript.
pub async fn export_chat(
    State(state): State<Arc<AppState>>,
    Path(chat_id): Path<String>,
) -> Result<Response, ApiError> {
    let chat_id = ChatId::new(chat_id)?;
    let transcript = state.export_chat_usecase.execute(&chat_id).await?;
    let disposition = format!("attachment; filename=\"chat-{}.txt\"", chat_id);
    Ok((
        [
            (header::CONTENT_TYPE, "text/plain; charset=utf-8".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        transcript,
    )
        .into_response())
}
