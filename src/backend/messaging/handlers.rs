//! Messaging HTTP Handlers
//!
//! This module contains the HTTP handlers for the conversation API. Every
//! handler extracts the bearer principal, delegates to the conversation
//! service, and wraps the result in the uniform JSON envelope.

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::HeaderMap;
use axum::Json;
use uuid::Uuid;

use crate::backend::error::BackendError;
use crate::backend::middleware::extract_principal;
use crate::shared::messaging::{
    ApiResponse, Conversation, DeltaQuery, ListConversationsResponse, ListMessagesResponse,
    MarkReadRequest, Message, SendMessageRequest, StartConversationRequest, UnreadCountResponse,
};

use super::service::ConversationService;

/// Create (or fetch) a conversation with another participant
/// `POST /api/conversations`
pub async fn start_conversation(
    State(service): State<Arc<ConversationService>>,
    headers: HeaderMap,
    Json(request): Json<StartConversationRequest>,
) -> Result<Json<ApiResponse<Conversation>>, BackendError> {
    let caller_id = extract_principal(&headers)?;

    let conversation = service
        .start_conversation(caller_id, request.participant_id, request.context_id)
        .await?;

    Ok(Json(ApiResponse::ok(conversation)))
}

/// List the caller's conversations with summaries
/// `GET /api/conversations`
pub async fn list_conversations(
    State(service): State<Arc<ConversationService>>,
    headers: HeaderMap,
) -> Result<Json<ApiResponse<ListConversationsResponse>>, BackendError> {
    let caller_id = extract_principal(&headers)?;

    let conversations = service.list_conversations_with_summary(caller_id).await?;

    Ok(Json(ApiResponse::ok(ListConversationsResponse {
        conversations,
    })))
}

/// Total unread count across the caller's conversations
/// `GET /api/conversations/unread-count`
pub async fn aggregate_unread(
    State(service): State<Arc<ConversationService>>,
    headers: HeaderMap,
) -> Result<Json<ApiResponse<UnreadCountResponse>>, BackendError> {
    let caller_id = extract_principal(&headers)?;

    let unread = service.aggregate_unread(caller_id).await?;

    Ok(Json(ApiResponse::ok(UnreadCountResponse { unread })))
}

/// Send a message
/// `POST /api/conversations/{conversation_id}/messages`
pub async fn send_message(
    State(service): State<Arc<ConversationService>>,
    Path(conversation_id): Path<Uuid>,
    headers: HeaderMap,
    Json(request): Json<SendMessageRequest>,
) -> Result<Json<ApiResponse<Message>>, BackendError> {
    let caller_id = extract_principal(&headers)?;

    let message = service
        .send(caller_id, conversation_id, &request.content)
        .await?;

    Ok(Json(ApiResponse::ok(message)))
}

/// Fetch messages newer than the caller's cursor
/// `GET /api/conversations/{conversation_id}/messages?since=&limit=`
pub async fn fetch_delta(
    State(service): State<Arc<ConversationService>>,
    Path(conversation_id): Path<Uuid>,
    Query(query): Query<DeltaQuery>,
    headers: HeaderMap,
) -> Result<Json<ApiResponse<ListMessagesResponse>>, BackendError> {
    let caller_id = extract_principal(&headers)?;

    let messages = service
        .fetch_delta(
            caller_id,
            conversation_id,
            query.since.unwrap_or(0),
            query.limit,
        )
        .await?;

    Ok(Json(ApiResponse::ok(ListMessagesResponse { messages })))
}

/// Advance the caller's read watermark
/// `PUT /api/conversations/{conversation_id}/read`
pub async fn mark_read(
    State(service): State<Arc<ConversationService>>,
    Path(conversation_id): Path<Uuid>,
    headers: HeaderMap,
    Json(request): Json<MarkReadRequest>,
) -> Result<Json<ApiResponse<()>>, BackendError> {
    let caller_id = extract_principal(&headers)?;

    service
        .mark_read(caller_id, conversation_id, request.upto_sequence)
        .await?;

    Ok(Json(ApiResponse::ok(())))
}
