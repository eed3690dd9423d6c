//! API Route Handlers
//!
//! This module wires the conversation API endpoints:
//!
//! - `POST /api/conversations` - create (or fetch) a conversation
//! - `GET  /api/conversations` - list conversations with summaries
//! - `GET  /api/conversations/unread-count` - total unread count
//! - `POST /api/conversations/{conversation_id}/messages` - send a message
//! - `GET  /api/conversations/{conversation_id}/messages` - fetch a delta
//! - `PUT  /api/conversations/{conversation_id}/read` - advance the read
//!   watermark
//!
//! Every route requires a bearer principal in the `Authorization` header;
//! the check lives in the handlers.

use axum::Router;

use crate::backend::messaging::handlers::{
    aggregate_unread, fetch_delta, list_conversations, mark_read, send_message,
    start_conversation,
};
use crate::backend::server::state::AppState;

/// Configure API routes
pub fn configure_api_routes(router: Router<AppState>) -> Router<AppState> {
    router
        // Conversations endpoints
        .route(
            "/api/conversations",
            axum::routing::post(start_conversation).get(list_conversations),
        )
        .route(
            "/api/conversations/unread-count",
            axum::routing::get(aggregate_unread),
        )
        // Messages endpoints
        .route(
            "/api/conversations/{conversation_id}/messages",
            axum::routing::post(send_message).get(fetch_delta),
        )
        // Read-state endpoint
        .route(
            "/api/conversations/{conversation_id}/read",
            axum::routing::put(mark_read),
        )
}
