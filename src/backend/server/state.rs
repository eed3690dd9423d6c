//! Application State Management
//!
//! This module defines the application state structure and implements the
//! necessary `FromRef` traits for Axum state extraction.
//!
//! # Thread Safety
//!
//! All state is designed to be thread-safe: the conversation service is
//! shared behind an `Arc`, and the notification broadcast clones cheaply
//! (its channel map lives behind an `Arc` internally).

use std::sync::Arc;

use axum::extract::FromRef;

use crate::backend::messaging::notify::MessageBroadcast;
use crate::backend::messaging::service::ConversationService;

/// Application state that holds the conversation service and the
/// notification broadcast.
///
/// Axum handlers extract the parts they need via `FromRef` instead of
/// taking the whole state.
#[derive(Clone)]
pub struct AppState {
    /// The messaging entry point used by every handler
    pub service: Arc<ConversationService>,

    /// Per-conversation broadcast channels fed by the service's
    /// notification sink
    pub message_broadcast: MessageBroadcast,
}

/// Allow handlers to extract `Arc<ConversationService>` directly.
impl FromRef<AppState> for Arc<ConversationService> {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.service.clone()
    }
}

/// Allow handlers to extract the notification broadcast directly.
impl FromRef<AppState> for MessageBroadcast {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.message_broadcast.clone()
    }
}
