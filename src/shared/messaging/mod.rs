//! Messaging Types
//!
//! Data structures for conversations, messages, and read state, plus the
//! request/response DTOs for every conversation API operation.

pub mod conversation;
pub mod message;
pub mod read_state;

pub use conversation::{
    Conversation, ConversationSummary, ListConversationsResponse, StartConversationRequest,
};
pub use message::{DeltaQuery, ListMessagesResponse, Message, SendMessageRequest};
pub use read_state::{MarkReadRequest, ReadWatermark, UnreadCountResponse};

use serde::{Deserialize, Serialize};

/// Uniform JSON envelope returned by every API endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    /// Wrap a successful payload
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    /// Wrap an error message
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
        }
    }
}
