//! Shared Module
//!
//! This module contains types and data structures that are shared between
//! the polling client and the backend. These types are used for
//! serialization and communication over the conversation HTTP API.

pub mod error;
pub mod messaging;

pub use error::MessagingError;
pub use messaging::{
    ApiResponse, Conversation, ConversationSummary, Message, ReadWatermark,
};
