//! Messaging Backend
//!
//! Storage and orchestration for the conversation subsystem:
//!
//! - `schema` - table definitions and bootstrap
//! - `directory` - conversation identity, created idempotently per
//!   participant pair and context
//! - `log` - append-only message log; sole writer of `sequence`
//! - `read_state` - per-participant read watermarks and unread counts
//! - `notify` - new-message notification sink
//! - `service` - the single entry point composing the above with
//!   authorization
//! - `handlers` - HTTP handlers over the service
//!
//! Each store owns its rows: the directory owns conversations, the log
//! owns messages, the tracker owns watermarks. Nothing else mutates them.

pub mod directory;
pub mod handlers;
pub mod log;
pub mod notify;
pub mod read_state;
pub mod schema;
pub mod service;

pub use directory::ConversationDirectory;
pub use log::MessageLog;
pub use notify::{MessageBroadcast, NotificationSink};
pub use read_state::ReadStateTracker;
pub use service::ConversationService;
