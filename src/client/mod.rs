//! Polling Client
//!
//! Client-side counterpart of the conversation API:
//!
//! - `api` - thin REST client with bearer authentication
//! - `poller` - fixed-interval delta polling with cancellation
//! - `view` - local ordered message view with optimistic send
//!   reconciliation
//!
//! There is no persistent connection: an open conversation is kept in sync
//! by asking the server for messages newer than the highest sequence seen
//! so far, every few seconds. Each conversation's poller is an independent
//! task; stopping one never affects another.

pub mod api;
pub mod poller;
pub mod view;

pub use api::{ApiClient, ClientConfig};
pub use poller::{PollOptions, PollerEvent, PollerHandle, SyncPoller};
pub use view::ConversationView;
