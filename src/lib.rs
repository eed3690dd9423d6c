//! Servilink - Main Library
//!
//! Servilink is the messaging core of a two-party services marketplace:
//! clients and professionals exchange ordered messages inside conversations,
//! track read state through per-participant watermarks, and stay synchronized
//! by polling the server for deltas on a fixed interval.
//!
//! # Overview
//!
//! This library provides:
//! - Conversation identity with idempotent creation (one conversation per
//!   participant pair and service-request context)
//! - An append-only, per-conversation message log that assigns the
//!   authoritative message order
//! - Read watermarks and derived unread counts
//! - An HTTP API exposing the messaging operations
//! - A polling client that fetches deltas, reconciles a local ordered view,
//!   and drives read-state advancement
//!
//! # Module Structure
//!
//! The library is organized into three main modules:
//!
//! - **`shared`** - Types shared between the server and the polling client
//!   - Conversation, message, and watermark structures
//!   - Request/response DTOs for every API operation
//!   - The messaging error taxonomy
//!
//! - **`backend`** - Server-side code
//!   - Axum HTTP server with the conversation API
//!   - SQLite persistence for conversations, messages, and watermarks
//!   - Per-conversation notification broadcasting
//!
//! - **`client`** - Polling client
//!   - Thin REST client over the conversation API
//!   - Fixed-interval delta poller with cancellation
//!   - Local ordered message view with optimistic send reconciliation
//!
//! # Ordering Model
//!
//! Every message carries a server-assigned, per-conversation `sequence`:
//! a strictly increasing, gapless integer that is the single source of
//! truth for message order. Timestamps are informational only. Clients poll
//! with their last seen sequence and receive only newer messages, so two
//! readers always observe the same total order.
//!
//! # Thread Safety
//!
//! - **Server**: state is shared across handlers via `Arc`; sequence
//!   assignment is serialized per conversation by a single-row counter
//!   update inside a transaction.
//! - **Client**: each conversation's poller is an independent task with its
//!   own cancellation channel; stopping one never blocks another.

/// Shared types and data structures
pub mod shared;

/// Backend server-side code
pub mod backend;

/// Polling client
pub mod client;
