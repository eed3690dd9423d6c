//! Backend Error Types
//!
//! Error types used by the HTTP layer, plus their conversion into HTTP
//! responses.

pub mod conversion;
pub mod types;

pub use types::BackendError;
