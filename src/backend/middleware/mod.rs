//! Middleware Module
//!
//! Request-processing helpers shared by the HTTP handlers.

pub mod auth;

pub use auth::extract_principal;
