//! Bearer Principal Extraction
//!
//! Session issuance and verification belong to the external identity
//! collaborator; by the time a request reaches this server the bearer
//! token IS the verified participant id. Every handler extracts it
//! explicitly and threads it into the service as `caller_id`.

use axum::http::HeaderMap;
use uuid::Uuid;

use crate::backend::error::BackendError;

/// Extract the verified principal from the Authorization header.
pub fn extract_principal(headers: &HeaderMap) -> Result<Uuid, BackendError> {
    let auth_header = headers
        .get("authorization")
        .and_then(|h| h.to_str().ok())
        .ok_or_else(|| BackendError::unauthorized("missing authorization header"))?;

    let token = auth_header
        .strip_prefix("Bearer ")
        .ok_or_else(|| BackendError::unauthorized("malformed authorization header"))?;

    Uuid::parse_str(token.trim())
        .map_err(|_| BackendError::unauthorized("invalid bearer principal"))
}
