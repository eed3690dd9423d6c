//! Error-to-Response Conversion
//!
//! Maps `BackendError` into the uniform JSON envelope so handlers can
//! return errors with `?`.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;

use super::types::BackendError;
use crate::shared::messaging::ApiResponse;

impl IntoResponse for BackendError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!("request failed: {}", self);
        } else {
            tracing::debug!(status = %status, "request rejected: {}", self);
        }
        let body: ApiResponse<()> = ApiResponse::error(self.message());
        (status, Json(body)).into_response()
    }
}
