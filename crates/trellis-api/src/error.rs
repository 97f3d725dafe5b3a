//! Error-to-response mapping.
//!
//! Every failure leaving a handler becomes `{ "error": "<message>" }` with
//! the status implied by the core taxonomy. Store failures are logged and
//! surfaced generically; their internals never reach the wire.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use trellis_core::Error as CoreError;

/// Error response body.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
}

/// Transport wrapper around the core error taxonomy.
#[derive(Debug)]
pub struct ApiError(pub CoreError);

impl From<CoreError> for ApiError {
    fn from(error: CoreError) -> Self {
        Self(error)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self.0 {
            CoreError::Validation(_) => (StatusCode::BAD_REQUEST, self.0.to_string()),
            CoreError::Authentication => (StatusCode::UNAUTHORIZED, self.0.to_string()),
            CoreError::Authorization => (StatusCode::FORBIDDEN, self.0.to_string()),
            CoreError::NotFound(_) => (StatusCode::NOT_FOUND, self.0.to_string()),
            CoreError::Conflict(_) => (StatusCode::CONFLICT, self.0.to_string()),
            CoreError::Store(_) => {
                tracing::error!(error = %self.0, "request failed in the store");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal server error".to_string(),
                )
            }
        };

        (status, Json(ErrorBody { error: message })).into_response()
    }
}
