//! Error types for the queue server.
//!
//! [`ObserverError`] covers everything that can go wrong between a raw
//! client message and a published snapshot. On a `WebSocket` these are
//! logged and dropped; on `POST /api/operations` they become an HTTP
//! response via the [`IntoResponse`](axum::response::IntoResponse)
//! implementation.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use turnero_core::{DecodeError, Rejection};

/// Errors that can occur while handling an observer's message.
#[derive(Debug, thiserror::Error)]
pub enum ObserverError {
    /// The message could not be decoded into an operation.
    #[error(transparent)]
    Decode(#[from] DecodeError),

    /// The operation failed its precondition; state is unchanged.
    #[error("operation rejected: {0}")]
    Rejected(#[from] Rejection),

    /// A snapshot could not be serialized.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl IntoResponse for ObserverError {
    fn into_response(self) -> Response {
        let status = match &self {
            Self::Decode(_) => StatusCode::BAD_REQUEST,
            Self::Rejected(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::Serialization(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = serde_json::json!({
            "error": self.to_string(),
            "status": status.as_u16(),
        });

        (status, axum::Json(body)).into_response()
    }
}
