//! Error types for the Observer API server.
//!
//! [`ObserverError`] unifies all failure modes into a single enum that
//! can be converted into an Axum HTTP response via its
//! [`IntoResponse`](axum::response::IntoResponse) implementation.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use conquest_core::IngressError;
use conquest_db::DbError;

/// Errors that can occur in the Observer API layer.
#[derive(Debug, thiserror::Error)]
pub enum ObserverError {
    /// The requested resource was not found.
    #[error("not found: {0}")]
    NotFound(String),

    /// The request body or query was not acceptable.
    #[error("bad request: {0}")]
    BadRequest(String),

    /// The store failed.
    #[error("store error: {0}")]
    Store(#[from] DbError),

    /// An internal error occurred.
    #[error("internal error: {0}")]
    Internal(String),
}

impl From<IngressError> for ObserverError {
    fn from(err: IngressError) -> Self {
        match err {
            IngressError::UnknownPlayer(id) => Self::NotFound(format!("player {id}")),
            IngressError::Store(e) => Self::Store(e),
            other @ (IngressError::Malformed(_)
            | IngressError::Invalid(_)
            | IngressError::EmptyPlayerId
            | IngressError::InvalidPlayerId(_)) => Self::BadRequest(other.to_string()),
        }
    }
}

impl IntoResponse for ObserverError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            Self::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            Self::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            Self::Store(e) => (StatusCode::SERVICE_UNAVAILABLE, format!("store error: {e}")),
            Self::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg.clone()),
        };

        if status.is_server_error() {
            tracing::warn!(%status, error = %message, "Request failed");
        }

        let body = serde_json::json!({
            "error": message,
            "status": status.as_u16(),
        });

        (status, axum::Json(body)).into_response()
    }
}
