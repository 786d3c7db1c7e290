//! Error types for the HTTP server.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use diagen_ai::{OperationError, ValidationError};
use diagen_export::ExportError;
use serde_json::json;

/// Server error type.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// Generation, refinement, or explanation failed.
    #[error(transparent)]
    Operation(#[from] OperationError),

    /// Request failed validation.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Export failed.
    #[error(transparent)]
    Export(#[from] ExportError),

    /// Blocking task panicked or was cancelled.
    #[error("Task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

impl ServerError {
    fn status(&self) -> StatusCode {
        match self {
            Self::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::Export(ExportError::CapabilityUnavailable(_)) => StatusCode::NOT_IMPLEMENTED,
            Self::Export(ExportError::UnsupportedFormat(_) | ExportError::InvalidScale(_)) => {
                StatusCode::BAD_REQUEST
            }
            Self::Operation(_) | Self::Export(_) | Self::Task(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn detail(&self) -> String {
        match self {
            Self::Export(ExportError::CapabilityUnavailable(message)) => (*message).to_owned(),
            Self::Export(ExportError::UnsupportedFormat(_)) => "Unsupported format".to_owned(),
            Self::Export(e @ ExportError::InvalidScale(_)) => e.to_string(),
            Self::Export(e) => format!("Export failed: {e}"),
            other => other.to_string(),
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::warn!(status = status.as_u16(), error = %self, "Request failed");
        }
        (status, axum::Json(json!({"detail": self.detail()}))).into_response()
    }
}
