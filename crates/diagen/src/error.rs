//! CLI error types.

use diagen_ai::{OperationError, ValidationError};
use diagen_config::ConfigError;
use diagen_export::ExportError;

/// CLI error type.
#[derive(Debug, thiserror::Error)]
pub(crate) enum CliError {
    #[error("{0}")]
    Config(#[from] ConfigError),

    #[error("{0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Operation(#[from] OperationError),

    #[error("{0}")]
    Request(#[from] ValidationError),

    #[error("{0}")]
    Export(#[from] ExportError),

    #[error("{0}")]
    Server(String),
}
