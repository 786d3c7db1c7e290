//! Error types for AI diagram operations.

use crate::types::AiProvider;

/// Error from resolving credentials for, or calling, a single provider.
///
/// These kinds are distinguished internally for logging; callers of the
/// [`Orchestrator`](crate::Orchestrator) only see an [`OperationError`].
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    /// No API key is configured or supplied for the provider.
    #[error("{provider} API key is not set")]
    Configuration {
        /// Provider missing a key.
        provider: AiProvider,
    },

    /// The provider has no registered adapter.
    #[error("no adapter registered for provider {0}")]
    Unavailable(AiProvider),

    /// HTTP request failed (network error, timeout, body decoding).
    #[error("HTTP request failed: {0}")]
    HttpRequest(#[from] ureq::Error),

    /// Backend returned an error status.
    #[error("HTTP error: {status} - {body}")]
    HttpResponse {
        /// HTTP status code.
        status: u16,
        /// Response body (may contain error details).
        body: String,
    },

    /// Backend answered without any usable text.
    #[error("{0} returned an empty response")]
    EmptyResponse(AiProvider),
}

impl ProviderError {
    /// Short machine-readable name of the error kind, for structured logs.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Configuration { .. } => "configuration",
            Self::Unavailable(_) => "unavailable",
            Self::HttpRequest(_) => "http_request",
            Self::HttpResponse { .. } => "http_response",
            Self::EmptyResponse(_) => "empty_response",
        }
    }
}

/// Failure of a public orchestrator operation.
///
/// The underlying [`ProviderError`] kind is intentionally collapsed; only its
/// message survives.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum OperationError {
    #[error("Generation failed: {0}")]
    Generation(String),

    #[error("Refinement failed: {0}")]
    Refinement(String),

    #[error("Explanation failed: {0}")]
    Explanation(String),
}

/// Request rejected before reaching a provider.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{field} must be between {min} and {max} characters (got {actual})")]
pub struct ValidationError {
    /// Offending request field.
    pub field: &'static str,
    /// Minimum length in characters.
    pub min: usize,
    /// Maximum length in characters.
    pub max: usize,
    /// Actual length in characters.
    pub actual: usize,
}
