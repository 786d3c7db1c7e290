//! Application state.
//!
//! Shared state for all request handlers.

use std::sync::Arc;

use diagen_ai::Orchestrator;
use diagen_export::Exporter;

/// Application state shared across all handlers.
pub(crate) struct AppState {
    /// AI operations; shared with blocking worker threads.
    pub(crate) orchestrator: Arc<Orchestrator>,
    /// Diagram exporter.
    pub(crate) exporter: Exporter,
    /// Application version reported by the root endpoint.
    pub(crate) version: String,
}
