//! Error types for diagram export.

use std::time::Duration;

/// Export failure.
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    /// Renderer could not be started, exited non-zero, or wrote no output.
    #[error("Mermaid rendering failed: {0}")]
    Render(String),

    /// Renderer exceeded its wall-clock bound and was killed.
    #[error("Export timeout after {}s", .0.as_secs_f64())]
    Timeout(Duration),

    /// An optional server capability needed for this export is missing.
    #[error("{0}")]
    CapabilityUnavailable(&'static str),

    /// Temporary file I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Rendered raster could not be wrapped into a PDF.
    #[error("Invalid raster image: {0}")]
    InvalidRaster(String),

    /// Requested export format is not supported.
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    /// Requested scale factor is outside the accepted range.
    #[error(
        "Scale must be between {} and {} (got {})",
        crate::SCALE_RANGE.start(),
        crate::SCALE_RANGE.end(),
        .0
    )]
    InvalidScale(u32),
}

impl ExportError {
    /// Whether the failure is a missing optional capability rather than a
    /// renderer or I/O problem.
    #[must_use]
    pub fn is_capability_unavailable(&self) -> bool {
        matches!(self, Self::CapabilityUnavailable(_))
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_render_message_keeps_diagnostics() {
        let err = ExportError::Render("Parse error on line 2".to_owned());
        assert_eq!(err.to_string(), "Mermaid rendering failed: Parse error on line 2");
        assert!(!err.is_capability_unavailable());
    }

    #[test]
    fn test_timeout_message() {
        let err = ExportError::Timeout(Duration::from_millis(1500));
        assert_eq!(err.to_string(), "Export timeout after 1.5s");
    }

    #[test]
    fn test_invalid_scale_message() {
        assert_eq!(
            ExportError::InvalidScale(0).to_string(),
            "Scale must be between 1 and 10 (got 0)"
        );
    }

    #[test]
    fn test_capability_unavailable_is_distinct() {
        let err = ExportError::CapabilityUnavailable("PDF export is not available");
        assert!(err.is_capability_unavailable());
        assert_eq!(err.to_string(), "PDF export is not available");
    }
}
