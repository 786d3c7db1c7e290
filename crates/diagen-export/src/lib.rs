//! Diagram export for diagen.
//!
//! Renders diagram source to SVG, PNG, or PDF with an external
//! mermaid-cli compatible renderer:
//! - SVG on a transparent background
//! - PNG on a white background at a configurable scale
//! - PDF by wrapping a high-scale PNG in-process, or by converting SVG through
//!   an HTML shell with an external HTML-to-PDF engine
//!
//! Each renderer invocation is bounded by a timeout and runs in a scratch
//! directory that is removed on every exit path.
//!
//! # Example
//!
//! ```ignore
//! use diagen_config::ExportConfig;
//! use diagen_export::{ExportFormat, Exporter};
//!
//! let exporter = Exporter::from_config(&ExportConfig::default());
//! let artifact = exporter.export("graph TD\nA-->B", ExportFormat::Png, None).await?;
//! std::fs::write(artifact.attachment_filename("flow"), &artifact.bytes)?;
//! ```

mod error;
mod exporter;
mod format;
mod pdf;
mod renderer;
#[cfg(all(test, unix))]
mod testing;

pub use error::ExportError;
pub use exporter::{Exporter, HtmlEngine, PdfCapabilities, SCALE_RANGE};
pub use format::{ExportArtifact, ExportFormat};
pub use pdf::wrap_png;
pub use renderer::Renderer;
