//! Export pipeline: SVG, PNG, and PDF from diagram source.

use std::ops::RangeInclusive;
use std::path::PathBuf;
use std::time::Duration;

use diagen_config::ExportConfig;
use tokio::process::Command;
use tracing::{info, warn};

use crate::error::ExportError;
use crate::format::{ExportArtifact, ExportFormat};
use crate::pdf;
use crate::renderer::{self, RenderTarget, Renderer};

/// Returned when neither PDF conversion path is available.
const PDF_UNAVAILABLE: &str =
    "PDF export requires raster wrapping or an HTML-to-PDF engine to be enabled";

/// Scale factors accepted by [`Exporter::export`].
pub const SCALE_RANGE: RangeInclusive<u32> = 1..=10;

/// External HTML-to-PDF converter, invoked as `<program> <args..> <in.html> <out.pdf>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HtmlEngine {
    pub program: PathBuf,
    pub args: Vec<String>,
}

/// PDF conversion paths available on this server.
///
/// Resolved once at startup; export never probes for them at call time.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PdfCapabilities {
    /// Wrap a rendered PNG in-process (primary path).
    pub raster_wrap: bool,
    /// Convert rendered SVG through an HTML shell (fallback path).
    pub html_engine: Option<HtmlEngine>,
}

impl PdfCapabilities {
    /// Resolve capabilities from configuration, looking up the HTML engine
    /// on `PATH`.
    #[must_use]
    pub fn detect(config: &ExportConfig) -> Self {
        let html_engine = config.html_engine.as_deref().and_then(|name| {
            match which::which(name) {
                Ok(program) => Some(HtmlEngine {
                    program,
                    args: Vec::new(),
                }),
                Err(e) => {
                    info!(engine = name, error = %e, "HTML-to-PDF engine not available");
                    None
                }
            }
        });
        Self {
            raster_wrap: config.pdf_raster,
            html_engine,
        }
    }

    /// Whether any PDF path is available.
    #[must_use]
    pub fn any(&self) -> bool {
        self.raster_wrap || self.html_engine.is_some()
    }
}

/// Diagram exporter.
#[derive(Debug, Clone)]
pub struct Exporter {
    renderer: Renderer,
    png_scale: u32,
    pdf_scale: u32,
    pdf: PdfCapabilities,
}

impl Exporter {
    /// Create an exporter, detecting PDF capabilities.
    #[must_use]
    pub fn from_config(config: &ExportConfig) -> Self {
        Self::with_capabilities(config, PdfCapabilities::detect(config))
    }

    /// Create an exporter with explicit PDF capabilities.
    #[must_use]
    pub fn with_capabilities(config: &ExportConfig, pdf: PdfCapabilities) -> Self {
        Self {
            renderer: Renderer::from_config(config),
            png_scale: config.png_scale,
            pdf_scale: config.pdf_scale,
            pdf,
        }
    }

    /// Replace the per-invocation timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.renderer = self.renderer.with_timeout(timeout);
        self
    }

    /// PDF conversion paths this exporter uses.
    #[must_use]
    pub fn pdf_capabilities(&self) -> &PdfCapabilities {
        &self.pdf
    }

    /// Export `source` to `format`.
    ///
    /// `scale` overrides the configured PNG scale factor and is ignored for
    /// other formats. A scale outside [`SCALE_RANGE`] is rejected before the
    /// renderer runs.
    pub async fn export(
        &self,
        source: &str,
        format: ExportFormat,
        scale: Option<u32>,
    ) -> Result<ExportArtifact, ExportError> {
        if let Some(scale) = scale.filter(|s| !SCALE_RANGE.contains(s)) {
            return Err(ExportError::InvalidScale(scale));
        }

        let bytes = match format {
            ExportFormat::Svg => self.renderer.render(source, RenderTarget::Svg).await?,
            ExportFormat::Png => {
                let scale = scale.unwrap_or(self.png_scale);
                self.renderer
                    .render(source, RenderTarget::Png { scale })
                    .await?
            }
            ExportFormat::Pdf => self.export_pdf(source).await?,
        };
        info!(%format, size = bytes.len(), "Exported diagram");
        Ok(ExportArtifact { bytes, format })
    }

    async fn export_pdf(&self, source: &str) -> Result<Vec<u8>, ExportError> {
        if self.pdf.raster_wrap {
            let target = RenderTarget::Png {
                scale: self.pdf_scale,
            };
            let png = self.renderer.render(source, target).await?;
            return pdf::wrap_png(&png);
        }

        if let Some(engine) = &self.pdf.html_engine {
            let svg = self.renderer.render(source, RenderTarget::Svg).await?;
            return self.html_to_pdf(engine, &svg).await;
        }

        warn!("PDF export requested but no conversion path is available");
        Err(ExportError::CapabilityUnavailable(PDF_UNAVAILABLE))
    }

    async fn html_to_pdf(&self, engine: &HtmlEngine, svg: &[u8]) -> Result<Vec<u8>, ExportError> {
        let scratch = renderer::scratch_dir(self.renderer.temp_root())?;
        let input = scratch.path().join("diagram.html");
        let output = scratch.path().join("diagram.pdf");
        tokio::fs::write(&input, html_shell(&String::from_utf8_lossy(svg))).await?;

        let mut command = Command::new(&engine.program);
        command.args(&engine.args).arg(&input).arg(&output);

        let program = engine.program.display().to_string();
        info!(engine = %program, "Converting HTML to PDF");
        renderer::run(command, &program, self.renderer.timeout()).await?;
        renderer::read_output(&output).await
    }
}

/// Minimal HTML page embedding an SVG document.
fn html_shell(svg: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"UTF-8\">\n<style>\n\
         body {{ margin: 0; padding: 20px; }}\n\
         svg {{ max-width: 100%; height: auto; }}\n\
         </style>\n</head>\n<body>\n{svg}\n</body>\n</html>\n"
    )
}
