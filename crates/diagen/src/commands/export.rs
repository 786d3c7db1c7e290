//! `diagen export` command implementation.

use std::path::{Path, PathBuf};

use clap::Args;
use diagen_config::{CliSettings, Config};
use diagen_export::{ExportFormat, Exporter};

use crate::error::CliError;
use crate::output::Output;

/// Arguments for the export command.
#[derive(Args)]
pub(crate) struct ExportArgs {
    /// Mermaid source file.
    file: PathBuf,

    /// Output format: svg, png, or pdf.
    #[arg(short, long, value_parser = parse_export_format, default_value = "svg")]
    format: ExportFormat,

    /// PNG scale factor (overrides config).
    #[arg(short, long, value_parser = clap::value_parser!(u32).range(1..=10))]
    scale: Option<u32>,

    /// Output file (default: input file with the format's extension).
    #[arg(short, long)]
    out: Option<PathBuf>,

    /// Renderer executable (overrides config).
    #[arg(long)]
    renderer: Option<String>,

    /// Path to configuration file (default: auto-discover diagen.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,
}

impl ExportArgs {
    /// Execute the export command.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration fails, the file cannot be read, or
    /// rendering fails.
    pub(crate) async fn execute(self) -> Result<(), CliError> {
        let output = Output::new();

        let cli_settings = CliSettings {
            renderer: self.renderer,
            ..Default::default()
        };
        let config = Config::load(self.config.as_deref(), Some(&cli_settings))?;
        let exporter = Exporter::from_config(&config.export);

        let source = std::fs::read_to_string(&self.file)?;
        output.info(&format!(
            "Exporting {} to {}...",
            self.file.display(),
            self.format
        ));
        let artifact = exporter.export(&source, self.format, self.scale).await?;

        let out = self
            .out
            .unwrap_or_else(|| default_out_path(&self.file, self.format));
        std::fs::write(&out, &artifact.bytes)?;
        output.success(&format!(
            "Wrote {} ({} bytes)",
            out.display(),
            artifact.bytes.len()
        ));
        Ok(())
    }
}

/// Input path with its extension replaced by the export format's.
fn default_out_path(input: &Path, format: ExportFormat) -> PathBuf {
    input.with_extension(format.extension())
}

fn parse_export_format(s: &str) -> Result<ExportFormat, String> {
    s.parse().map_err(|e: diagen_export::ExportError| e.to_string())
}
