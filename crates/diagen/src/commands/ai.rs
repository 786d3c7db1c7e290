//! `diagen generate`, `diagen refine`, and `diagen explain` command implementations.

use std::path::{Path, PathBuf};

use clap::Args;
use diagen_ai::{
    AiProvider, CredentialOverrides, DiagramFormat, DiagramType, ExplainRequest, GenerateRequest,
    Orchestrator, ProviderRegistry, RefineRequest,
};
use diagen_config::Config;

use crate::error::CliError;
use crate::output::Output;

/// Provider selection and per-call credentials.
#[derive(Args)]
pub(crate) struct ProviderArgs {
    /// AI provider: claude, openai, or deepseek.
    #[arg(short, long, value_parser = parse_provider, default_value = "claude")]
    provider: AiProvider,

    /// API key for this call (overrides config).
    #[arg(long, env = "DIAGEN_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Provider base URL for this call (overrides config).
    #[arg(long)]
    base_url: Option<String>,

    /// Path to configuration file (default: auto-discover diagen.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,
}

impl ProviderArgs {
    fn overrides(&self) -> CredentialOverrides {
        let mut overrides = CredentialOverrides::new();
        if let Some(key) = &self.api_key {
            overrides = overrides.with_api_key(self.provider, key.as_str());
        }
        if let Some(url) = &self.base_url {
            overrides = overrides.with_base_url(self.provider, url.as_str());
        }
        overrides
    }

    fn orchestrator(&self) -> Result<Orchestrator, CliError> {
        let config = Config::load(self.config.as_deref(), None)?;
        Ok(Orchestrator::new(
            ProviderRegistry::with_defaults(),
            config.providers,
        ))
    }
}

/// Arguments for the generate command.
#[derive(Args)]
pub(crate) struct GenerateArgs {
    /// Natural-language description of the diagram.
    description: String,

    /// Diagram type (flowchart, architecture, sequence, gantt, swimlane, er,
    /// class, state, mindmap, roadmap).
    #[arg(short = 't', long = "type", value_parser = parse_diagram_type, default_value = "flowchart")]
    diagram_type: DiagramType,

    /// Output notation: mermaid or drawio.
    #[arg(short, long, value_parser = parse_diagram_format, default_value = "drawio")]
    format: DiagramFormat,

    /// Free-text style hint.
    #[arg(long)]
    style: Option<String>,

    /// Write the diagram to this file instead of stdout.
    #[arg(short, long)]
    out: Option<PathBuf>,

    #[command(flatten)]
    provider: ProviderArgs,
}

impl GenerateArgs {
    /// Execute the generate command.
    ///
    /// # Errors
    ///
    /// Returns an error if the request is invalid or generation fails.
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let output = Output::new();
        let request = GenerateRequest {
            description: self.description,
            diagram_type: self.diagram_type,
            format: self.format,
            provider: self.provider.provider,
            style: self.style,
        };
        request.validate()?;

        output.info(&format!(
            "Generating {} {} with {}...",
            request.format.display_name(),
            request.diagram_type,
            request.provider
        ));
        let code = self
            .provider
            .orchestrator()?
            .generate(&request, &self.provider.overrides())?;
        emit(&output, self.out.as_deref(), &code)
    }
}

/// Arguments for the refine command.
#[derive(Args)]
pub(crate) struct RefineArgs {
    /// Diagram source file.
    file: PathBuf,

    /// What to change.
    instruction: String,

    /// Notation of the file (default: inferred from extension).
    #[arg(short, long, value_parser = parse_diagram_format)]
    format: Option<DiagramFormat>,

    /// Write the result to this file instead of stdout.
    #[arg(short, long)]
    out: Option<PathBuf>,

    #[command(flatten)]
    provider: ProviderArgs,
}

impl RefineArgs {
    /// Execute the refine command.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or refinement fails.
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let output = Output::new();
        let request = RefineRequest {
            code: std::fs::read_to_string(&self.file)?,
            format: self.format.unwrap_or_else(|| infer_format(&self.file)),
            instruction: self.instruction,
            provider: self.provider.provider,
        };
        request.validate()?;

        output.info(&format!("Refining {}...", self.file.display()));
        let code = self
            .provider
            .orchestrator()?
            .refine(&request, &self.provider.overrides())?;
        emit(&output, self.out.as_deref(), &code)
    }
}

/// Arguments for the explain command.
#[derive(Args)]
pub(crate) struct ExplainArgs {
    /// Diagram source file.
    file: PathBuf,

    /// Notation of the file (default: inferred from extension).
    #[arg(short, long, value_parser = parse_diagram_format)]
    format: Option<DiagramFormat>,

    #[command(flatten)]
    provider: ProviderArgs,
}

impl ExplainArgs {
    /// Execute the explain command.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or explanation fails.
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let output = Output::new();
        let request = ExplainRequest {
            code: std::fs::read_to_string(&self.file)?,
            format: self.format.unwrap_or_else(|| infer_format(&self.file)),
            provider: self.provider.provider,
        };

        let explanation = self
            .provider
            .orchestrator()?
            .explain(&request, &self.provider.overrides())?;
        output.result(&explanation)?;
        Ok(())
    }
}

/// Write `text` to `out`, or to stdout when no path is given.
fn emit(output: &Output, out: Option<&Path>, text: &str) -> Result<(), CliError> {
    match out {
        Some(path) => {
            std::fs::write(path, text)?;
            output.success(&format!("Wrote {}", path.display()));
        }
        None => output.result(text)?,
    }
    Ok(())
}

/// Guess the notation of a diagram file from its extension.
fn infer_format(path: &Path) -> DiagramFormat {
    match path.extension().and_then(|ext| ext.to_str()) {
        Some("mmd" | "mermaid") => DiagramFormat::Mermaid,
        _ => DiagramFormat::Drawio,
    }
}

fn parse_provider(s: &str) -> Result<AiProvider, String> {
    AiProvider::parse(s).ok_or_else(|| {
        let known: Vec<_> = AiProvider::ALL.iter().map(|p| p.as_str()).collect();
        format!("expected one of: {}", known.join(", "))
    })
}

fn parse_diagram_type(s: &str) -> Result<DiagramType, String> {
    DiagramType::parse(s).ok_or_else(|| {
        let known: Vec<_> = DiagramType::ALL.iter().map(|t| t.as_str()).collect();
        format!("expected one of: {}", known.join(", "))
    })
}

fn parse_diagram_format(s: &str) -> Result<DiagramFormat, String> {
    DiagramFormat::parse(s).ok_or_else(|| "expected mermaid or drawio".to_owned())
}
