//! diagen CLI - AI diagram generator.
//!
//! Provides commands for:
//! - `serve`: Start the HTTP API
//! - `generate`, `refine`, `explain`: One-shot AI operations
//! - `export`: Render a Mermaid file to SVG, PNG, or PDF

mod commands;
mod error;
mod output;

use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use commands::{ExplainArgs, ExportArgs, GenerateArgs, RefineArgs, ServeArgs};
use error::CliError;
use output::Output;

/// Application version from Cargo.toml.
const VERSION: &str = env!("CARGO_PKG_VERSION");

/// diagen - AI diagram generator.
#[derive(Parser)]
#[command(name = "diagen", version, about)]
struct Cli {
    /// Enable verbose output (INFO level logging).
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP API server.
    Serve(ServeArgs),
    /// Generate a diagram from a description.
    Generate(GenerateArgs),
    /// Apply a change to an existing diagram.
    Refine(RefineArgs),
    /// Describe an existing diagram in prose.
    Explain(ExplainArgs),
    /// Render a Mermaid diagram to SVG, PNG, or PDF.
    Export(ExportArgs),
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let output = Output::new();

    // --verbose enables INFO level, otherwise use RUST_LOG or default to WARN
    let filter = if cli.verbose {
        EnvFilter::new("info")
    } else {
        EnvFilter::from_default_env()
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match run(cli.command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            output.error(&format!("Error: {err}"));
            ExitCode::FAILURE
        }
    }
}

fn run(command: Commands) -> Result<(), CliError> {
    match command {
        Commands::Serve(args) => tokio::runtime::Runtime::new()?.block_on(args.execute(VERSION)),
        Commands::Generate(args) => args.execute(),
        Commands::Refine(args) => args.execute(),
        Commands::Explain(args) => args.execute(),
        Commands::Export(args) => tokio::runtime::Runtime::new()?.block_on(args.execute()),
    }
}
