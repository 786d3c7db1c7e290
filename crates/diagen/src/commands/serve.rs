//! `diagen serve` command implementation.

use std::path::PathBuf;

use clap::Args;
use diagen_ai::AiProvider;
use diagen_config::{CliSettings, Config};
use diagen_server::{run_server, server_config_from_config};

use crate::error::CliError;
use crate::output::Output;

/// Arguments for the serve command.
#[derive(Args)]
pub(crate) struct ServeArgs {
    /// Path to configuration file (default: auto-discover diagen.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Host to bind to (overrides config).
    #[arg(long)]
    host: Option<String>,

    /// Port to bind to (overrides config).
    #[arg(short, long)]
    port: Option<u16>,

    /// Renderer executable (overrides config).
    #[arg(long)]
    renderer: Option<String>,
}

impl ServeArgs {
    /// Execute the serve command.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration fails or the server fails to start.
    pub(crate) async fn execute(self, version: &str) -> Result<(), CliError> {
        let output = Output::new();

        let cli_settings = CliSettings {
            host: self.host,
            port: self.port,
            renderer: self.renderer,
        };
        let config = Config::load(self.config.as_deref(), Some(&cli_settings))?;

        output.highlight(&format!("diagen {version}"));
        output.info(&format!(
            "Starting server on {}:{}",
            config.server.host, config.server.port
        ));
        if let Some(path) = &config.config_path {
            output.info(&format!("Config: {}", path.display()));
        }
        for provider in AiProvider::ALL {
            let configured = diagen_ai::settings_for(&config.providers, provider)
                .api_key
                .is_some();
            let status = if configured {
                "server key configured"
            } else {
                "requires X-*-Key header"
            };
            output.info(&format!("Provider {provider}: {status}"));
        }
        output.info(&format!("Renderer: {}", config.export.renderer));

        let server_config = server_config_from_config(&config, version.to_owned());
        run_server(server_config)
            .await
            .map_err(|e| CliError::Server(e.to_string()))?;

        Ok(())
    }
}
