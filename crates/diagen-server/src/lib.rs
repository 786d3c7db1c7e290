//! HTTP server for diagen.
//!
//! This crate exposes the AI orchestrator and export pipeline over HTTP
//! using axum:
//! - `POST /api/ai/generate`, `/api/ai/refine`, `/api/ai/explain`
//! - `POST /api/export?format=svg|png|pdf`
//! - `GET /` and `GET /health`
//!
//! Per-provider credentials may be overridden for a single request with the
//! `X-Anthropic-Key`, `X-OpenAI-Key`, `X-DeepSeek-Key` headers and their
//! `-Base-Url` counterparts.
//!
//! # Quick Start
//!
//! ```ignore
//! use diagen_config::Config;
//! use diagen_server::{run_server, server_config_from_config};
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = Config::load(None, None).unwrap();
//!     let server_config = server_config_from_config(&config, "0.1.0".to_owned());
//!     run_server(server_config).await.unwrap();
//! }
//! ```

mod app;
mod error;
mod handlers;
mod middleware;
mod state;
#[cfg(test)]
mod testing;

use std::net::SocketAddr;
use std::str::FromStr;
use std::sync::Arc;

use diagen_ai::{Orchestrator, ProviderRegistry};
use diagen_config::{ExportConfig, ProvidersConfig};
use diagen_export::Exporter;
use state::AppState;

pub use error::ServerError;

/// Server configuration.
#[derive(Debug)]
pub struct ServerConfig {
    /// Host address to bind to.
    pub host: String,
    /// Port to listen on.
    pub port: u16,
    /// Server-side provider defaults.
    pub providers: ProvidersConfig,
    /// Export pipeline settings.
    pub export: ExportConfig,
    /// Application version reported by `GET /`.
    pub version: String,
}

/// Run the server.
///
/// # Errors
///
/// Returns an error if the address is invalid or the server fails to start.
pub async fn run_server(config: ServerConfig) -> Result<(), Box<dyn std::error::Error>> {
    let orchestrator = Orchestrator::new(ProviderRegistry::with_defaults(), config.providers);
    let exporter = Exporter::from_config(&config.export);

    let pdf = exporter.pdf_capabilities();
    tracing::info!(
        raster_wrap = pdf.raster_wrap,
        html_engine = pdf.html_engine.is_some(),
        "PDF export capabilities"
    );

    let state = Arc::new(AppState {
        orchestrator: Arc::new(orchestrator),
        exporter,
        version: config.version,
    });

    let app = app::create_router(state);

    let addr = SocketAddr::from_str(&format!("{}:{}", config.host, config.port))?;
    tracing::info!(address = %addr, "Starting server");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

/// Wait for shutdown signal (Ctrl-C).
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for Ctrl+C");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received, stopping server...");
}

/// Create server configuration from diagen config.
#[must_use]
pub fn server_config_from_config(config: &diagen_config::Config, version: String) -> ServerConfig {
    ServerConfig {
        host: config.server.host.clone(),
        port: config.server.port,
        providers: config.providers.clone(),
        export: config.export.clone(),
        version,
    }
}
