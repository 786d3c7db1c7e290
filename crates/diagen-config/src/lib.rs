//! Configuration management for diagen.
//!
//! Parses `diagen.toml` configuration files with serde and provides
//! auto-discovery of config files in parent directories.
//!
//! CLI settings can be applied during load via [`CliSettings`].
//!
//! ## Environment Variable Expansion
//!
//! String configuration values support environment variable expansion:
//!
//! - `${VAR}` - expands to the value of VAR, errors if unset
//! - `${VAR:-default}` - expands to VAR if set, otherwise uses default
//!
//! Expanded fields:
//! - `server.host`
//! - `providers.<name>.api_key`
//! - `providers.<name>.base_url`
//! - `export.renderer`
//! - `export.html_engine`
//!
//! ## Provider keys
//!
//! A provider without an `api_key` in the file falls back to the conventional
//! environment variable (`ANTHROPIC_API_KEY`, `OPENAI_API_KEY`,
//! `DEEPSEEK_API_KEY`). Per-request overrides are not configuration; they are
//! resolved per call by `diagen-ai`.

mod expand;

use serde::Deserialize;
use std::path::{Path, PathBuf};

/// CLI settings that override configuration file values.
///
/// All fields are optional. Only non-None values override the loaded config.
#[derive(Debug, Default)]
pub struct CliSettings {
    /// Override server host.
    pub host: Option<String>,
    /// Override server port.
    pub port: Option<u16>,
    /// Override the diagram renderer command.
    pub renderer: Option<String>,
}

/// Configuration filename to search for.
const CONFIG_FILENAME: &str = "diagen.toml";

/// Application configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Server configuration.
    pub server: ServerConfig,
    /// AI provider defaults.
    pub providers: ProvidersConfig,
    /// Export pipeline configuration.
    pub export: ExportConfig,

    /// Path to the config file (set after loading).
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

/// Server configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Server host address.
    pub host: String,
    /// Server port.
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_owned(),
            port: 8000,
        }
    }
}

/// Server-side defaults for every AI provider.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct ProvidersConfig {
    /// Anthropic Claude.
    pub claude: ProviderConfig,
    /// `OpenAI`.
    pub openai: ProviderConfig,
    /// `DeepSeek`.
    pub deepseek: ProviderConfig,
}

/// Server-side defaults for a single provider.
#[derive(Default, Clone, Deserialize)]
#[serde(default)]
pub struct ProviderConfig {
    /// API key used when a request carries no override.
    pub api_key: Option<String>,
    /// Base URL replacing the provider's built-in endpoint.
    pub base_url: Option<String>,
    /// Model id replacing the provider's built-in default.
    pub model: Option<String>,
}

impl std::fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .finish()
    }
}

/// Export pipeline configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    /// Renderer executable (mermaid-cli by default).
    pub renderer: String,
    /// Arguments placed before the renderer's own flags (e.g. `npx` wrappers).
    pub renderer_args: Vec<String>,
    /// Wall-clock bound for a single renderer invocation.
    pub timeout_secs: u64,
    /// Default PNG scale factor.
    pub png_scale: u32,
    /// PNG scale factor used as PDF input.
    pub pdf_scale: u32,
    /// Whether PDFs may be produced by wrapping a rendered PNG.
    pub pdf_raster: bool,
    /// HTML-to-PDF engine used as the PDF fallback (`None` disables it).
    pub html_engine: Option<String>,
    /// Directory for per-render temporary directories (system default if unset).
    pub temp_dir: Option<PathBuf>,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            renderer: "mmdc".to_owned(),
            renderer_args: Vec::new(),
            timeout_secs: 30,
            png_scale: 2,
            pdf_scale: 3,
            pdf_raster: true,
            html_engine: Some("weasyprint".to_owned()),
            temp_dir: None,
        }
    }
}

/// Configuration error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File not found.
    #[error("Configuration file not found: {}", .0.display())]
    NotFound(PathBuf),
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parsing error.
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),
    /// Validation error.
    #[error("Configuration error: {0}")]
    Validation(String),
    /// Environment variable error during expansion.
    #[error("Environment variable error in {field}: {message}")]
    EnvVar {
        /// Config field path (e.g., "`providers.openai.api_key`").
        field: String,
        /// Error message (e.g., "${`OPENAI_API_KEY`} not set").
        message: String,
    },
}

/// Require a string field to be non-empty.
fn require_non_empty(value: &str, field: &str) -> Result<(), ConfigError> {
    if value.is_empty() {
        return Err(ConfigError::Validation(format!("{field} cannot be empty")));
    }
    Ok(())
}

/// Require a URL field to use http:// or https:// scheme.
fn require_http_url(url: &str, field: &str) -> Result<(), ConfigError> {
    if !url.starts_with("http://") && !url.starts_with("https://") {
        return Err(ConfigError::Validation(format!(
            "{field} must start with http:// or https://"
        )));
    }
    Ok(())
}

/// Require an integer field to fall inside `min..=max`.
fn require_range(value: u64, min: u64, max: u64, field: &str) -> Result<(), ConfigError> {
    if value < min || value > max {
        return Err(ConfigError::Validation(format!(
            "{field} must be between {min} and {max}"
        )));
    }
    Ok(())
}

impl Config {
    /// Load configuration from file with optional CLI settings.
    ///
    /// If `config_path` is provided, loads from that file.
    /// Otherwise, searches for `diagen.toml` in current directory and parents.
    ///
    /// CLI settings are applied last, allowing CLI arguments to take
    /// precedence over config file values.
    ///
    /// # Errors
    ///
    /// Returns error if explicit `config_path` doesn't exist, parsing fails,
    /// or the resulting configuration is invalid.
    pub fn load(
        config_path: Option<&Path>,
        cli_settings: Option<&CliSettings>,
    ) -> Result<Self, ConfigError> {
        let mut config = if let Some(path) = config_path {
            if !path.exists() {
                return Err(ConfigError::NotFound(path.to_path_buf()));
            }
            Self::load_from_file(path)?
        } else if let Some(discovered) = Self::discover_config() {
            Self::load_from_file(&discovered)?
        } else {
            Self::default()
        };

        config.apply_key_fallbacks(|var| std::env::var(var).ok());

        if let Some(settings) = cli_settings {
            config.apply_cli_settings(settings);
        }

        config.validate()?;
        Ok(config)
    }

    /// Apply CLI settings to the configuration.
    fn apply_cli_settings(&mut self, settings: &CliSettings) {
        if let Some(host) = &settings.host {
            self.server.host.clone_from(host);
        }
        if let Some(port) = settings.port {
            self.server.port = port;
        }
        if let Some(renderer) = &settings.renderer {
            self.export.renderer.clone_from(renderer);
        }
    }

    /// Fill missing or empty provider keys from conventional env variables.
    fn apply_key_fallbacks(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let providers = [
            (&mut self.providers.claude, "ANTHROPIC_API_KEY"),
            (&mut self.providers.openai, "OPENAI_API_KEY"),
            (&mut self.providers.deepseek, "DEEPSEEK_API_KEY"),
        ];
        for (provider, var) in providers {
            if provider.api_key.as_deref().is_none_or(str::is_empty) {
                provider.api_key = lookup(var).filter(|key| !key.is_empty());
            }
        }
    }

    /// Search for config file in current directory and parents.
    fn discover_config() -> Option<PathBuf> {
        let mut current = std::env::current_dir().ok()?;
        loop {
            let candidate = current.join(CONFIG_FILENAME);
            if candidate.exists() {
                return Some(candidate);
            }
            if !current.pop() {
                return None;
            }
        }
    }

    /// Load configuration from a specific file.
    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let mut config: Self = toml::from_str(&content)?;

        config.expand_env_vars()?;

        let config_dir = path.parent().unwrap_or(Path::new("."));
        config.export.temp_dir = config.export.temp_dir.map(|dir| config_dir.join(dir));
        config.config_path = Some(path.to_path_buf());

        Ok(config)
    }

    /// Validate configuration values.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if any validation fails.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.validate_server()?;
        self.validate_providers()?;
        self.validate_export()?;
        Ok(())
    }

    /// Validate server configuration.
    fn validate_server(&self) -> Result<(), ConfigError> {
        require_non_empty(&self.server.host, "server.host")?;

        if self.server.port == 0 {
            return Err(ConfigError::Validation(
                "server.port cannot be 0".to_owned(),
            ));
        }

        Ok(())
    }

    /// Validate provider base URLs (keys may legitimately be absent).
    fn validate_providers(&self) -> Result<(), ConfigError> {
        let providers = [
            (&self.providers.claude, "providers.claude.base_url"),
            (&self.providers.openai, "providers.openai.base_url"),
            (&self.providers.deepseek, "providers.deepseek.base_url"),
        ];
        for (provider, field) in providers {
            if let Some(ref base_url) = provider.base_url {
                require_non_empty(base_url, field)?;
                require_http_url(base_url, field)?;
            }
        }
        Ok(())
    }

    /// Validate export configuration.
    fn validate_export(&self) -> Result<(), ConfigError> {
        require_non_empty(&self.export.renderer, "export.renderer")?;
        require_range(self.export.timeout_secs, 1, 600, "export.timeout_secs")?;
        require_range(self.export.png_scale.into(), 1, 10, "export.png_scale")?;
        require_range(self.export.pdf_scale.into(), 1, 10, "export.pdf_scale")?;
        if let Some(ref engine) = self.export.html_engine {
            require_non_empty(engine, "export.html_engine")?;
        }
        Ok(())
    }

    /// Expand environment variable references in configuration strings.
    fn expand_env_vars(&mut self) -> Result<(), ConfigError> {
        self.server.host = expand::expand_env(&self.server.host, "server.host")?;

        let providers = [
            (&mut self.providers.claude, "providers.claude"),
            (&mut self.providers.openai, "providers.openai"),
            (&mut self.providers.deepseek, "providers.deepseek"),
        ];
        for (provider, prefix) in providers {
            if let Some(ref key) = provider.api_key {
                provider.api_key = Some(expand::expand_env(key, &format!("{prefix}.api_key"))?);
            }
            if let Some(ref url) = provider.base_url {
                provider.base_url =
                    Some(expand::expand_env(url, &format!("{prefix}.base_url"))?);
            }
        }

        self.export.renderer = expand::expand_env(&self.export.renderer, "export.renderer")?;
        if let Some(ref engine) = self.export.html_engine {
            self.export.html_engine = Some(expand::expand_env(engine, "export.html_engine")?);
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use pretty_assertions::assert_eq;

    use super::*;

    fn assert_validation_error(config: &Config, needles: &[&str]) {
        let err = config.validate().unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)), "got {err:?}");
        let message = err.to_string();
        for needle in needles {
            assert!(message.contains(needle), "{message:?} missing {needle:?}");
        }
    }

    fn write_config(dir: &Path, content: &str) -> PathBuf {
        let path = dir.join(CONFIG_FILENAME);
        std::fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 8000);
        assert_eq!(config.export.renderer, "mmdc");
        assert_eq!(config.export.timeout_secs, 30);
        assert_eq!(config.export.png_scale, 2);
        assert_eq!(config.export.pdf_scale, 3);
        assert!(config.export.pdf_raster);
        assert_eq!(config.export.html_engine.as_deref(), Some("weasyprint"));
        assert!(config.providers.openai.api_key.is_none());
        assert!(config.config_path.is_none());
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_config(
            dir.path(),
            r#"
[server]
port = 9000

[providers.deepseek]
api_key = "ds-key"
base_url = "https://deepseek.internal/v1"
model = "deepseek-chat"

[export]
renderer = "npx"
renderer_args = ["-y", "@mermaid-js/mermaid-cli"]
timeout_secs = 45
temp_dir = "tmp"
"#,
        );

        let config = Config::load(Some(&path), None).unwrap();
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.providers.deepseek.api_key.as_deref(), Some("ds-key"));
        assert_eq!(
            config.providers.deepseek.base_url.as_deref(),
            Some("https://deepseek.internal/v1")
        );
        assert_eq!(config.providers.deepseek.model.as_deref(), Some("deepseek-chat"));
        assert_eq!(config.export.renderer, "npx");
        assert_eq!(config.export.renderer_args, ["-y", "@mermaid-js/mermaid-cli"]);
        assert_eq!(config.export.timeout_secs, 45);
        assert_eq!(config.export.temp_dir, Some(dir.path().join("tmp")));
        assert_eq!(config.config_path, Some(path));
    }

    #[test]
    fn test_load_missing_explicit_path() {
        let err = Config::load(Some(Path::new("/nonexistent/diagen.toml")), None).unwrap_err();
        assert!(matches!(err, ConfigError::NotFound(_)));
    }

    #[test]
    fn test_load_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_config(dir.path(), "[server\nport = 1");
        let err = Config::load(Some(&path), None).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_cli_settings_override() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_config(dir.path(), "[server]\nhost = \"0.0.0.0\"\nport = 9000\n");
        let settings = CliSettings {
            host: None,
            port: Some(9100),
            renderer: Some("/opt/mmdc".to_owned()),
        };

        let config = Config::load(Some(&path), Some(&settings)).unwrap();
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 9100);
        assert_eq!(config.export.renderer, "/opt/mmdc");
    }

    #[test]
    fn test_key_fallbacks_fill_missing_keys_only() {
        let mut config = Config::default();
        config.providers.openai.api_key = Some("from-file".to_owned());
        config.providers.claude.api_key = Some(String::new());
        let env: HashMap<&str, &str> = [
            ("ANTHROPIC_API_KEY", "from-env-anthropic"),
            ("OPENAI_API_KEY", "from-env-openai"),
        ]
        .into_iter()
        .collect();

        config.apply_key_fallbacks(|var| env.get(var).map(|v| (*v).to_owned()));

        assert_eq!(
            config.providers.claude.api_key.as_deref(),
            Some("from-env-anthropic")
        );
        assert_eq!(config.providers.openai.api_key.as_deref(), Some("from-file"));
        assert_eq!(config.providers.deepseek.api_key, None);
    }

    #[test]
    fn test_validate_default_config_passes() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn test_validate_server_host_empty() {
        let mut config = Config::default();
        config.server.host = String::new();
        assert_validation_error(&config, &["server.host", "empty"]);
    }

    #[test]
    fn test_validate_server_port_zero() {
        let mut config = Config::default();
        config.server.port = 0;
        assert_validation_error(&config, &["server.port"]);
    }

    #[test]
    fn test_validate_provider_base_url_scheme() {
        let mut config = Config::default();
        config.providers.openai.base_url = Some("ftp://proxy.example.com".to_owned());
        assert_validation_error(&config, &["providers.openai.base_url", "http"]);
    }

    #[test]
    fn test_validate_provider_base_url_valid() {
        let mut config = Config::default();
        config.providers.claude.base_url = Some("http://localhost:8080".to_owned());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_export_timeout_bounds() {
        let mut config = Config::default();
        config.export.timeout_secs = 0;
        assert_validation_error(&config, &["export.timeout_secs", "between"]);
        config.export.timeout_secs = 601;
        assert_validation_error(&config, &["export.timeout_secs"]);
    }

    #[test]
    fn test_validate_export_scale_bounds() {
        let mut config = Config::default();
        config.export.pdf_scale = 11;
        assert_validation_error(&config, &["export.pdf_scale"]);
    }

    #[test]
    fn test_validate_export_renderer_empty() {
        let mut config = Config::default();
        config.export.renderer = String::new();
        assert_validation_error(&config, &["export.renderer", "empty"]);
    }

    #[test]
    fn test_provider_debug_redacts_key() {
        let provider = ProviderConfig {
            api_key: Some("sk-secret".to_owned()),
            base_url: None,
            model: Some("gpt-4o".to_owned()),
        };
        let debug = format!("{provider:?}");
        assert!(!debug.contains("sk-secret"));
        assert!(debug.contains("gpt-4o"));
    }
}
