//! Per-call credential resolution.
//!
//! Server-side defaults live in [`ProvidersConfig`]; callers may supply
//! request-scoped [`CredentialOverrides`]. [`resolve_credentials`] merges the
//! two into an immutable [`EffectiveCredential`] that is handed to exactly one
//! adapter call. Nothing process-wide is mutated, so an override can never
//! outlive its request or leak into a concurrent one.

use std::collections::HashMap;
use std::fmt;

use diagen_config::{ProviderConfig, ProvidersConfig};

use crate::error::ProviderError;
use crate::types::AiProvider;

/// Request-scoped key and endpoint for one provider.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct CredentialOverride {
    /// API key taking precedence over the configured key.
    pub api_key: Option<String>,
    /// Base URL taking precedence over the configured endpoint.
    pub base_url: Option<String>,
}

impl fmt::Debug for CredentialOverride {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialOverride")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("base_url", &self.base_url)
            .finish()
    }
}

/// Overrides for any subset of providers, usually parsed from request headers.
#[derive(Debug, Clone, Default)]
pub struct CredentialOverrides {
    entries: HashMap<AiProvider, CredentialOverride>,
}

impl CredentialOverrides {
    /// Create an empty override set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the API key override for `provider`.
    #[must_use]
    pub fn with_api_key(mut self, provider: AiProvider, api_key: impl Into<String>) -> Self {
        self.entries.entry(provider).or_default().api_key = Some(api_key.into());
        self
    }

    /// Set the base URL override for `provider`.
    #[must_use]
    pub fn with_base_url(mut self, provider: AiProvider, base_url: impl Into<String>) -> Self {
        self.entries.entry(provider).or_default().base_url = Some(base_url.into());
        self
    }

    /// Collect overrides from request headers.
    ///
    /// `header` looks up a (lowercase) header name and returns its value.
    /// Blank values are ignored.
    pub fn from_headers<F>(header: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let lookup = |name: &str| {
            header(name)
                .map(|value| value.trim().to_owned())
                .filter(|value| !value.is_empty())
        };

        let mut overrides = Self::new();
        for provider in AiProvider::ALL {
            if let Some(key) = lookup(provider.api_key_header()) {
                overrides = overrides.with_api_key(provider, key);
            }
            if let Some(url) = lookup(provider.base_url_header()) {
                overrides = overrides.with_base_url(provider, url);
            }
        }
        overrides
    }

    /// Override for `provider`, if any was supplied.
    #[must_use]
    pub fn get(&self, provider: AiProvider) -> Option<&CredentialOverride> {
        self.entries.get(&provider)
    }

    /// Whether no overrides were supplied at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Credentials and endpoint in effect for a single provider call.
#[derive(Clone, PartialEq, Eq)]
pub struct EffectiveCredential {
    /// Provider the credential belongs to.
    pub provider: AiProvider,
    /// API key to authenticate with.
    pub api_key: String,
    /// Base URL without trailing slash.
    pub base_url: String,
    /// Model id to request.
    pub model: String,
}

impl fmt::Debug for EffectiveCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EffectiveCredential")
            .field("provider", &self.provider)
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .finish()
    }
}

/// Server-side defaults for `provider`.
#[must_use]
pub fn settings_for(settings: &ProvidersConfig, provider: AiProvider) -> &ProviderConfig {
    match provider {
        AiProvider::Claude => &settings.claude,
        AiProvider::OpenAi => &settings.openai,
        AiProvider::DeepSeek => &settings.deepseek,
    }
}

/// Merge configured defaults with request overrides for one call.
///
/// Base URL resolves first (override, then config, then the provider's
/// built-in endpoint), then the key (override, then config). A missing key
/// is a configuration error raised before any network I/O.
pub fn resolve_credentials(
    provider: AiProvider,
    settings: &ProvidersConfig,
    overrides: &CredentialOverrides,
) -> Result<EffectiveCredential, ProviderError> {
    let defaults = settings_for(settings, provider);
    let request = overrides.get(provider);

    let base_url = request
        .and_then(|o| o.base_url.as_deref())
        .or(defaults.base_url.as_deref())
        .unwrap_or(provider.default_base_url())
        .trim_end_matches('/')
        .to_owned();

    let api_key = request
        .and_then(|o| o.api_key.as_deref())
        .or(defaults.api_key.as_deref())
        .filter(|key| !key.is_empty())
        .ok_or(ProviderError::Configuration { provider })?
        .to_owned();

    let model = defaults
        .model
        .as_deref()
        .unwrap_or(provider.default_model())
        .to_owned();

    Ok(EffectiveCredential {
        provider,
        api_key,
        base_url,
        model,
    })
}
