//! Public generate / refine / explain entry points.
//!
//! Each call looks up the adapter for the requested provider, resolves the
//! credential for that call, invokes the adapter, and normalizes the reply.
//! Provider failures are logged with their kind and then collapsed into a
//! single [`OperationError`].

use std::sync::Arc;

use diagen_config::ProvidersConfig;
use serde::Deserialize;
use tracing::{info, warn};

use crate::credentials::{CredentialOverrides, EffectiveCredential, resolve_credentials};
use crate::error::{OperationError, ProviderError, ValidationError};
use crate::normalize;
use crate::provider::{Provider, ProviderRegistry};
use crate::types::{AiProvider, DiagramFormat, DiagramType};

/// Accepted description length in characters.
const DESCRIPTION_LIMITS: (usize, usize) = (1, 2000);

/// Accepted refinement instruction length in characters.
const INSTRUCTION_LIMITS: (usize, usize) = (1, 500);

/// Request to generate a new diagram.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateRequest {
    /// Natural-language description of the diagram.
    pub description: String,
    /// Kind of diagram.
    pub diagram_type: DiagramType,
    /// Output notation.
    #[serde(default)]
    pub format: DiagramFormat,
    /// Backend to use.
    #[serde(rename = "aiProvider")]
    pub provider: AiProvider,
    /// Optional free-text style hint.
    #[serde(default)]
    pub style: Option<String>,
}

impl GenerateRequest {
    /// Check field lengths.
    pub fn validate(&self) -> Result<(), ValidationError> {
        check_length("description", &self.description, DESCRIPTION_LIMITS)
    }

    /// User message content: the description plus the style hint, if any.
    fn user_content(&self) -> String {
        match self.style.as_deref().map(str::trim) {
            Some(style) if !style.is_empty() => {
                format!("{}\n\nStyle: {style}", self.description)
            }
            _ => self.description.clone(),
        }
    }
}

/// Request to modify an existing diagram.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefineRequest {
    /// Current diagram source.
    pub code: String,
    /// Notation of `code`.
    pub format: DiagramFormat,
    /// What to change.
    pub instruction: String,
    /// Backend to use.
    #[serde(rename = "aiProvider")]
    pub provider: AiProvider,
}

impl RefineRequest {
    /// Check field lengths.
    pub fn validate(&self) -> Result<(), ValidationError> {
        check_length("instruction", &self.instruction, INSTRUCTION_LIMITS)
    }
}

/// Request to describe a diagram in prose.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExplainRequest {
    /// Diagram source.
    pub code: String,
    /// Notation of `code`.
    pub format: DiagramFormat,
    /// Backend to use.
    #[serde(rename = "aiProvider")]
    pub provider: AiProvider,
}

fn check_length(
    field: &'static str,
    value: &str,
    (min, max): (usize, usize),
) -> Result<(), ValidationError> {
    let actual = value.chars().count();
    if actual < min || actual > max {
        return Err(ValidationError {
            field,
            min,
            max,
            actual,
        });
    }
    Ok(())
}

#[derive(Debug, Clone, Copy)]
enum Operation {
    Generate,
    Refine,
    Explain,
}

impl Operation {
    fn as_str(self) -> &'static str {
        match self {
            Self::Generate => "generate",
            Self::Refine => "refine",
            Self::Explain => "explain",
        }
    }

    fn failure(self, message: String) -> OperationError {
        match self {
            Self::Generate => OperationError::Generation(message),
            Self::Refine => OperationError::Refinement(message),
            Self::Explain => OperationError::Explanation(message),
        }
    }
}

/// Entry point for AI diagram operations.
///
/// Cheap to share behind an [`Arc`]; calls are independent and may run
/// concurrently with different [`CredentialOverrides`].
pub struct Orchestrator {
    registry: ProviderRegistry,
    settings: ProvidersConfig,
}

impl Orchestrator {
    /// Create an orchestrator over `registry` with server-side defaults.
    #[must_use]
    pub fn new(registry: ProviderRegistry, settings: ProvidersConfig) -> Self {
        Self { registry, settings }
    }

    /// Generate diagram source from a description.
    pub fn generate(
        &self,
        request: &GenerateRequest,
        overrides: &CredentialOverrides,
    ) -> Result<String, OperationError> {
        let description = request.user_content();
        let raw = self.invoke(
            Operation::Generate,
            request.provider,
            overrides,
            |adapter, credential| {
                adapter.generate(
                    credential,
                    &description,
                    request.diagram_type,
                    request.format,
                )
            },
        )?;
        Ok(normalize::clean(&raw, request.format))
    }

    /// Rewrite diagram source according to an instruction.
    pub fn refine(
        &self,
        request: &RefineRequest,
        overrides: &CredentialOverrides,
    ) -> Result<String, OperationError> {
        let raw = self.invoke(
            Operation::Refine,
            request.provider,
            overrides,
            |adapter, credential| {
                adapter.refine(credential, &request.code, &request.instruction, request.format)
            },
        )?;
        Ok(normalize::clean(&raw, request.format))
    }

    /// Explain diagram source in prose. The reply is returned unmodified.
    pub fn explain(
        &self,
        request: &ExplainRequest,
        overrides: &CredentialOverrides,
    ) -> Result<String, OperationError> {
        self.invoke(
            Operation::Explain,
            request.provider,
            overrides,
            |adapter, credential| adapter.explain(credential, &request.code, request.format),
        )
    }

    fn invoke<F>(
        &self,
        operation: Operation,
        provider: AiProvider,
        overrides: &CredentialOverrides,
        call: F,
    ) -> Result<String, OperationError>
    where
        F: FnOnce(&dyn Provider, &EffectiveCredential) -> Result<String, ProviderError>,
    {
        let result = self
            .registry
            .get(provider)
            .and_then(|adapter| self.call_adapter(&adapter, operation, overrides, call));

        result.map_err(|err| {
            warn!(
                operation = operation.as_str(),
                provider = %provider,
                kind = err.kind(),
                error = %err,
                "AI operation failed"
            );
            operation.failure(err.to_string())
        })
    }

    fn call_adapter<F>(
        &self,
        adapter: &Arc<dyn Provider>,
        operation: Operation,
        overrides: &CredentialOverrides,
        call: F,
    ) -> Result<String, ProviderError>
    where
        F: FnOnce(&dyn Provider, &EffectiveCredential) -> Result<String, ProviderError>,
    {
        let provider = adapter.id();
        let credential = resolve_credentials(provider, &self.settings, overrides)?;
        info!(
            operation = operation.as_str(),
            provider = %provider,
            model = %credential.model,
            overridden = overrides.get(provider).is_some(),
            "Calling AI provider"
        );
        call(adapter.as_ref(), &credential)
    }
}

impl std::fmt::Debug for Orchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Orchestrator")
            .field("registry", &self.registry)
            .finish_non_exhaustive()
    }
}
