//! AI diagram generation for diagen.
//!
//! Turns natural-language descriptions into Mermaid or Draw.io source by
//! calling one of several chat-completion backends, refines existing source,
//! and explains diagrams in prose.
//!
//! # Architecture
//!
//! The crate is organized into modules:
//! - [`types`]: Closed enumerations (`DiagramType`, `DiagramFormat`, `AiProvider`)
//! - `prompt`: System prompts per diagram type and format
//! - `credentials`: Per-call merge of configured and request-scoped credentials
//! - `provider`: The [`Provider`] trait, HTTP adapters, and [`ProviderRegistry`]
//! - `normalize`: Cleanup of raw model replies into bare diagram source
//! - `orchestrator`: [`Orchestrator`], the public generate/refine/explain API
//!
//! # Example
//!
//! ```ignore
//! use diagen_ai::{CredentialOverrides, GenerateRequest, Orchestrator, ProviderRegistry};
//! use diagen_config::Config;
//!
//! let config = Config::load(None, None)?;
//! let orchestrator = Orchestrator::new(ProviderRegistry::with_defaults(), config.providers);
//! let code = orchestrator.generate(&request, &CredentialOverrides::new())?;
//! ```

mod credentials;
mod error;
mod normalize;
mod orchestrator;
mod prompt;
mod provider;
pub mod types;

pub use credentials::{
    CredentialOverride, CredentialOverrides, EffectiveCredential, resolve_credentials,
    settings_for,
};
pub use error::{OperationError, ProviderError, ValidationError};
pub use normalize::clean;
pub use orchestrator::{ExplainRequest, GenerateRequest, Orchestrator, RefineRequest};
pub use prompt::prompt_for;
pub use provider::{
    Anthropic, ChatMessage, ChatRequest, DEFAULT_TIMEOUT, EXPLAIN_MAX_TOKENS, OpenAiCompatible,
    Provider, ProviderRegistry, Role,
};
pub use types::{AiProvider, DiagramFormat, DiagramType};
