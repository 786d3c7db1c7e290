//! AI chat-completion adapters.
//!
//! Every backend implements [`Provider`]: one required transport method,
//! [`Provider::complete`], plus provided `generate`/`refine`/`explain`
//! methods that build the messages. Adapters hold no credentials; each call
//! receives an [`EffectiveCredential`] resolved for that call alone.
//!
//! - [`OpenAiCompatible`]: `OpenAI` and `DeepSeek` chat completions
//! - [`Anthropic`]: Claude Messages API
//! - [`ProviderRegistry`]: provider id to adapter lookup

mod anthropic;
mod openai;

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use ureq::Agent;

pub use anthropic::Anthropic;
pub use openai::OpenAiCompatible;

use crate::credentials::EffectiveCredential;
use crate::error::ProviderError;
use crate::prompt::prompt_for;
use crate::types::{AiProvider, DiagramFormat, DiagramType};

/// HTTP timeout for a single completion request.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(120);

/// Output-token budget for explanations.
pub const EXPLAIN_MAX_TOKENS: u32 = 1000;

/// Speaker of a chat message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    /// Wire name shared by every supported backend.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Assistant => "assistant",
        }
    }
}

/// One turn of a conversation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    /// Create a user message.
    #[must_use]
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }
}

/// Backend-neutral completion request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatRequest {
    /// System prompt, if any.
    pub system: Option<String>,
    /// Conversation turns.
    pub messages: Vec<ChatMessage>,
    /// Upper bound on generated tokens.
    pub max_tokens: u32,
}

/// An AI chat-completion backend.
pub trait Provider: Send + Sync {
    /// Provider this adapter talks to.
    fn id(&self) -> AiProvider;

    /// Output-token budget for generate and refine calls.
    fn max_tokens(&self) -> u32;

    /// Send `request` and return the primary text of the reply.
    fn complete(
        &self,
        credential: &EffectiveCredential,
        request: &ChatRequest,
    ) -> Result<String, ProviderError>;

    /// Generate new diagram source from a description. Returns the raw reply.
    fn generate(
        &self,
        credential: &EffectiveCredential,
        description: &str,
        diagram_type: DiagramType,
        format: DiagramFormat,
    ) -> Result<String, ProviderError> {
        let request = ChatRequest {
            system: Some(prompt_for(diagram_type, format)),
            messages: vec![ChatMessage::user(description)],
            max_tokens: self.max_tokens(),
        };
        self.complete(credential, &request)
    }

    /// Ask for a full replacement of `code` that satisfies `instruction`.
    fn refine(
        &self,
        credential: &EffectiveCredential,
        code: &str,
        instruction: &str,
        format: DiagramFormat,
    ) -> Result<String, ProviderError> {
        let request = ChatRequest {
            system: None,
            messages: vec![ChatMessage::user(refine_prompt(code, instruction, format))],
            max_tokens: self.max_tokens(),
        };
        self.complete(credential, &request)
    }

    /// Describe `code` in natural language.
    fn explain(
        &self,
        credential: &EffectiveCredential,
        code: &str,
        format: DiagramFormat,
    ) -> Result<String, ProviderError> {
        let request = ChatRequest {
            system: None,
            messages: vec![ChatMessage::user(explain_prompt(code, format))],
            max_tokens: EXPLAIN_MAX_TOKENS,
        };
        self.complete(credential, &request)
    }
}

fn refine_prompt(code: &str, instruction: &str, format: DiagramFormat) -> String {
    let name = format.display_name();
    format!(
        "Existing {name} code:\n```\n{code}\n```\n\n\
         Requested change: {instruction}\n\n\
         Modify the {name} code above to satisfy the request. \
         Return only the complete modified code, with no explanation."
    )
}

fn explain_prompt(code: &str, format: DiagramFormat) -> String {
    let name = format.display_name();
    format!(
        "Explain the content and structure of this {name} diagram:\n\n```\n{code}\n```\n\n\
         Describe the information the diagram conveys in concise, clear language."
    )
}

/// Create the HTTP agent shared by all calls of one adapter.
///
/// Status codes are not treated as errors so that adapters can read error
/// bodies themselves.
pub(crate) fn create_agent(timeout: Duration) -> Agent {
    Agent::config_builder()
        .timeout_global(Some(timeout))
        .http_status_as_error(false)
        .build()
        .into()
}

/// Read an error body from a failed response, or `None` on success status.
pub(crate) fn error_body(status: u16, body: &mut ureq::Body) -> Option<ProviderError> {
    if status < 400 {
        return None;
    }
    let body = body
        .read_to_string()
        .unwrap_or_else(|_| "(unable to read error body)".to_owned());
    Some(ProviderError::HttpResponse { status, body })
}

/// Lookup from provider id to adapter.
#[derive(Clone, Default)]
pub struct ProviderRegistry {
    adapters: HashMap<AiProvider, Arc<dyn Provider>>,
}

impl ProviderRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with the HTTP adapters for every built-in provider.
    #[must_use]
    pub fn with_defaults() -> Self {
        Self::new()
            .register(Arc::new(Anthropic::new()))
            .register(Arc::new(OpenAiCompatible::openai()))
            .register(Arc::new(OpenAiCompatible::deepseek()))
    }

    /// Add or replace the adapter for `adapter.id()`.
    #[must_use]
    pub fn register(mut self, adapter: Arc<dyn Provider>) -> Self {
        self.adapters.insert(adapter.id(), adapter);
        self
    }

    /// Adapter for `provider`.
    pub fn get(&self, provider: AiProvider) -> Result<Arc<dyn Provider>, ProviderError> {
        self.adapters
            .get(&provider)
            .map(Arc::clone)
            .ok_or(ProviderError::Unavailable(provider))
    }
}

impl std::fmt::Debug for ProviderRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderRegistry")
            .field("providers", &self.adapters.keys().collect::<Vec<_>>())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use pretty_assertions::assert_eq;

    use super::*;

    /// Adapter that records requests and answers with a fixed reply.
    struct Recorder {
        requests: Mutex<Vec<ChatRequest>>,
    }

    impl Provider for Recorder {
        fn id(&self) -> AiProvider {
            AiProvider::OpenAi
        }

        fn max_tokens(&self) -> u32 {
            2000
        }

        fn complete(
            &self,
            _credential: &EffectiveCredential,
            request: &ChatRequest,
        ) -> Result<String, ProviderError> {
            self.requests.lock().unwrap().push(request.clone());
            Ok("reply".to_owned())
        }
    }

    fn credential() -> EffectiveCredential {
        EffectiveCredential {
            provider: AiProvider::OpenAi,
            api_key: "k".to_owned(),
            base_url: "https://api.openai.com/v1".to_owned(),
            model: "gpt-4-turbo-preview".to_owned(),
        }
    }

    fn recorder() -> Recorder {
        Recorder {
            requests: Mutex::new(Vec::new()),
        }
    }

    #[test]
    fn test_generate_builds_system_and_user_messages() {
        let adapter = recorder();
        adapter
            .generate(
                &credential(),
                "draw a login flow",
                DiagramType::Flowchart,
                DiagramFormat::Mermaid,
            )
            .unwrap();

        let requests = adapter.requests.lock().unwrap();
        let request = &requests[0];
        assert_eq!(
            request.system.as_deref(),
            Some(prompt_for(DiagramType::Flowchart, DiagramFormat::Mermaid).as_str())
        );
        assert_eq!(request.messages, vec![ChatMessage::user("draw a login flow")]);
        assert_eq!(request.max_tokens, 2000);
    }

    #[test]
    fn test_refine_embeds_code_format_and_instruction() {
        let adapter = recorder();
        adapter
            .refine(&credential(), "<mxfile/>", "add a database", DiagramFormat::Drawio)
            .unwrap();

        let requests = adapter.requests.lock().unwrap();
        let request = &requests[0];
        assert!(request.system.is_none());
        assert_eq!(request.messages.len(), 1);
        let content = &request.messages[0].content;
        assert!(content.contains("Existing Draw.io XML code:\n```\n<mxfile/>\n```"));
        assert!(content.contains("Requested change: add a database"));
        assert!(content.contains("complete modified code"));
    }

    #[test]
    fn test_explain_uses_explain_budget() {
        let adapter = recorder();
        let reply = adapter
            .explain(&credential(), "graph TD\nA-->B", DiagramFormat::Mermaid)
            .unwrap();
        assert_eq!(reply, "reply");

        let requests = adapter.requests.lock().unwrap();
        assert_eq!(requests[0].max_tokens, EXPLAIN_MAX_TOKENS);
        assert!(requests[0].messages[0].content.contains("this Mermaid diagram"));
    }

    #[test]
    fn test_registry_defaults_cover_every_provider() {
        let registry = ProviderRegistry::with_defaults();
        for provider in AiProvider::ALL {
            assert_eq!(registry.get(provider).unwrap().id(), provider);
        }
    }

    #[test]
    fn test_registry_missing_provider() {
        let registry = ProviderRegistry::new().register(Arc::new(recorder()));
        assert!(registry.get(AiProvider::OpenAi).is_ok());
        let err = registry.get(AiProvider::Claude).err().unwrap();
        assert!(matches!(err, ProviderError::Unavailable(AiProvider::Claude)));
    }
}
