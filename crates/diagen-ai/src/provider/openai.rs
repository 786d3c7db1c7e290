//! OpenAI-compatible chat completions (`OpenAI`, `DeepSeek`).

use serde::{Deserialize, Serialize};
use tracing::info;
use ureq::Agent;

use super::{ChatRequest, DEFAULT_TIMEOUT, Provider, create_agent, error_body};
use crate::credentials::EffectiveCredential;
use crate::error::ProviderError;
use crate::types::AiProvider;

/// Adapter for any backend speaking the `/chat/completions` protocol.
pub struct OpenAiCompatible {
    provider: AiProvider,
    max_tokens: u32,
    agent: Agent,
}

impl OpenAiCompatible {
    /// `OpenAI` adapter.
    #[must_use]
    pub fn openai() -> Self {
        Self::new(AiProvider::OpenAi, 2000)
    }

    /// `DeepSeek` adapter; the reasoning model gets a larger output budget.
    #[must_use]
    pub fn deepseek() -> Self {
        Self::new(AiProvider::DeepSeek, 4000)
    }

    fn new(provider: AiProvider, max_tokens: u32) -> Self {
        Self {
            provider,
            max_tokens,
            agent: create_agent(DEFAULT_TIMEOUT),
        }
    }
}

#[derive(Debug, Serialize)]
struct CompletionBody<'a> {
    model: &'a str,
    messages: Vec<WireMessage<'a>>,
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct WireMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

/// Build the request body; the system prompt becomes the first message.
fn completion_body<'a>(model: &'a str, request: &'a ChatRequest) -> CompletionBody<'a> {
    let system = request.system.as_deref().map(|content| WireMessage {
        role: "system",
        content,
    });
    let turns = request.messages.iter().map(|m| WireMessage {
        role: m.role.as_str(),
        content: &m.content,
    });
    CompletionBody {
        model,
        messages: system.into_iter().chain(turns).collect(),
        max_tokens: request.max_tokens,
    }
}

/// Text of the first choice, if it has any.
fn primary_text(response: CompletionResponse) -> Option<String> {
    response
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .filter(|text| !text.trim().is_empty())
}

impl Provider for OpenAiCompatible {
    fn id(&self) -> AiProvider {
        self.provider
    }

    fn max_tokens(&self) -> u32 {
        self.max_tokens
    }

    fn complete(
        &self,
        credential: &EffectiveCredential,
        request: &ChatRequest,
    ) -> Result<String, ProviderError> {
        let url = format!("{}/chat/completions", credential.base_url);
        info!(provider = %self.provider, model = %credential.model, "Requesting chat completion");

        let response = self
            .agent
            .post(&url)
            .header("Authorization", &format!("Bearer {}", credential.api_key))
            .header("Accept", "application/json")
            .send_json(completion_body(&credential.model, request))?;

        let status = response.status().as_u16();
        let mut body = response.into_body();
        if let Some(err) = error_body(status, &mut body) {
            return Err(err);
        }

        let completion: CompletionResponse = body.read_json()?;
        primary_text(completion).ok_or(ProviderError::EmptyResponse(self.provider))
    }
}
