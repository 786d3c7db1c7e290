//! Anthropic Messages API adapter.

use serde::{Deserialize, Serialize};
use tracing::info;
use ureq::Agent;

use super::{ChatRequest, DEFAULT_TIMEOUT, Provider, create_agent, error_body};
use crate::credentials::EffectiveCredential;
use crate::error::ProviderError;
use crate::types::AiProvider;

/// API version header value.
const ANTHROPIC_VERSION: &str = "2023-06-01";

/// Output budget for generate and refine calls.
const MAX_TOKENS: u32 = 4096;

/// Claude adapter.
pub struct Anthropic {
    agent: Agent,
}

impl Anthropic {
    #[must_use]
    pub fn new() -> Self {
        Self {
            agent: create_agent(DEFAULT_TIMEOUT),
        }
    }
}

impl Default for Anthropic {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Serialize)]
struct MessagesBody<'a> {
    model: &'a str,
    max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<&'a str>,
    messages: Vec<WireMessage<'a>>,
}

#[derive(Debug, Serialize)]
struct WireMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    #[serde(default)]
    content: Vec<ContentBlock>,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    text: Option<String>,
}

/// Build the request body; the system prompt is a top-level field.
fn messages_body<'a>(model: &'a str, request: &'a ChatRequest) -> MessagesBody<'a> {
    MessagesBody {
        model,
        max_tokens: request.max_tokens,
        system: request.system.as_deref(),
        messages: request
            .messages
            .iter()
            .map(|m| WireMessage {
                role: m.role.as_str(),
                content: &m.content,
            })
            .collect(),
    }
}

/// Text of the first text block.
fn primary_text(response: MessagesResponse) -> Option<String> {
    response
        .content
        .into_iter()
        .find(|block| block.kind == "text")
        .and_then(|block| block.text)
        .filter(|text| !text.trim().is_empty())
}

impl Provider for Anthropic {
    fn id(&self) -> AiProvider {
        AiProvider::Claude
    }

    fn max_tokens(&self) -> u32 {
        MAX_TOKENS
    }

    fn complete(
        &self,
        credential: &EffectiveCredential,
        request: &ChatRequest,
    ) -> Result<String, ProviderError> {
        let url = format!("{}/messages", credential.base_url);
        info!(provider = %AiProvider::Claude, model = %credential.model, "Requesting message");

        let response = self
            .agent
            .post(&url)
            .header("x-api-key", &credential.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .header("Accept", "application/json")
            .send_json(messages_body(&credential.model, request))?;

        let status = response.status().as_u16();
        let mut body = response.into_body();
        if let Some(err) = error_body(status, &mut body) {
            return Err(err);
        }

        let message: MessagesResponse = body.read_json()?;
        primary_text(message).ok_or(ProviderError::EmptyResponse(AiProvider::Claude))
    }
}
