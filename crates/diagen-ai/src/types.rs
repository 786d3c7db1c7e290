//! Diagram and provider enumerations shared by every stage.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Kind of diagram the user asks for.
///
/// Selects prompt content only; the generated source is not validated
/// against the type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiagramType {
    Flowchart,
    Architecture,
    Sequence,
    Gantt,
    Swimlane,
    Er,
    Class,
    State,
    Mindmap,
    Roadmap,
}

impl DiagramType {
    /// Every diagram type, in declaration order.
    pub const ALL: [Self; 10] = [
        Self::Flowchart,
        Self::Architecture,
        Self::Sequence,
        Self::Gantt,
        Self::Swimlane,
        Self::Er,
        Self::Class,
        Self::State,
        Self::Mindmap,
        Self::Roadmap,
    ];

    /// Parse a diagram type from its wire name.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.as_str() == s)
    }

    /// Wire name of this diagram type.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Flowchart => "flowchart",
            Self::Architecture => "architecture",
            Self::Sequence => "sequence",
            Self::Gantt => "gantt",
            Self::Swimlane => "swimlane",
            Self::Er => "er",
            Self::Class => "class",
            Self::State => "state",
            Self::Mindmap => "mindmap",
            Self::Roadmap => "roadmap",
        }
    }
}

impl fmt::Display for DiagramType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Textual notation of the generated diagram source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiagramFormat {
    /// Mermaid graph notation.
    Mermaid,
    /// Draw.io (mxGraph) XML document.
    #[default]
    Drawio,
}

impl DiagramFormat {
    /// Parse a format from its wire name.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "mermaid" => Some(Self::Mermaid),
            "drawio" => Some(Self::Drawio),
            _ => None,
        }
    }

    /// Wire name of this format.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Mermaid => "mermaid",
            Self::Drawio => "drawio",
        }
    }

    /// Human-readable name used inside prompts.
    #[must_use]
    pub fn display_name(self) -> &'static str {
        match self {
            Self::Mermaid => "Mermaid",
            Self::Drawio => "Draw.io XML",
        }
    }

    /// Language tag a model puts after an opening code fence for this format.
    #[must_use]
    pub fn fence_tag(self) -> &'static str {
        match self {
            Self::Mermaid => "mermaid",
            Self::Drawio => "xml",
        }
    }
}

impl fmt::Display for DiagramFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// AI chat-completion backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AiProvider {
    /// Anthropic Messages API.
    Claude,
    /// `OpenAI` chat completions.
    #[serde(rename = "openai")]
    OpenAi,
    /// `DeepSeek` (OpenAI-compatible wire format).
    #[serde(rename = "deepseek")]
    DeepSeek,
}

impl AiProvider {
    /// Every provider, in declaration order.
    pub const ALL: [Self; 3] = [Self::Claude, Self::OpenAi, Self::DeepSeek];

    /// Parse a provider from its wire name.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.as_str() == s)
    }

    /// Wire name of this provider.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Claude => "claude",
            Self::OpenAi => "openai",
            Self::DeepSeek => "deepseek",
        }
    }

    /// Endpoint used when neither config nor request supplies one.
    #[must_use]
    pub fn default_base_url(self) -> &'static str {
        match self {
            Self::Claude => "https://api.anthropic.com/v1",
            Self::OpenAi => "https://api.openai.com/v1",
            Self::DeepSeek => "https://api.deepseek.com",
        }
    }

    /// Model used when config does not name one.
    #[must_use]
    pub fn default_model(self) -> &'static str {
        match self {
            Self::Claude => "claude-3-5-sonnet-20241022",
            Self::OpenAi => "gpt-4-turbo-preview",
            Self::DeepSeek => "deepseek-reasoner",
        }
    }

    /// Request header carrying a per-request API key for this provider.
    #[must_use]
    pub fn api_key_header(self) -> &'static str {
        match self {
            Self::Claude => "x-anthropic-key",
            Self::OpenAi => "x-openai-key",
            Self::DeepSeek => "x-deepseek-key",
        }
    }

    /// Request header carrying a per-request base URL for this provider.
    #[must_use]
    pub fn base_url_header(self) -> &'static str {
        match self {
            Self::Claude => "x-anthropic-base-url",
            Self::OpenAi => "x-openai-base-url",
            Self::DeepSeek => "x-deepseek-base-url",
        }
    }
}

impl fmt::Display for AiProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
