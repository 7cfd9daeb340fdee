//! Completion client abstraction and request/response types.

use crate::types::{ContentBlock, Message, ToolChoice, ToolSpec};
use coursebot_core::AppResult;
use serde::{Deserialize, Serialize};

/// Completion request.
///
/// Serializes to the Anthropic Messages body. `tools` and `tool_choice` are
/// omitted from the wire entirely when `None`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompletionRequest {
    /// Model identifier
    pub model: String,

    /// System prompt
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system: Option<String>,

    /// Ordered conversation
    pub messages: Vec<Message>,

    /// Callable tools, in the order the model should see them
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tools: Option<Vec<ToolSpec>>,

    /// Tool selection policy
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_choice: Option<ToolChoice>,

    /// Maximum tokens to generate
    pub max_tokens: u32,

    /// Temperature for sampling
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
}

impl CompletionRequest {
    /// Create a new request with required fields.
    pub fn new(model: impl Into<String>, messages: Vec<Message>) -> Self {
        Self {
            model: model.into(),
            system: None,
            messages,
            tools: None,
            tool_choice: None,
            max_tokens: 800,
            temperature: None,
        }
    }

    /// Set the system prompt.
    pub fn with_system(mut self, system: impl Into<String>) -> Self {
        self.system = Some(system.into());
        self
    }

    /// Offer tools to the model with automatic tool choice.
    ///
    /// An empty list leaves the request tool-free.
    pub fn with_tools(mut self, tools: Vec<ToolSpec>) -> Self {
        if tools.is_empty() {
            self.tools = None;
            self.tool_choice = None;
        } else {
            self.tools = Some(tools);
            self.tool_choice = Some(ToolChoice::Auto);
        }
        self
    }

    /// Set the maximum tokens to generate.
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    /// Set the temperature for sampling.
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    /// Whether any tools are offered.
    pub fn has_tools(&self) -> bool {
        self.tools.as_ref().is_some_and(|t| !t.is_empty())
    }
}

/// Completion response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompletionResponse {
    /// Why generation stopped ("tool_use", "end_turn", "max_tokens", ...)
    pub stop_reason: Option<String>,

    /// Ordered content blocks
    pub content: Vec<ContentBlock>,

    /// Usage statistics
    #[serde(default)]
    pub usage: LlmUsage,
}

impl CompletionResponse {
    /// A plain text response that ended the turn.
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            stop_reason: Some("end_turn".to_string()),
            content: vec![ContentBlock::text(text)],
            usage: LlmUsage::default(),
        }
    }

    /// A response asking for the given tool calls.
    pub fn tool_calls(blocks: Vec<ContentBlock>) -> Self {
        Self {
            stop_reason: Some("tool_use".to_string()),
            content: blocks,
            usage: LlmUsage::default(),
        }
    }

    /// True when the model stopped to use tools and named at least one.
    pub fn requests_tools(&self) -> bool {
        self.stop_reason.as_deref() == Some("tool_use")
            && self
                .content
                .iter()
                .any(|b| matches!(b, ContentBlock::ToolUse { .. }))
    }

    /// The first text block, or an empty string when there is none.
    pub fn first_text(&self) -> String {
        self.content
            .iter()
            .find_map(|b| match b {
                ContentBlock::Text { text } => Some(text.clone()),
                _ => None,
            })
            .unwrap_or_default()
    }
}

/// Token usage statistics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct LlmUsage {
    #[serde(default)]
    pub prompt_tokens: u32,

    #[serde(default)]
    pub completion_tokens: u32,

    #[serde(default)]
    pub total_tokens: u32,
}

impl LlmUsage {
    /// Create usage stats from prompt and completion token counts.
    pub fn new(prompt_tokens: u32, completion_tokens: u32) -> Self {
        Self {
            prompt_tokens,
            completion_tokens,
            total_tokens: prompt_tokens + completion_tokens,
        }
    }
}

/// Trait for completion providers.
///
/// A single blocking round-trip per call: no retries, no streaming. Any
/// `Err` is a provider failure and is fatal to the query that issued it.
#[async_trait::async_trait]
pub trait CompletionClient: Send + Sync {
    /// Get the provider name (e.g., "anthropic", "ollama").
    fn provider_name(&self) -> &str;

    /// Perform a completion, possibly returning tool-use requests.
    async fn complete(&self, request: &CompletionRequest) -> AppResult<CompletionResponse>;
}
