//! Conversation data model shared by every completion provider.
//!
//! The serde representation follows the Anthropic Messages wire format; other
//! providers translate from it.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Author of a conversation message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// A single content block inside a message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentBlock {
    /// Free text
    Text { text: String },

    /// A request from the model to invoke a tool
    ToolUse {
        #[serde(rename = "id")]
        call_id: String,
        name: String,
        #[serde(rename = "input")]
        arguments: Value,
    },

    /// The outcome of a tool invocation, matched to its request by call id
    ToolResult {
        #[serde(rename = "tool_use_id")]
        call_id: String,
        content: String,
        #[serde(default, skip_serializing_if = "std::ops::Not::not")]
        is_error: bool,
    },
}

impl ContentBlock {
    /// Create a text block.
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text { text: text.into() }
    }

    /// Create a tool-use block.
    pub fn tool_use(call_id: impl Into<String>, name: impl Into<String>, arguments: Value) -> Self {
        Self::ToolUse {
            call_id: call_id.into(),
            name: name.into(),
            arguments,
        }
    }

    /// Create a tool-result block.
    pub fn tool_result(call_id: impl Into<String>, content: impl Into<String>, is_error: bool) -> Self {
        Self::ToolResult {
            call_id: call_id.into(),
            content: content.into(),
            is_error,
        }
    }
}

/// Message body: either plain text or an ordered list of blocks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MessageContent {
    Text(String),
    Blocks(Vec<ContentBlock>),
}

/// One turn of the conversation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: MessageContent,
}

impl Message {
    /// A user message with plain text content.
    pub fn user_text(text: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: MessageContent::Text(text.into()),
        }
    }

    /// A user message made of blocks (tool results).
    pub fn user_blocks(blocks: Vec<ContentBlock>) -> Self {
        Self {
            role: Role::User,
            content: MessageContent::Blocks(blocks),
        }
    }

    /// An assistant message made of blocks, as returned by the provider.
    pub fn assistant_blocks(blocks: Vec<ContentBlock>) -> Self {
        Self {
            role: Role::Assistant,
            content: MessageContent::Blocks(blocks),
        }
    }
}

/// Callable tool description exposed to the model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolSpec {
    /// Unique tool name used for dispatch
    pub name: String,

    /// What the tool does, in terms the model can act on
    pub description: String,

    /// JSON schema of the tool arguments (object type)
    pub input_schema: Value,
}

/// Tool selection policy sent alongside the tool list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ToolChoice {
    Auto,
}

/// Provider type enum for matching.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderType {
    Anthropic,
    Ollama,
}

impl ProviderType {
    /// Parse provider type from string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "anthropic" | "claude" => Some(Self::Anthropic),
            "ollama" => Some(Self::Ollama),
            _ => None,
        }
    }

    /// Get the canonical provider name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Anthropic => "anthropic",
            Self::Ollama => "ollama",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_provider_type_parsing() {
        assert_eq!(ProviderType::parse("anthropic"), Some(ProviderType::Anthropic));
        assert_eq!(ProviderType::parse("Claude"), Some(ProviderType::Anthropic));
        assert_eq!(ProviderType::parse("ollama"), Some(ProviderType::Ollama));
        assert_eq!(ProviderType::parse("unknown"), None);
    }

    #[test]
    fn test_tool_use_block_wire_format() {
        let block = ContentBlock::tool_use("toolu_1", "search_course_content", json!({"query": "rust"}));
        let value = serde_json::to_value(&block).unwrap();
        assert_eq!(
            value,
            json!({"type": "tool_use", "id": "toolu_1", "name": "search_course_content", "input": {"query": "rust"}})
        );
    }

    #[test]
    fn test_tool_result_omits_false_error_flag() {
        let ok = serde_json::to_value(ContentBlock::tool_result("toolu_1", "done", false)).unwrap();
        assert_eq!(ok, json!({"type": "tool_result", "tool_use_id": "toolu_1", "content": "done"}));

        let failed = serde_json::to_value(ContentBlock::tool_result("toolu_2", "boom", true)).unwrap();
        assert_eq!(failed["is_error"], json!(true));
    }

    #[test]
    fn test_user_text_serializes_as_string() {
        let value = serde_json::to_value(Message::user_text("What is 2+2?")).unwrap();
        assert_eq!(value, json!({"role": "user", "content": "What is 2+2?"}));
    }

    #[test]
    fn test_tool_choice_auto() {
        assert_eq!(serde_json::to_value(ToolChoice::Auto).unwrap(), json!({"type": "auto"}));
    }
}
