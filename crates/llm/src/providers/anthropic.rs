//! Anthropic Messages API provider.
//!
//! API reference: https://docs.anthropic.com/en/api/messages

use crate::client::{CompletionClient, CompletionRequest, CompletionResponse, LlmUsage};
use crate::types::ContentBlock;
use coursebot_core::{AppError, AppResult};
use serde::Deserialize;
use serde_json::Value;

const DEFAULT_BASE_URL: &str = "https://api.anthropic.com";
const API_VERSION: &str = "2023-06-01";

/// Anthropic API response format.
#[derive(Debug, Deserialize)]
struct AnthropicResponse {
    // raw so block types this client does not model can be skipped
    content: Vec<Value>,
    stop_reason: Option<String>,
    #[serde(default)]
    usage: Option<AnthropicUsage>,
}

#[derive(Debug, Deserialize)]
struct AnthropicUsage {
    #[serde(default)]
    input_tokens: u32,
    #[serde(default)]
    output_tokens: u32,
}

/// Anthropic completion client.
pub struct AnthropicClient {
    base_url: String,
    api_key: String,
    client: reqwest::Client,
}

impl AnthropicClient {
    /// Create a client against the public API.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self::with_base_url(DEFAULT_BASE_URL, api_key)
    }

    /// Create a client against a custom base URL (proxies, gateways).
    pub fn with_base_url(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            client: reqwest::Client::new(),
        }
    }

    fn messages_url(&self) -> String {
        format!("{}/v1/messages", self.base_url)
    }

    fn convert_response(response: AnthropicResponse) -> CompletionResponse {
        let usage = response
            .usage
            .map(|u| LlmUsage::new(u.input_tokens, u.output_tokens))
            .unwrap_or_default();

        let content = response
            .content
            .into_iter()
            .filter_map(|block| match serde_json::from_value::<ContentBlock>(block.clone()) {
                Ok(block) => Some(block),
                Err(_) => {
                    tracing::debug!(
                        block_type = block.get("type").and_then(serde_json::Value::as_str).unwrap_or("unknown"),
                        "Skipping unsupported content block"
                    );
                    None
                }
            })
            .collect();

        CompletionResponse {
            stop_reason: response.stop_reason,
            content,
            usage,
        }
    }
}

#[async_trait::async_trait]
impl CompletionClient for AnthropicClient {
    fn provider_name(&self) -> &str {
        "anthropic"
    }

    async fn complete(&self, request: &CompletionRequest) -> AppResult<CompletionResponse> {
        tracing::debug!(
            model = %request.model,
            messages = request.messages.len(),
            tools = request.tools.as_ref().map_or(0, |t| t.len()),
            "Sending completion request to Anthropic"
        );

        let response = self
            .client
            .post(self.messages_url())
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", API_VERSION)
            .json(request)
            .send()
            .await
            .map_err(|e| AppError::Llm(format!("Failed to send request to Anthropic: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(AppError::Llm(format!(
                "Anthropic API error ({}): {}",
                status, error_text
            )));
        }

        let body: AnthropicResponse = response
            .json()
            .await
            .map_err(|e| AppError::Llm(format!("Failed to parse Anthropic response: {}", e)))?;

        tracing::debug!(stop_reason = ?body.stop_reason, "Received completion from Anthropic");

        Ok(Self::convert_response(body))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_client_creation() {
        let client = AnthropicClient::with_base_url("http://localhost:8080/", "key");
        assert_eq!(client.provider_name(), "anthropic");
        assert_eq!(client.messages_url(), "http://localhost:8080/v1/messages");
    }

    #[test]
    fn test_convert_tool_use_response() {
        let raw = json!({
            "id": "msg_1",
            "type": "message",
            "role": "assistant",
            "model": "claude",
            "stop_reason": "tool_use",
            "content": [
                {"type": "text", "text": "Let me look that up."},
                {"type": "tool_use", "id": "toolu_1", "name": "get_course_outline", "input": {"course_title": "MCP"}}
            ],
            "usage": {"input_tokens": 12, "output_tokens": 30}
        });

        let parsed: AnthropicResponse = serde_json::from_value(raw).unwrap();
        let response = AnthropicClient::convert_response(parsed);

        assert!(response.requests_tools());
        assert_eq!(response.first_text(), "Let me look that up.");
        assert_eq!(response.usage.total_tokens, 42);
        match &response.content[1] {
            ContentBlock::ToolUse { call_id, name, arguments } => {
                assert_eq!(call_id, "toolu_1");
                assert_eq!(name, "get_course_outline");
                assert_eq!(arguments["course_title"], json!("MCP"));
            }
            other => panic!("Expected tool use, got {:?}", other),
        }
    }

    #[test]
    fn test_convert_response_without_usage() {
        let raw = json!({"stop_reason": "end_turn", "content": [{"type": "text", "text": "4"}]});
        let parsed: AnthropicResponse = serde_json::from_value(raw).unwrap();
        let response = AnthropicClient::convert_response(parsed);
        assert_eq!(response.first_text(), "4");
        assert_eq!(response.usage, LlmUsage::default());
    }

    #[test]
    fn test_unknown_block_types_are_skipped() {
        let raw = json!({
            "stop_reason": "tool_use",
            "content": [
                {"type": "thinking", "thinking": "The outline tool fits.", "signature": "sig"},
                {"type": "server_tool_use", "id": "srv_1", "name": "web_search", "input": {}},
                {"type": "tool_use", "id": "toolu_2", "name": "get_course_outline", "input": {"course_title": "MCP"}}
            ]
        });

        let parsed: AnthropicResponse = serde_json::from_value(raw).unwrap();
        let response = AnthropicClient::convert_response(parsed);

        assert_eq!(response.content.len(), 1);
        assert!(response.requests_tools());
        assert_eq!(response.first_text(), "");
    }
}
