//! Ollama provider implementation.
//!
//! Talks to a local Ollama runtime through `/api/chat`, which supports tool calling.
//! Ollama API: https://github.com/ollama/ollama/blob/main/docs/api.md

use crate::client::{CompletionClient, CompletionRequest, CompletionResponse, LlmUsage};
use crate::types::{ContentBlock, Message, MessageContent, Role, ToolSpec};
use coursebot_core::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Ollama chat request format.
#[derive(Debug, Serialize)]
struct OllamaChatRequest {
    model: String,
    messages: Vec<OllamaMessage>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tools: Vec<OllamaTool>,
    stream: bool,
    options: OllamaOptions,
}

#[derive(Debug, Serialize)]
struct OllamaOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    num_predict: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct OllamaMessage {
    role: String,
    #[serde(default)]
    content: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    tool_calls: Vec<OllamaToolCall>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct OllamaToolCall {
    function: OllamaFunctionCall,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct OllamaFunctionCall {
    name: String,
    #[serde(default)]
    arguments: Value,
}

#[derive(Debug, Serialize)]
struct OllamaTool {
    #[serde(rename = "type")]
    kind: &'static str,
    function: OllamaFunction,
}

#[derive(Debug, Serialize)]
struct OllamaFunction {
    name: String,
    description: String,
    parameters: Value,
}

/// Ollama chat response format.
#[derive(Debug, Deserialize)]
struct OllamaChatResponse {
    message: OllamaMessage,
    #[serde(default)]
    done_reason: Option<String>,
    #[serde(default)]
    prompt_eval_count: Option<u32>,
    #[serde(default)]
    eval_count: Option<u32>,
}

/// Ollama completion client.
pub struct OllamaClient {
    /// Base URL for Ollama API
    base_url: String,

    /// HTTP client
    client: reqwest::Client,
}

impl OllamaClient {
    /// Create a new Ollama client with default settings.
    ///
    /// Default URL: http://localhost:11434
    pub fn new() -> Self {
        Self::with_base_url("http://localhost:11434")
    }

    /// Create a new Ollama client with a custom base URL.
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client: reqwest::Client::new(),
        }
    }

    /// Convert a CompletionRequest to Ollama chat format.
    ///
    /// Ollama has no tool-call ids on the wire: tool results travel as `tool`
    /// role messages in call order, which is how the conversation already pairs them.
    fn to_ollama_request(&self, request: &CompletionRequest) -> OllamaChatRequest {
        let mut messages = Vec::with_capacity(request.messages.len() + 1);

        if let Some(system) = &request.system {
            messages.push(OllamaMessage {
                role: "system".to_string(),
                content: system.clone(),
                tool_calls: Vec::new(),
            });
        }

        for message in &request.messages {
            messages.extend(convert_message(message));
        }

        let tools = request
            .tools
            .as_deref()
            .unwrap_or_default()
            .iter()
            .map(convert_tool)
            .collect();

        OllamaChatRequest {
            model: request.model.clone(),
            messages,
            tools,
            stream: false,
            options: OllamaOptions {
                temperature: request.temperature,
                num_predict: request.max_tokens,
            },
        }
    }

    /// Convert an Ollama chat response to a CompletionResponse.
    fn convert_response(&self, response: OllamaChatResponse) -> CompletionResponse {
        let usage = LlmUsage::new(
            response.prompt_eval_count.unwrap_or(0),
            response.eval_count.unwrap_or(0),
        );

        let mut content = Vec::new();
        if !response.message.content.is_empty() {
            content.push(ContentBlock::text(response.message.content));
        }

        let has_calls = !response.message.tool_calls.is_empty();
        for (i, call) in response.message.tool_calls.into_iter().enumerate() {
            content.push(ContentBlock::tool_use(
                format!("call_{}", i),
                call.function.name,
                call.function.arguments,
            ));
        }

        let stop_reason = if has_calls {
            Some("tool_use".to_string())
        } else {
            response.done_reason.or_else(|| Some("end_turn".to_string()))
        };

        CompletionResponse {
            stop_reason,
            content,
            usage,
        }
    }
}

impl Default for OllamaClient {
    fn default() -> Self {
        Self::new()
    }
}

fn convert_tool(spec: &ToolSpec) -> OllamaTool {
    OllamaTool {
        kind: "function",
        function: OllamaFunction {
            name: spec.name.clone(),
            description: spec.description.clone(),
            parameters: spec.input_schema.clone(),
        },
    }
}

fn convert_message(message: &Message) -> Vec<OllamaMessage> {
    let role = match message.role {
        Role::User => "user",
        Role::Assistant => "assistant",
    };

    let blocks = match &message.content {
        MessageContent::Text(text) => {
            return vec![OllamaMessage {
                role: role.to_string(),
                content: text.clone(),
                tool_calls: Vec::new(),
            }]
        }
        MessageContent::Blocks(blocks) => blocks,
    };

    let mut text = String::new();
    let mut tool_calls = Vec::new();
    let mut tool_results = Vec::new();

    for block in blocks {
        match block {
            ContentBlock::Text { text: t } => {
                if !text.is_empty() {
                    text.push('\n');
                }
                text.push_str(t);
            }
            ContentBlock::ToolUse { name, arguments, .. } => tool_calls.push(OllamaToolCall {
                function: OllamaFunctionCall {
                    name: name.clone(),
                    arguments: arguments.clone(),
                },
            }),
            ContentBlock::ToolResult { content, .. } => tool_results.push(OllamaMessage {
                role: "tool".to_string(),
                content: content.clone(),
                tool_calls: Vec::new(),
            }),
        }
    }

    let mut out = Vec::new();
    if !text.is_empty() || !tool_calls.is_empty() {
        out.push(OllamaMessage {
            role: role.to_string(),
            content: text,
            tool_calls,
        });
    }
    out.extend(tool_results);
    out
}

#[async_trait::async_trait]
impl CompletionClient for OllamaClient {
    fn provider_name(&self) -> &str {
        "ollama"
    }

    async fn complete(&self, request: &CompletionRequest) -> AppResult<CompletionResponse> {
        tracing::info!("Sending chat request to Ollama");
        tracing::debug!("Request: {:?}", request);

        let ollama_request = self.to_ollama_request(request);
        let url = format!("{}/api/chat", self.base_url);

        let response = self
            .client
            .post(&url)
            .json(&ollama_request)
            .send()
            .await
            .map_err(|e| AppError::Llm(format!("Failed to send request to Ollama: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(AppError::Llm(format!(
                "Ollama API error ({}): {}",
                status, error_text
            )));
        }

        let chat_response: OllamaChatResponse = response
            .json()
            .await
            .map_err(|e| AppError::Llm(format!("Failed to parse Ollama response: {}", e)))?;

        tracing::debug!("Response: {:?}", chat_response);

        Ok(self.convert_response(chat_response))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_ollama_client_creation() {
        let client = OllamaClient::new();
        assert_eq!(client.provider_name(), "ollama");
        assert_eq!(client.base_url, "http://localhost:11434");
    }

    #[test]
    fn test_request_conversion_with_tool_round() {
        let client = OllamaClient::new();
        let request = CompletionRequest::new(
            "llama3.2",
            vec![
                Message::user_text("What is in lesson 2?"),
                Message::assistant_blocks(vec![ContentBlock::tool_use(
                    "call_0",
                    "search_course_content",
                    json!({"query": "lesson 2"}),
                )]),
                Message::user_blocks(vec![ContentBlock::tool_result("call_0", "[MCP - Lesson 2]\nServers", false)]),
            ],
        )
        .with_system("You are a course assistant")
        .with_tools(vec![ToolSpec {
            name: "search_course_content".to_string(),
            description: "Search".to_string(),
            input_schema: json!({"type": "object"}),
        }])
        .with_temperature(0.0)
        .with_max_tokens(100);

        let ollama_req = client.to_ollama_request(&request);
        let roles: Vec<&str> = ollama_req.messages.iter().map(|m| m.role.as_str()).collect();
        assert_eq!(roles, vec!["system", "user", "assistant", "tool"]);
        assert_eq!(ollama_req.messages[2].tool_calls[0].function.name, "search_course_content");
        assert_eq!(ollama_req.messages[3].content, "[MCP - Lesson 2]\nServers");
        assert_eq!(ollama_req.tools.len(), 1);
        assert_eq!(ollama_req.options.num_predict, 100);
        assert!(!ollama_req.stream);
    }

    #[test]
    fn test_tool_call_response_maps_to_tool_use() {
        let client = OllamaClient::new();
        let raw = json!({
            "model": "llama3.2",
            "message": {
                "role": "assistant",
                "content": "",
                "tool_calls": [{"function": {"name": "get_course_outline", "arguments": {"course_title": "MCP"}}}]
            },
            "done": true,
            "prompt_eval_count": 10,
            "eval_count": 5
        });
        let parsed: OllamaChatResponse = serde_json::from_value(raw).unwrap();
        let response = client.convert_response(parsed);

        assert!(response.requests_tools());
        assert_eq!(response.usage.total_tokens, 15);
        assert!(matches!(
            &response.content[0],
            ContentBlock::ToolUse { call_id, .. } if call_id == "call_0"
        ));
    }

    #[test]
    fn test_text_response_ends_turn() {
        let client = OllamaClient::new();
        let raw = json!({"message": {"role": "assistant", "content": "Four."}, "done": true, "done_reason": "stop"});
        let parsed: OllamaChatResponse = serde_json::from_value(raw).unwrap();
        let response = client.convert_response(parsed);

        assert!(!response.requests_tools());
        assert_eq!(response.first_text(), "Four.");
        assert_eq!(response.stop_reason.as_deref(), Some("stop"));
    }
}
