//! Bounded tool-use loop against the completion provider.

use crate::tools::{ToolContext, ToolRegistry};
use coursebot_core::AppResult;
use coursebot_llm::{CompletionClient, CompletionRequest, ContentBlock, Message, ToolSpec};
use std::sync::Arc;

/// Default cap on tool rounds per query.
pub const MAX_TOOL_ROUNDS: usize = 2;

/// Fixed instructions sent with every request.
pub const SYSTEM_PROMPT: &str = "You are an assistant for course materials and educational content, with tools for looking up course information.

Available tools:
1. search_course_content: search for specific content within course materials
2. get_course_outline: get a course's title, link and complete lesson list

When to use which tool:
- get_course_outline for questions about what lessons a course has, its structure or outline, the topics it covers, or how many lessons it contains
- search_course_content for questions about specific concepts or detailed lesson content
- You may make up to two rounds of tool calls per question: use the first to gather information and the second to refine it if needed
- If a search finds nothing, say so plainly without offering alternatives

How to answer:
- General knowledge questions: answer from what you know, without searching
- Course-specific questions: use the appropriate tool first, then answer
- No meta-commentary about searching or tools; give the answer directly

Keep answers brief and focused, educational, and in clear, accessible language.";

/// Where the loop stands between provider calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    /// Tools may still be offered; holds the number of completed tool rounds.
    Continuing(usize),
    /// The round cap is reached; the next call goes out without tools.
    Final,
}

impl LoopState {
    pub fn initial(max_rounds: usize) -> Self {
        if max_rounds == 0 {
            LoopState::Final
        } else {
            LoopState::Continuing(0)
        }
    }

    /// State after one more tool round has completed.
    pub fn after_tool_round(self, max_rounds: usize) -> Self {
        match self {
            LoopState::Continuing(done) if done + 1 < max_rounds => LoopState::Continuing(done + 1),
            _ => LoopState::Final,
        }
    }
}

/// Drives one query's conversation with the completion provider.
pub struct GenerationLoop {
    client: Arc<dyn CompletionClient>,
    model: String,
    max_tokens: u32,
    temperature: f32,
    max_tool_rounds: usize,
}

impl GenerationLoop {
    pub fn new(client: Arc<dyn CompletionClient>, model: impl Into<String>) -> Self {
        Self {
            client,
            model: model.into(),
            max_tokens: 800,
            temperature: 0.0,
            max_tool_rounds: MAX_TOOL_ROUNDS,
        }
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_max_tool_rounds(mut self, max_tool_rounds: usize) -> Self {
        self.max_tool_rounds = max_tool_rounds;
        self
    }

    /// Answer `query`, letting the model call tools for at most the configured
    /// number of rounds.
    ///
    /// Tool failures are fed back to the model as text. Provider failures are
    /// returned as `Err` unchanged.
    pub async fn generate(
        &self,
        query: &str,
        history: Option<&str>,
        tools: &[ToolSpec],
        registry: Option<&ToolRegistry>,
        ctx: &mut ToolContext,
    ) -> AppResult<String> {
        let system = system_prompt(history);
        let mut messages = vec![Message::user_text(query)];
        let mut state = LoopState::initial(self.max_tool_rounds);

        while let LoopState::Continuing(round) = state {
            tracing::debug!(round, messages = messages.len(), "Requesting completion");

            let request = self.request(&system, &messages).with_tools(tools.to_vec());
            let response = self.client.complete(&request).await?;

            let registry = match registry {
                Some(registry) if response.requests_tools() => registry,
                _ => return Ok(response.first_text()),
            };

            let results = run_tool_calls(&response.content, registry, ctx).await;
            messages.push(Message::assistant_blocks(response.content));
            messages.push(Message::user_blocks(results));

            state = state.after_tool_round(self.max_tool_rounds);
        }

        tracing::info!(
            max_rounds = self.max_tool_rounds,
            "Tool round limit reached, requesting final answer without tools"
        );

        let response = self.client.complete(&self.request(&system, &messages)).await?;
        Ok(response.first_text())
    }

    fn request(&self, system: &str, messages: &[Message]) -> CompletionRequest {
        CompletionRequest::new(self.model.clone(), messages.to_vec())
            .with_system(system)
            .with_max_tokens(self.max_tokens)
            .with_temperature(self.temperature)
    }
}

fn system_prompt(history: Option<&str>) -> String {
    match history {
        Some(history) if !history.is_empty() => {
            format!("{}\n\nPrevious conversation:\n{}", SYSTEM_PROMPT, history)
        }
        _ => SYSTEM_PROMPT.to_string(),
    }
}

/// Execute every tool-use block in order, one result block per call.
async fn run_tool_calls(
    content: &[ContentBlock],
    registry: &ToolRegistry,
    ctx: &mut ToolContext,
) -> Vec<ContentBlock> {
    let mut results = Vec::new();

    for block in content {
        let ContentBlock::ToolUse { call_id, name, arguments } = block else {
            continue;
        };

        tracing::info!(tool = %name, "Executing tool");

        let result = match registry.execute(name, arguments, ctx).await {
            Ok(text) => ContentBlock::tool_result(call_id.clone(), text, false),
            Err(e) => {
                tracing::warn!(tool = %name, error = %e, "Tool execution failed");
                ContentBlock::tool_result(call_id.clone(), format!("Tool execution error: {}", e), true)
            }
        };
        results.push(result);
    }

    results
}
