//! Completion provider crate for coursebot.
//!
//! Provides the conversation data model exchanged with language models and a
//! provider-agnostic `CompletionClient` trait with tool-calling support.
//!
//! # Providers
//! - **Anthropic**: Messages API (default)
//! - **Ollama**: local runtime via `/api/chat`
//!
//! # Example
//! ```no_run
//! use coursebot_llm::{CompletionClient, CompletionRequest, Message, providers::AnthropicClient};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = AnthropicClient::new("sk-...");
//! let request = CompletionRequest::new("claude-sonnet-4-20250514", vec![Message::user_text("Hello")]);
//! let response = client.complete(&request).await?;
//! println!("{}", response.first_text());
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod factory;
pub mod providers;
pub mod types;

// Re-export main types
pub use client::{CompletionClient, CompletionRequest, CompletionResponse, LlmUsage};
pub use factory::create_client;
pub use providers::{AnthropicClient, OllamaClient};
pub use types::{ContentBlock, Message, MessageContent, ProviderType, Role, ToolChoice, ToolSpec};
