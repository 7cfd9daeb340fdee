//! Completion provider factory.
//!
//! Builds a `CompletionClient` from the configured provider name, resolving
//! endpoints and checking that required secrets are present.

use crate::client::CompletionClient;
use crate::providers::{AnthropicClient, OllamaClient};
use crate::types::ProviderType;
use coursebot_core::{AppError, AppResult};
use std::sync::Arc;

/// Create a completion client based on the provider name.
///
/// # Arguments
/// * `provider` - Provider identifier ("anthropic", "ollama")
/// * `endpoint` - Optional custom endpoint URL
/// * `api_key` - Optional API key (required by Anthropic)
///
/// # Errors
/// Returns a configuration error if the provider is unknown or a required
/// API key is missing.
pub fn create_client(
    provider: &str,
    endpoint: Option<&str>,
    api_key: Option<&str>,
) -> AppResult<Arc<dyn CompletionClient>> {
    let provider_type = ProviderType::parse(provider)
        .ok_or_else(|| AppError::Config(format!("Unknown provider: {}", provider)))?;

    tracing::debug!(provider = provider_type.as_str(), ?endpoint, "Creating completion client");

    match provider_type {
        ProviderType::Anthropic => {
            let api_key = api_key.filter(|k| !k.is_empty()).ok_or_else(|| {
                AppError::Config("Anthropic provider requires API key".to_string())
            })?;
            let client = match endpoint {
                Some(url) => AnthropicClient::with_base_url(url, api_key),
                None => AnthropicClient::new(api_key),
            };
            Ok(Arc::new(client))
        }
        ProviderType::Ollama => {
            let base_url = endpoint.unwrap_or("http://localhost:11434");
            Ok(Arc::new(OllamaClient::with_base_url(base_url)))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_ollama_client() {
        let client = create_client("ollama", None, None).unwrap();
        assert_eq!(client.provider_name(), "ollama");
    }

    #[test]
    fn test_create_anthropic_with_custom_endpoint() {
        let client = create_client("anthropic", Some("http://localhost:8080"), Some("key")).unwrap();
        assert_eq!(client.provider_name(), "anthropic");
    }

    #[test]
    fn test_anthropic_requires_api_key() {
        match create_client("anthropic", None, Some("")) {
            Err(err) => assert!(err.to_string().contains("requires API key")),
            Ok(_) => panic!("Expected error for Anthropic without API key"),
        }
    }

    #[test]
    fn test_unknown_provider() {
        match create_client("gguf", None, None) {
            Err(err) => assert!(err.to_string().contains("Unknown provider")),
            Ok(_) => panic!("Expected error for unknown provider"),
        }
    }
}
