//! LLM client module
//!
//! One trait, two providers. The provider is picked from `llm.provider` in the
//! config; requests are single-turn and stateless.

use std::sync::Arc;
use std::time::Duration;

use tracing::debug;

mod anthropic;
pub mod client;
mod error;
mod gemini;
mod types;

pub use anthropic::AnthropicClient;
pub use client::{LlmClient, RetryPolicy};
pub use error::{LlmError, is_retryable_status};
pub use gemini::GeminiClient;
pub use types::{CompletionRequest, CompletionResponse, Message, Role, StopReason, TokenUsage};

use crate::config::LlmConfig;

/// Provider names accepted in `llm.provider`
pub const PROVIDERS: &[&str] = &["gemini", "anthropic"];

/// Everything a provider client needs, with defaults already applied
#[derive(Debug, Clone)]
pub struct ClientSettings {
    pub model: String,
    pub api_key: String,
    pub base_url: String,
    pub max_tokens: u32,
    pub timeout: Duration,
}

impl ClientSettings {
    /// Resolve settings from config plus an already-resolved API key
    pub fn from_config(config: &LlmConfig, api_key: String) -> Self {
        Self {
            model: config.model.clone(),
            api_key,
            base_url: config.resolved_base_url().to_string(),
            max_tokens: config.max_tokens,
            timeout: Duration::from_millis(config.timeout_ms),
        }
    }
}

/// Default base URL for a provider
pub fn default_base_url(provider: &str) -> Option<&'static str> {
    match provider {
        "gemini" => Some(gemini::DEFAULT_BASE_URL),
        "anthropic" => Some(anthropic::DEFAULT_BASE_URL),
        _ => None,
    }
}

/// Create an LLM client based on the provider specified in config
pub fn create_client(config: &LlmConfig, api_key: String) -> Result<Arc<dyn LlmClient>, LlmError> {
    let settings = ClientSettings::from_config(config, api_key);
    debug!(provider = %config.provider, model = %settings.model, "create_client: called");
    match config.provider.as_str() {
        "gemini" => {
            debug!("create_client: creating Gemini client");
            Ok(Arc::new(GeminiClient::new(&settings)?))
        }
        "anthropic" => {
            debug!("create_client: creating Anthropic client");
            Ok(Arc::new(AnthropicClient::new(&settings)?))
        }
        other => {
            debug!(provider = %other, "create_client: unknown provider");
            Err(LlmError::InvalidResponse(format!(
                "Unknown LLM provider: '{}'. Supported: {}",
                other,
                PROVIDERS.join(", ")
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_client_known_providers() {
        let mut config = LlmConfig::default();
        assert!(create_client(&config, "key".to_string()).is_ok());

        config.provider = "anthropic".to_string();
        assert!(create_client(&config, "key".to_string()).is_ok());
    }

    #[test]
    fn test_create_client_unknown_provider() {
        let config = LlmConfig {
            provider: "openai".to_string(),
            ..LlmConfig::default()
        };
        let err = create_client(&config, "key".to_string()).err().unwrap();
        assert!(err.to_string().contains("Unknown LLM provider: 'openai'"));
    }

    #[test]
    fn test_settings_use_provider_default_base_url() {
        let config = LlmConfig {
            provider: "anthropic".to_string(),
            ..LlmConfig::default()
        };
        let settings = ClientSettings::from_config(&config, "k".to_string());
        assert_eq!(settings.base_url, "https://api.anthropic.com");
        assert_eq!(settings.timeout, Duration::from_millis(config.timeout_ms));
    }
}
