//! LLM client module
//!
//! The model backend is untrusted and unreliable: this module only moves
//! bytes. Interpreting the payload is the planner's job.

use std::sync::Arc;

use tracing::debug;

pub mod client;
mod error;
mod ollama;
mod types;

pub use client::LlmClient;
pub use error::LlmError;
pub use ollama::OllamaClient;
pub use types::{CompletionRequest, CompletionResponse};

use crate::config::LlmConfig;

/// Create an LLM client based on the provider specified in config
pub fn create_client(config: &LlmConfig) -> Result<Arc<dyn LlmClient>, LlmError> {
    debug!(provider = %config.provider, model = %config.model, "create_client: called");
    match config.provider.as_str() {
        "ollama" => {
            debug!("create_client: creating Ollama client");
            Ok(Arc::new(OllamaClient::from_config(config)?))
        }
        other => {
            debug!(provider = %other, "create_client: unknown provider");
            Err(LlmError::UnknownProvider(other.to_string()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_client_ollama() {
        let client = create_client(&LlmConfig::default()).unwrap();
        assert_eq!(client.model(), "gpt-oss-20b");
    }

    #[test]
    fn test_create_client_unknown_provider() {
        let config = LlmConfig {
            provider: "anthropic".to_string(),
            ..Default::default()
        };
        assert!(matches!(create_client(&config), Err(LlmError::UnknownProvider(p)) if p == "anthropic"));
    }
}
