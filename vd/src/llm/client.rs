//! LlmClient trait definition

use async_trait::async_trait;

use super::{CompletionRequest, CompletionResponse, LlmError};

/// Stateless LLM client - each call is independent
///
/// There is no conversation state: every utterance is planned from the fixed
/// system prompt and the transcript alone.
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// Send a single non-streaming completion request
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, LlmError>;

    /// Model identifier, for diagnostics
    fn model(&self) -> &str;
}
