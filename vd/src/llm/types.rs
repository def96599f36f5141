//! LLM request/response types
//!
//! Provider-agnostic shapes for one single-shot completion.

use serde_json::Value;
use tracing::debug;

/// A completion request - everything needed for one backend call
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    /// Fixed system instruction
    pub system_prompt: String,

    /// The user's text
    pub user_text: String,

    /// Ask the backend to constrain output to JSON
    pub json_format: bool,

    /// Sampling temperature; 0 asks for deterministic output
    pub temperature: f32,
}

impl CompletionRequest {
    /// A JSON-only, zero-temperature request
    pub fn json(system_prompt: impl Into<String>, user_text: impl Into<String>) -> Self {
        debug!("CompletionRequest::json: called");
        Self {
            system_prompt: system_prompt.into(),
            user_text: user_text.into(),
            json_format: true,
            temperature: 0.0,
        }
    }

    /// Render as a single completion-style prompt
    pub fn render_prompt(&self) -> String {
        format!("System: {}\nUser: {}\nAssistant:", self.system_prompt, self.user_text)
    }
}

/// The backend's answer
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CompletionResponse {
    /// Generated payload, either a JSON string or an already structured value.
    /// `None` when the backend omitted it.
    pub payload: Option<Value>,
}

impl CompletionResponse {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            payload: Some(Value::String(text.into())),
        }
    }

    pub fn empty() -> Self {
        Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_request_defaults() {
        let req = CompletionRequest::json("sys", "give me water");
        assert!(req.json_format);
        assert_eq!(req.temperature, 0.0);
    }

    #[test]
    fn test_render_prompt() {
        let req = CompletionRequest::json("Only JSON.", "stop");
        assert_eq!(req.render_prompt(), "System: Only JSON.\nUser: stop\nAssistant:");
    }
}
