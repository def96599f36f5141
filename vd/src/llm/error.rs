//! LLM error types

use std::time::Duration;
use thiserror::Error;

/// Errors that can occur while talking to the model backend
#[derive(Debug, Error)]
pub enum LlmError {
    #[error("API error {status}: {message}")]
    ApiError { status: u16, message: String },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// The backend answered with a body that is not its JSON envelope
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Timeout after {0:?}")]
    Timeout(Duration),

    #[error("Unknown LLM provider: '{0}'. Supported: ollama")]
    UnknownProvider(String),
}
