//! Ollama API client implementation
//!
//! Implements the LlmClient trait against Ollama's `/api/generate` endpoint
//! with streaming disabled. No retries: a failed call is reported and the
//! user is asked to speak again.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

use super::{CompletionRequest, CompletionResponse, LlmClient, LlmError};
use crate::config::LlmConfig;

/// Ollama API client
pub struct OllamaClient {
    model: String,
    base_url: String,
    http: Client,
    timeout: Duration,
}

impl OllamaClient {
    /// Create a new client from configuration
    pub fn from_config(config: &LlmConfig) -> Result<Self, LlmError> {
        debug!(?config, "from_config: called");
        let timeout = Duration::from_millis(config.timeout_ms);

        let http = Client::builder().timeout(timeout).build().map_err(LlmError::Network)?;

        Ok(Self {
            model: config.model.clone(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            http,
            timeout,
        })
    }

    /// Build the request body for `/api/generate`
    fn build_request_body(&self, request: &CompletionRequest) -> Value {
        debug!(%self.model, json_format = request.json_format, "build_request_body: called");

        let mut body = serde_json::json!({
            "model": self.model,
            "options": { "temperature": request.temperature },
            "stream": false,
            "prompt": request.render_prompt(),
        });

        if request.json_format {
            body["format"] = serde_json::json!("json");
        }

        body
    }

    /// Pull the `response` field out of a raw body
    ///
    /// An empty body or a body without `response` yields an empty completion;
    /// a body that is not a JSON object is an invalid response.
    fn parse_body(text: &str) -> Result<CompletionResponse, LlmError> {
        if text.trim().is_empty() {
            debug!("parse_body: empty body");
            return Ok(CompletionResponse::empty());
        }

        let api_response: OllamaResponse =
            serde_json::from_str(text).map_err(|_| LlmError::InvalidResponse(text.to_string()))?;

        debug!(model = ?api_response.model, done = ?api_response.done, "parse_body: parsed");
        Ok(CompletionResponse {
            payload: api_response.response.filter(|v| !v.is_null()),
        })
    }

    fn map_send_error(&self, e: reqwest::Error) -> LlmError {
        if e.is_timeout() {
            debug!(timeout = ?self.timeout, "map_send_error: timed out");
            LlmError::Timeout(self.timeout)
        } else {
            debug!(error = %e, "map_send_error: network error");
            LlmError::Network(e)
        }
    }
}

#[async_trait]
impl LlmClient for OllamaClient {
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, LlmError> {
        debug!(%self.model, "complete: called");
        let url = format!("{}/api/generate", self.base_url);
        let body = self.build_request_body(&request);

        let response = self
            .http
            .post(&url)
            .header("content-type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| self.map_send_error(e))?;

        let status = response.status().as_u16();
        if !response.status().is_success() {
            debug!(%status, "complete: API error");
            let text = response.text().await.unwrap_or_default();
            return Err(LlmError::ApiError { status, message: text });
        }

        let text = response.text().await.map_err(|e| self.map_send_error(e))?;
        debug!(body_len = text.len(), "complete: success");
        Self::parse_body(&text)
    }

    fn model(&self) -> &str {
        &self.model
    }
}

// Ollama API response types

#[derive(Debug, Deserialize)]
struct OllamaResponse {
    model: Option<String>,
    response: Option<Value>,
    done: Option<bool>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> OllamaClient {
        OllamaClient::from_config(&LlmConfig::default()).unwrap()
    }

    #[test]
    fn test_build_request_body() {
        let body = client().build_request_body(&CompletionRequest::json("Only JSON.", "water please"));

        assert_eq!(body["model"], "gpt-oss-20b");
        assert_eq!(body["format"], "json");
        assert_eq!(body["options"]["temperature"], 0.0);
        assert_eq!(body["stream"], false);
        assert_eq!(body["prompt"], "System: Only JSON.\nUser: water please\nAssistant:");
    }

    #[test]
    fn test_build_request_body_without_json_format() {
        let mut request = CompletionRequest::json("sys", "hi");
        request.json_format = false;
        let body = client().build_request_body(&request);
        assert!(body.get("format").is_none());
    }

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let config = LlmConfig {
            base_url: "http://localhost:11434/".to_string(),
            ..Default::default()
        };
        let client = OllamaClient::from_config(&config).unwrap();
        assert_eq!(client.base_url, "http://localhost:11434");
    }

    #[test]
    fn test_parse_body_string_response() {
        let resp = OllamaClient::parse_body(r#"{"model":"m","response":"{\"cmd\":\"STOP\"}","done":true}"#).unwrap();
        assert_eq!(resp, CompletionResponse::text(r#"{"cmd":"STOP"}"#));
    }

    #[test]
    fn test_parse_body_object_response() {
        let resp = OllamaClient::parse_body(r#"{"response":{"cmd":"STATUS"}}"#).unwrap();
        assert_eq!(resp.payload, Some(serde_json::json!({"cmd": "STATUS"})));
    }

    #[test]
    fn test_parse_body_missing_or_empty() {
        assert_eq!(OllamaClient::parse_body("").unwrap(), CompletionResponse::empty());
        assert_eq!(OllamaClient::parse_body("{}").unwrap(), CompletionResponse::empty());
        assert_eq!(
            OllamaClient::parse_body(r#"{"response":null}"#).unwrap(),
            CompletionResponse::empty()
        );
    }

    #[test]
    fn test_parse_body_not_json() {
        let err = OllamaClient::parse_body("<html>bad gateway</html>").unwrap_err();
        assert!(matches!(err, LlmError::InvalidResponse(ref raw) if raw.contains("bad gateway")));
    }
}
