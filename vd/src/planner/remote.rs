//! Client for a remote `/plan` service
//!
//! Used by the voice pipeline when planning runs on another host. The
//! service's answer is validated again locally: a command never skips the
//! validator just because it came over the network.

use std::time::Duration;

use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, warn};

use super::{PlanError, parse_payload};
use crate::command::{self, Command};

/// HTTP client for `POST /plan`
pub struct RemotePlanner {
    url: String,
    http: Client,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    detail: String,
}

impl RemotePlanner {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, PlanError> {
        let url = url.into();
        debug!(%url, ?timeout, "RemotePlanner::new: called");
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| PlanError::Internal(e.to_string()))?;
        Ok(Self { url, http })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub async fn plan(&self, text: &str) -> Result<Command, PlanError> {
        let text = text.trim();
        if text.is_empty() {
            debug!("RemotePlanner::plan: empty input, not sending");
            return Err(PlanError::EmptyInput);
        }

        let response = self
            .http
            .post(&self.url)
            .json(&serde_json::json!({ "text": text }))
            .send()
            .await
            .map_err(|e| {
                warn!(error = %e, url = %self.url, "RemotePlanner::plan: request failed");
                PlanError::BackendUnavailable(e.to_string())
            })?;

        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| PlanError::BackendUnavailable(e.to_string()))?;

        if !(200..300).contains(&status) {
            let detail = serde_json::from_str::<ErrorBody>(&body)
                .map(|b| b.detail)
                .unwrap_or(body);
            debug!(%status, %detail, "RemotePlanner::plan: planner error");
            return Err(PlanError::Remote { status, detail });
        }

        let raw = parse_payload(Some(Value::String(body)))?;
        Ok(command::validate(raw)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_empty_input_is_not_sent() {
        // Nothing listens on this port; an attempted request would fail differently
        let planner = RemotePlanner::new("http://127.0.0.1:9/plan", Duration::from_millis(200)).unwrap();
        assert!(matches!(planner.plan("  ").await, Err(PlanError::EmptyInput)));
    }

    #[tokio::test]
    async fn test_unreachable_planner_is_backend_unavailable() {
        let planner = RemotePlanner::new("http://127.0.0.1:9/plan", Duration::from_millis(500)).unwrap();
        assert!(matches!(
            planner.plan("water").await,
            Err(PlanError::BackendUnavailable(_))
        ));
    }
}
