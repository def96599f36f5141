//! Planning request handler
//!
//! The trust boundary: text in, validated [`Command`] out. Everything the
//! backend returns is treated as adversarial until the validator accepts it.

use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, info, warn};

use super::PlanError;
use crate::command::{self, Command, RawCandidate};
use crate::llm::{CompletionRequest, LlmClient, LlmError};
use crate::prompts;

/// Maps transcripts to commands through the model backend
pub struct Planner {
    llm: Arc<dyn LlmClient>,
    system_prompt: String,
}

impl Planner {
    pub fn new(llm: Arc<dyn LlmClient>) -> eyre::Result<Self> {
        debug!(model = llm.model(), "Planner::new: called");
        let system_prompt = prompts::plan_system_prompt()?;
        Ok(Self { llm, system_prompt })
    }

    pub fn model(&self) -> &str {
        self.llm.model()
    }

    /// Plan a single transcript
    pub async fn plan(&self, text: &str) -> Result<Command, PlanError> {
        let text = text.trim();
        if text.is_empty() {
            debug!("plan: empty input, not calling backend");
            return Err(PlanError::EmptyInput);
        }
        info!(%text, "Planning transcript");

        let request = CompletionRequest::json(self.system_prompt.clone(), text);
        let response = self.llm.complete(request).await.map_err(backend_error)?;

        let raw = parse_payload(response.payload)?;
        let command = command::validate(raw).inspect_err(|reason| {
            warn!(%reason, "plan: candidate rejected");
        })?;

        info!(%command, "Planned command");
        Ok(command)
    }
}

fn backend_error(e: LlmError) -> PlanError {
    match e {
        LlmError::InvalidResponse(raw) => {
            warn!(%raw, "backend_error: unreadable backend body");
            PlanError::MalformedBackendOutput(raw)
        }
        other => {
            warn!(error = %other, "backend_error: backend unavailable");
            PlanError::BackendUnavailable(other.to_string())
        }
    }
}

/// Turn the backend payload into a raw candidate object
///
/// A string payload must hold exactly one JSON object; an already structured
/// object is used as is. Nothing here knows about command tags.
pub fn parse_payload(payload: Option<Value>) -> Result<RawCandidate, PlanError> {
    match payload {
        None | Some(Value::Null) => {
            warn!("parse_payload: no response payload");
            Err(PlanError::EmptyBackendResponse)
        }
        Some(Value::String(text)) if text.trim().is_empty() => {
            warn!("parse_payload: blank response payload");
            Err(PlanError::EmptyBackendResponse)
        }
        Some(Value::String(text)) => match serde_json::from_str::<Value>(&text) {
            Ok(Value::Object(map)) if map.is_empty() => {
                warn!("parse_payload: empty object in response payload");
                Err(PlanError::EmptyBackendResponse)
            }
            Ok(Value::Object(map)) => Ok(map),
            Ok(_) | Err(_) => {
                warn!(raw = %text, "parse_payload: payload is not a single JSON object");
                Err(PlanError::MalformedBackendOutput(text))
            }
        },
        Some(Value::Object(map)) if map.is_empty() => {
            warn!("parse_payload: empty structured payload");
            Err(PlanError::EmptyBackendResponse)
        }
        Some(Value::Object(map)) => Ok(map),
        Some(other) => {
            warn!(raw = %other, "parse_payload: structured payload is not an object");
            Err(PlanError::MalformedBackendOutput(other.to_string()))
        }
    }
}
