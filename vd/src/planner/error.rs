//! Planner error types

use thiserror::Error;

use crate::command::RejectionReason;

/// Why a transcript did not produce a command
#[derive(Debug, Error)]
pub enum PlanError {
    #[error("missing text")]
    EmptyInput,

    #[error("LLM backend unavailable: {0}")]
    BackendUnavailable(String),

    #[error("LLM returned empty response")]
    EmptyBackendResponse,

    #[error("Bad LLM JSON: {0}")]
    MalformedBackendOutput(String),

    #[error(transparent)]
    Invalid(#[from] RejectionReason),

    /// Error reported by a remote planning service
    #[error("planner returned {status}: {detail}")]
    Remote { status: u16, detail: String },

    #[error("server error: {0}")]
    Internal(String),
}

impl PlanError {
    /// HTTP status the planning service answers with
    pub fn status_code(&self) -> u16 {
        match self {
            PlanError::EmptyInput => 400,
            PlanError::Invalid(_) => 400,
            PlanError::BackendUnavailable(_) => 502,
            PlanError::EmptyBackendResponse => 502,
            PlanError::MalformedBackendOutput(_) => 502,
            PlanError::Remote { status, .. } => *status,
            PlanError::Internal(_) => 500,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(PlanError::EmptyInput.status_code(), 400);
        assert_eq!(
            PlanError::Invalid(RejectionReason::UnknownCommand("DANCE".to_string())).status_code(),
            400
        );
        assert_eq!(
            PlanError::Invalid(RejectionReason::MalformedField("ml")).status_code(),
            400
        );
        assert_eq!(PlanError::BackendUnavailable("refused".to_string()).status_code(), 502);
        assert_eq!(PlanError::EmptyBackendResponse.status_code(), 502);
        assert_eq!(PlanError::MalformedBackendOutput("x".to_string()).status_code(), 502);
        assert_eq!(PlanError::Internal("boom".to_string()).status_code(), 500);
        assert_eq!(
            PlanError::Remote {
                status: 504,
                detail: "slow".to_string()
            }
            .status_code(),
            504
        );
    }

    #[test]
    fn test_display_carries_detail() {
        assert_eq!(
            PlanError::MalformedBackendOutput("sure, here's water".to_string()).to_string(),
            "Bad LLM JSON: sure, here's water"
        );
        assert_eq!(
            PlanError::Invalid(RejectionReason::UnknownCommand("DANCE".to_string())).to_string(),
            r#"unknown cmd: "DANCE""#
        );
    }
}
