//! Planning: transcript to validated command
//!
//! - [`Planner`] - in-process planning against the model backend
//! - [`RemotePlanner`] - delegate to a `/plan` service over HTTP
//! - [`CommandPlanner`] - the seam the voice pipeline plans through

use async_trait::async_trait;

mod error;
mod handler;
mod remote;

pub use error::PlanError;
pub use handler::{Planner, parse_payload};
pub use remote::RemotePlanner;

use crate::command::Command;

/// Anything that can turn a transcript into a validated command
#[async_trait]
pub trait CommandPlanner: Send + Sync {
    async fn plan(&self, text: &str) -> Result<Command, PlanError>;

    /// Short description for logs
    fn describe(&self) -> String;
}

#[async_trait]
impl CommandPlanner for Planner {
    async fn plan(&self, text: &str) -> Result<Command, PlanError> {
        Planner::plan(self, text).await
    }

    fn describe(&self) -> String {
        format!("local planner ({})", self.model())
    }
}

#[async_trait]
impl CommandPlanner for RemotePlanner {
    async fn plan(&self, text: &str) -> Result<Command, PlanError> {
        RemotePlanner::plan(self, text).await
    }

    fn describe(&self) -> String {
        format!("remote planner ({})", self.url())
    }
}
