//! voxdispense - voice-driven dispenser control
//!
//! A spoken request is transcribed, turned into exactly one device command by
//! an untrusted language model, validated and clamped against a closed
//! command schema, then sent to the dispenser controller.
//!
//! # Modules
//!
//! - [`command`] - command schema, typed commands and the plan validator
//! - [`llm`] - model backend client trait and Ollama implementation
//! - [`planner`] - transcript to validated command, local or remote
//! - [`server`] - the `/plan` HTTP service
//! - [`dispatch`] - serial, HTTP and simulated device transports
//! - [`pipeline`] - utterance loop with the single in-flight slot
//! - [`config`] - configuration types and loading
//! - [`cli`] - command-line interface

pub mod cli;
pub mod command;
pub mod config;
pub mod dispatch;
pub mod llm;
pub mod pipeline;
pub mod planner;
pub mod prompts;
pub mod server;

pub use command::{Command, Milliliters, PillCount, RawCandidate, RejectionReason, validate};
pub use config::{Config, DeviceConfig, LlmConfig, TransportKind};
pub use dispatch::{DispatchError, Transport, dispatch, open_transport};
pub use llm::{CompletionRequest, CompletionResponse, LlmClient, LlmError, OllamaClient, create_client};
pub use pipeline::{InFlight, LineSource, Outcome, Pipeline, PipelineStats, TranscriptSource, Utterance};
pub use planner::{CommandPlanner, PlanError, Planner, RemotePlanner, parse_payload};
