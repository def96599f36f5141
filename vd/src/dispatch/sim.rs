//! Simulated device
//!
//! Logs what the dispenser would do instead of driving hardware. Nothing is
//! kept after the log line.

use async_trait::async_trait;
use tracing::info;

use super::{DispatchError, Transport};
use crate::command::Command;

#[derive(Debug, Default, Clone, Copy)]
pub struct SimTransport;

impl SimTransport {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Transport for SimTransport {
    async fn send(&mut self, command: &Command) -> Result<(), DispatchError> {
        info!("[SIM] Would {}", command.describe());
        Ok(())
    }

    fn describe(&self) -> String {
        "simulated device".to_string()
    }
}
