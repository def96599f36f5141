//! Newline-delimited JSON transport
//!
//! One command per line. The serial device is the production writer; any
//! `Write` works, which keeps the framing testable without hardware.

use std::io::Write;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use serialport::SerialPort;
use tracing::{debug, info};

use super::{DispatchError, Transport};
use crate::command::Command;
use crate::config::DeviceConfig;

/// Writes each command as a single JSON line
pub struct LineTransport<W> {
    writer: Arc<Mutex<W>>,
    label: String,
}

/// Line transport over a serial port
pub type SerialTransport = LineTransport<Box<dyn SerialPort>>;

impl<W: Write + Send + 'static> LineTransport<W> {
    pub fn new(writer: W, label: impl Into<String>) -> Self {
        Self {
            writer: Arc::new(Mutex::new(writer)),
            label: label.into(),
        }
    }
}

impl LineTransport<Box<dyn SerialPort>> {
    /// Open the configured serial port and wait for the board to settle
    ///
    /// Opening the port resets most boards, so the first write has to wait.
    pub async fn open(config: &DeviceConfig) -> Result<Self, DispatchError> {
        debug!(port = %config.serial_port, baud = config.baud, "SerialTransport::open: called");
        let port = serialport::new(&config.serial_port, config.baud)
            .timeout(Duration::from_millis(config.write_timeout_ms))
            .open()
            .map_err(|e| DispatchError::TransportFailure(format!("Failed to open {}: {}", config.serial_port, e)))?;

        tokio::time::sleep(Duration::from_millis(config.settle_ms)).await;
        info!(port = %config.serial_port, baud = config.baud, "Serial port open");

        Ok(Self::new(port, format!("serial {} @ {}", config.serial_port, config.baud)))
    }
}

#[async_trait]
impl<W: Write + Send + 'static> Transport for LineTransport<W> {
    async fn send(&mut self, command: &Command) -> Result<(), DispatchError> {
        let mut line = command.to_line();
        line.push('\n');
        debug!(label = %self.label, line = %line.trim_end(), "LineTransport::send: writing");

        let writer = Arc::clone(&self.writer);
        tokio::task::spawn_blocking(move || -> Result<(), DispatchError> {
            let mut writer = writer
                .lock()
                .map_err(|_| DispatchError::TransportFailure("writer lock poisoned".to_string()))?;
            writer.write_all(line.as_bytes())?;
            writer.flush()?;
            Ok(())
        })
        .await
        .map_err(|e| DispatchError::TransportFailure(e.to_string()))?
    }

    fn describe(&self) -> String {
        self.label.clone()
    }
}
