//! Dispatch adapter
//!
//! Sends one validated [`Command`] to the device controller. No queueing, no
//! batching and no retries; a transport failure is returned to the caller,
//! who logs it and waits for the next utterance.

use async_trait::async_trait;
use tracing::{debug, info, warn};

mod error;
mod http;
mod serial;
mod sim;

pub use error::DispatchError;
pub use http::HttpTransport;
pub use serial::{LineTransport, SerialTransport};
pub use sim::SimTransport;

use crate::command::Command;
use crate::config::{DeviceConfig, TransportKind};

/// A channel to the device controller
#[async_trait]
pub trait Transport: Send {
    /// Deliver one command as a single message
    async fn send(&mut self, command: &Command) -> Result<(), DispatchError>;

    /// Short description for logs
    fn describe(&self) -> String;
}

/// Transmit one command over the given transport
pub async fn dispatch(cmd: Command, channel: &mut dyn Transport) -> Result<(), DispatchError> {
    debug!(%cmd, channel = %channel.describe(), "dispatch: called");
    match channel.send(&cmd).await {
        Ok(()) => {
            info!(%cmd, channel = %channel.describe(), "Dispatched command");
            Ok(())
        }
        Err(e) => {
            warn!(%cmd, channel = %channel.describe(), error = %e, "Dispatch failed, not retrying");
            Err(e)
        }
    }
}

/// Open the transport selected by `kind`
pub async fn open_transport(config: &DeviceConfig, kind: TransportKind) -> Result<Box<dyn Transport>, DispatchError> {
    debug!(?kind, "open_transport: called");
    match kind {
        TransportKind::Serial => Ok(Box::new(SerialTransport::open(config).await?)),
        TransportKind::Http => Ok(Box::new(HttpTransport::from_config(config)?)),
        TransportKind::Sim => Ok(Box::new(SimTransport::new())),
    }
}
