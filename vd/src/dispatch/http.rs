//! HTTP device controller transport

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tracing::debug;

use super::{DispatchError, Transport};
use crate::command::Command;
use crate::config::DeviceConfig;

/// Posts each command as JSON to `{base}/cmd`
pub struct HttpTransport {
    url: String,
    http: Client,
}

impl HttpTransport {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, DispatchError> {
        let url = format!("{}/cmd", base_url.trim_end_matches('/'));
        debug!(%url, ?timeout, "HttpTransport::new: called");
        let http = Client::builder().timeout(timeout).build()?;
        Ok(Self { url, http })
    }

    pub fn from_config(config: &DeviceConfig) -> Result<Self, DispatchError> {
        Self::new(&config.url, Duration::from_millis(config.timeout_ms))
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&mut self, command: &Command) -> Result<(), DispatchError> {
        debug!(url = %self.url, %command, "HttpTransport::send: posting");
        let response = self.http.post(&self.url).json(command).send().await?;

        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        if !status.is_success() {
            debug!(%status, %body, "HttpTransport::send: controller error");
            return Err(DispatchError::TransportFailure(format!(
                "controller returned {}: {}",
                status.as_u16(),
                body.trim()
            )));
        }

        debug!(%status, %body, "HttpTransport::send: accepted");
        Ok(())
    }

    fn describe(&self) -> String {
        format!("http {}", self.url)
    }
}
