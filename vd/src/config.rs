//! voxdispense configuration types and loading

use eyre::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Main configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Log level (TRACE, DEBUG, INFO, WARN, ERROR)
    #[serde(rename = "log-level", skip_serializing_if = "Option::is_none")]
    pub log_level: Option<String>,

    /// Model backend configuration
    pub llm: LlmConfig,

    /// Planning service configuration
    pub server: ServerConfig,

    /// Where the voice pipeline sends transcripts for planning
    pub planner: PlannerConfig,

    /// Device controller transport
    pub device: DeviceConfig,

    /// Transcript source settings
    pub speech: SpeechConfig,
}

impl Config {
    /// Load configuration with fallback chain
    pub fn load(config_path: Option<&PathBuf>) -> Result<Self> {
        // If explicit config path provided, try to load it
        if let Some(path) = config_path {
            return Self::load_from_file(path)
                .map(Self::with_env_overrides)
                .context(format!("Failed to load config from {}", path.display()));
        }

        // Try project-local config: ./voxdispense.yml
        let local_config = PathBuf::from("voxdispense.yml");
        if local_config.exists() {
            match Self::load_from_file(&local_config) {
                Ok(config) => return Ok(config.with_env_overrides()),
                Err(e) => {
                    tracing::warn!("Failed to load config from {}: {}", local_config.display(), e);
                }
            }
        }

        // Try user config: ~/.config/voxdispense/voxdispense.yml
        if let Some(config_dir) = dirs::config_dir() {
            let user_config = config_dir.join("voxdispense").join("voxdispense.yml");
            if user_config.exists() {
                match Self::load_from_file(&user_config) {
                    Ok(config) => return Ok(config.with_env_overrides()),
                    Err(e) => {
                        tracing::warn!("Failed to load config from {}: {}", user_config.display(), e);
                    }
                }
            }
        }

        tracing::info!("No config file found, using defaults");
        Ok(Self::default().with_env_overrides())
    }

    /// Read only the log level, before logging is initialised
    ///
    /// Errors are swallowed; the full load reports them later.
    pub fn load_log_level(config_path: Option<&PathBuf>) -> Option<String> {
        let candidates = match config_path {
            Some(path) => vec![path.clone()],
            None => [
                Some(PathBuf::from("voxdispense.yml")),
                dirs::config_dir().map(|d| d.join("voxdispense").join("voxdispense.yml")),
            ]
            .into_iter()
            .flatten()
            .collect(),
        };

        candidates
            .iter()
            .filter(|p| p.exists())
            .find_map(|p| Self::load_from_file(p).ok())
            .and_then(|c| c.log_level)
    }

    fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path).context("Failed to read config file")?;

        let config: Self = serde_yaml::from_str(&content).context("Failed to parse config file")?;

        tracing::info!("Loaded config from: {}", path.as_ref().display());
        Ok(config)
    }

    /// Apply `OLLAMA_MODEL` and `VD_SERIAL_PORT` environment overrides
    fn with_env_overrides(mut self) -> Self {
        if let Ok(model) = std::env::var("OLLAMA_MODEL")
            && !model.trim().is_empty()
        {
            tracing::debug!(%model, "with_env_overrides: OLLAMA_MODEL set");
            self.llm.model = model;
        }
        if let Ok(port) = std::env::var("VD_SERIAL_PORT")
            && !port.trim().is_empty()
        {
            tracing::debug!(%port, "with_env_overrides: VD_SERIAL_PORT set");
            self.device.serial_port = port;
        }
        self
    }
}

/// Model backend configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// Provider name (currently only "ollama" supported)
    pub provider: String,

    /// Model identifier
    pub model: String,

    /// API base URL
    #[serde(rename = "base-url")]
    pub base_url: String,

    /// Request timeout in milliseconds
    #[serde(rename = "timeout-ms")]
    pub timeout_ms: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: "ollama".to_string(),
            model: "gpt-oss-20b".to_string(),
            base_url: "http://localhost:11434".to_string(),
            timeout_ms: 120_000,
        }
    }
}

/// Planning service configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address the `/plan` service listens on
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1:8080".to_string(),
        }
    }
}

/// Planner location for the voice pipeline
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlannerConfig {
    /// Remote `/plan` endpoint; plan in-process when unset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    /// Remote planner request timeout in milliseconds
    #[serde(rename = "timeout-ms")]
    pub timeout_ms: u64,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            url: None,
            timeout_ms: 30_000,
        }
    }
}

/// Which transport carries commands to the device
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum TransportKind {
    /// Newline-delimited JSON over a serial line
    Serial,
    /// `POST /cmd` to an HTTP controller
    Http,
    /// Log what the device would do
    #[default]
    Sim,
}

/// Device controller configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DeviceConfig {
    pub transport: TransportKind,

    /// Serial device path
    #[serde(rename = "serial-port")]
    pub serial_port: String,

    /// Serial baud rate
    pub baud: u32,

    /// Wait after opening the port; the board resets on open
    #[serde(rename = "settle-ms")]
    pub settle_ms: u64,

    /// Serial write timeout in milliseconds
    #[serde(rename = "write-timeout-ms")]
    pub write_timeout_ms: u64,

    /// HTTP controller base URL
    pub url: String,

    /// HTTP controller timeout in milliseconds
    #[serde(rename = "timeout-ms")]
    pub timeout_ms: u64,
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            transport: TransportKind::Sim,
            serial_port: "/dev/ttyACM0".to_string(),
            baud: 115_200,
            settle_ms: 2_000,
            write_timeout_ms: 1_000,
            url: "http://192.168.1.50".to_string(),
            timeout_ms: 10_000,
        }
    }
}

/// Transcript source settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SpeechConfig {
    /// A transcript line equal to this marks an aborted capture
    #[serde(rename = "abort-marker")]
    pub abort_marker: String,
}

impl Default for SpeechConfig {
    fn default() -> Self {
        Self {
            abort_marker: "!abort".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = Config::default();

        assert_eq!(config.llm.provider, "ollama");
        assert_eq!(config.llm.model, "gpt-oss-20b");
        assert_eq!(config.llm.base_url, "http://localhost:11434");
        assert_eq!(config.llm.timeout_ms, 120_000);
        assert_eq!(config.server.bind, "127.0.0.1:8080");
        assert!(config.planner.url.is_none());
        assert_eq!(config.device.transport, TransportKind::Sim);
        assert_eq!(config.device.baud, 115_200);
        assert_eq!(config.speech.abort_marker, "!abort");
    }

    #[test]
    fn test_deserialize_config() {
        let yaml = r#"
log-level: debug

llm:
  provider: ollama
  model: llama3.1
  base-url: http://gpu-box:11434
  timeout-ms: 60000

server:
  bind: 0.0.0.0:9000

planner:
  url: http://127.0.0.1:9000/plan
  timeout-ms: 5000

device:
  transport: serial
  serial-port: /dev/ttyUSB0
  baud: 9600
  settle-ms: 500
"#;

        let config: Config = serde_yaml::from_str(yaml).unwrap();

        assert_eq!(config.log_level.as_deref(), Some("debug"));
        assert_eq!(config.llm.model, "llama3.1");
        assert_eq!(config.llm.base_url, "http://gpu-box:11434");
        assert_eq!(config.llm.timeout_ms, 60_000);
        assert_eq!(config.server.bind, "0.0.0.0:9000");
        assert_eq!(config.planner.url.as_deref(), Some("http://127.0.0.1:9000/plan"));
        assert_eq!(config.planner.timeout_ms, 5_000);
        assert_eq!(config.device.transport, TransportKind::Serial);
        assert_eq!(config.device.serial_port, "/dev/ttyUSB0");
        assert_eq!(config.device.baud, 9600);
        assert_eq!(config.device.settle_ms, 500);
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let yaml = r#"
device:
  transport: http
"#;

        let config: Config = serde_yaml::from_str(yaml).unwrap();

        assert_eq!(config.device.transport, TransportKind::Http);
        assert_eq!(config.device.url, "http://192.168.1.50");
        assert_eq!(config.device.timeout_ms, 10_000);
        assert_eq!(config.llm.provider, "ollama");
        assert!(config.log_level.is_none());
    }

    #[test]
    fn test_load_explicit_path() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("vd.yml");
        fs::write(&path, "server:\n  bind: 127.0.0.1:7777\nlog-level: warn\n").unwrap();

        let config = Config::load(Some(&path)).unwrap();
        assert_eq!(config.server.bind, "127.0.0.1:7777");
        assert_eq!(Config::load_log_level(Some(&path)).as_deref(), Some("warn"));
    }

    #[test]
    fn test_load_explicit_path_missing_is_error() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("missing.yml");
        assert!(Config::load(Some(&path)).is_err());
        assert!(Config::load_log_level(Some(&path)).is_none());
    }

    #[test]
    fn test_load_invalid_yaml_is_error() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("bad.yml");
        fs::write(&path, "device:\n  transport: carrier-pigeon\n").unwrap();
        assert!(Config::load(Some(&path)).is_err());
    }
}
