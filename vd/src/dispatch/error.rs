//! Dispatch error types

use thiserror::Error;

/// Why a command did not reach the device
///
/// Never retried automatically: repeating a physical dispense on an
/// uncertain failure could double the dose.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DispatchError {
    #[error("transport failure: {0}")]
    TransportFailure(String),

    #[error("another command is still being dispatched")]
    Busy,
}

impl From<std::io::Error> for DispatchError {
    fn from(e: std::io::Error) -> Self {
        DispatchError::TransportFailure(e.to_string())
    }
}

impl From<reqwest::Error> for DispatchError {
    fn from(e: reqwest::Error) -> Self {
        DispatchError::TransportFailure(e.to_string())
    }
}

impl From<serialport::Error> for DispatchError {
    fn from(e: serialport::Error) -> Self {
        DispatchError::TransportFailure(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_io_error_is_transport_failure() {
        let err: DispatchError = std::io::Error::new(std::io::ErrorKind::BrokenPipe, "device unplugged").into();
        assert_eq!(err, DispatchError::TransportFailure("device unplugged".to_string()));
        assert_eq!(err.to_string(), "transport failure: device unplugged");
    }
}
