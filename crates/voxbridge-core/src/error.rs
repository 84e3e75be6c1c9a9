use thiserror::Error;

use crate::types::EmergencyStatus;

/// Top-level error type for the Voxbridge core.
///
/// `Validation` and `InvalidState` are raised synchronously and always leave
/// the caller's state untouched. `CapabilityUnavailable` is reported once per
/// attempted speech call. `Timer` ends the current emergency session only.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum VoxbridgeError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid state: cannot {operation} while {status}")]
    InvalidState {
        operation: &'static str,
        status: EmergencyStatus,
    },

    #[error("Capability unavailable: {0}")]
    CapabilityUnavailable(String),

    #[error("Timer error: {0}")]
    Timer(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl VoxbridgeError {
    pub fn invalid_state(operation: &'static str, status: EmergencyStatus) -> Self {
        VoxbridgeError::InvalidState { operation, status }
    }
}

impl From<toml::de::Error> for VoxbridgeError {
    fn from(err: toml::de::Error) -> Self {
        VoxbridgeError::Config(err.to_string())
    }
}

impl From<toml::ser::Error> for VoxbridgeError {
    fn from(err: toml::ser::Error) -> Self {
        VoxbridgeError::Config(err.to_string())
    }
}

impl From<serde_json::Error> for VoxbridgeError {
    fn from(err: serde_json::Error) -> Self {
        VoxbridgeError::Serialization(err.to_string())
    }
}

/// A specialized `Result` type for Voxbridge operations.
pub type Result<T> = std::result::Result<T, VoxbridgeError>;
