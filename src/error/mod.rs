//! Error Types
//!
//! Error hierarchy for login initiation, option storage and management API calls.

use std::time::Duration;
use thiserror::Error;

/// Root error type for the crate.
#[derive(Error, Debug)]
pub enum LoginError {
    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigurationError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Network error: {0}")]
    Network(#[from] NetworkError),

    #[error("Protocol error: {0}")]
    Protocol(#[from] ProtocolError),
}

impl LoginError {
    /// Get error code for telemetry and the error log.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Configuration(_) => "AUTH0_CONFIG",
            Self::Storage(_) => "AUTH0_STORAGE",
            Self::Network(_) => "AUTH0_NETWORK",
            Self::Protocol(_) => "AUTH0_PROTOCOL",
        }
    }
}

/// Configuration error.
#[derive(Error, Debug)]
pub enum ConfigurationError {
    #[error("Missing required field: {field}")]
    MissingRequired { field: String },

    #[error("Invalid tenant domain: {domain}")]
    InvalidDomain { domain: String },

    #[error("Invalid flow mode: {value}")]
    InvalidFlowMode { value: String },
}

/// Option/session storage error.
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Read failed: {message}")]
    ReadFailed { message: String },

    #[error("Write failed: {message}")]
    WriteFailed { message: String },

    #[error("Delete failed: {message}")]
    DeleteFailed { message: String },

    #[error("Corrupted data: {message}")]
    CorruptedData { message: String },

    #[error("Operation not supported by this store: {operation}")]
    Unsupported { operation: String },
}

/// Network/transport error.
#[derive(Error, Debug)]
pub enum NetworkError {
    #[error("Connection failed: {message}")]
    ConnectionFailed { message: String },

    #[error("Request timeout after {timeout:?}")]
    Timeout { timeout: Duration },
}


/// Protocol/response handling error.
#[derive(Error, Debug)]
pub enum ProtocolError {
    #[error("Invalid response: {message}")]
    InvalidResponse { message: String },

    #[error("Response too large: {size} bytes")]
    ResponseTooLarge { size: usize },
}
