//! Unified error types for Ghost-Engine

use thiserror::Error;

/// Unified Result type
pub type Result<T> = std::result::Result<T, Error>;

/// Unified error type for Ghost-Engine
#[derive(Error, Debug)]
pub enum Error {
    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration file could not be parsed
    #[error("Config parse error: {0}")]
    ConfigParse(#[from] toml::de::Error),

    /// Invalid generator configuration
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Malformed caller input (buffer size mismatch, zero dimensions)
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Failure reported by the caller-supplied driver, carried unmodified
    #[error("Driver failure: {0}")]
    Driver(#[source] anyhow::Error),

    /// Replay aborted through its cancel token
    #[error("Replay cancelled")]
    Cancelled,

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Create a new configuration error
    pub fn configuration<S: Into<String>>(msg: S) -> Self {
        Error::Configuration(msg.into())
    }

    /// Create a new invalid input error
    pub fn invalid_input<S: Into<String>>(msg: S) -> Self {
        Error::InvalidInput(msg.into())
    }

    /// Wrap a driver error without altering it
    pub fn driver(err: anyhow::Error) -> Self {
        Error::Driver(err)
    }

    /// Create a new internal error
    pub fn internal<S: Into<String>>(msg: S) -> Self {
        Error::Internal(msg.into())
    }

    /// Whether this error came from the driver during replay
    pub fn is_driver_failure(&self) -> bool {
        matches!(self, Error::Driver(_))
    }
}
