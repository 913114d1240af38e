//! Error types for the bridge.

use thiserror::Error;

/// Errors that stop the bridge.
#[derive(Debug, Error)]
pub enum BridgeError {
    /// I/O error outside the byte source (config file, socket setup).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Config file could not be parsed.
    #[error("invalid config file: {0}")]
    ConfigParse(#[from] serde_yaml::Error),

    /// Config values are inconsistent.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// No serial port was given.
    #[error("serial port is required, use --list-ports to see available ports")]
    MissingPort,

    /// Serial port could not be opened or enumerated.
    #[error("serial port error: {0}")]
    Serial(#[from] serialport::Error),

    /// Destination host did not resolve to any address.
    #[error("could not resolve UDP destination {host}:{port}")]
    Unresolved {
        /// Destination host.
        host: String,
        /// Destination port.
        port: u16,
    },

    /// Ctrl-C handler could not be installed.
    #[error("failed to install signal handler: {0}")]
    Signal(#[from] ctrlc::Error),

    /// Reading from the byte source failed.
    #[error("byte source failed: {0}")]
    Source(std::io::Error),

    /// Protocol setup error.
    #[error(transparent)]
    Protocol(#[from] xye_protocol::ProtocolError),
}

/// Result type alias for bridge operations.
pub type BridgeResult<T> = Result<T, BridgeError>;
