//! Error types for ospf-monitor
//!
//! Errors are grouped by subsystem. Each enum reports whether the failure is
//! transient (`is_recoverable`), which decides whether the daemon keeps
//! serving or gives up.

use std::io;

use thiserror::Error;

/// Top-level error type for ospf-monitor
#[derive(Debug, Error)]
pub enum MonitorError {
    /// Daemon configuration errors (file parsing, validation)
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// IPC socket and protocol errors
    #[error("IPC error: {0}")]
    Ipc(#[from] IpcError),

    /// Snapshot collection errors
    #[error("Collection error: {0}")]
    Collection(#[from] CollectionError),

    /// I/O errors not covered by other categories
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl MonitorError {
    /// Check if this error is recoverable (can retry operation)
    #[must_use]
    pub fn is_recoverable(&self) -> bool {
        match self {
            Self::Config(_) => false,
            Self::Ipc(e) => e.is_recoverable(),
            Self::Collection(e) => e.is_recoverable(),
            Self::Io(e) => matches!(
                e.kind(),
                io::ErrorKind::TimedOut
                    | io::ErrorKind::Interrupted
                    | io::ErrorKind::WouldBlock
                    | io::ErrorKind::ConnectionReset
            ),
        }
    }
}

/// Daemon configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    /// File not found or inaccessible
    #[error("Configuration file not found: {path}")]
    FileNotFound { path: String },

    /// JSON parsing error
    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    /// Validation error (invalid values, missing required fields)
    #[error("Configuration validation failed: {0}")]
    ValidationError(String),

    /// Environment variable error
    #[error("Environment variable error: {name}: {reason}")]
    EnvError { name: String, reason: String },

    /// I/O error while reading config
    #[error("I/O error reading configuration: {0}")]
    IoError(#[from] io::Error),
}

impl ConfigError {
    /// Config errors are not recoverable without user intervention
    #[must_use]
    pub const fn is_recoverable(&self) -> bool {
        false
    }
}

/// IPC communication errors
#[derive(Debug, Error)]
pub enum IpcError {
    /// Failed to bind Unix socket
    #[error("Failed to bind IPC socket to {path}: {reason}")]
    BindError { path: String, reason: String },

    /// Connection error (connect, accept)
    #[error("IPC connection error: {0}")]
    ConnectionError(String),

    /// Malformed frame or payload
    #[error("IPC protocol error: {0}")]
    ProtocolError(String),

    /// Declared frame length exceeds the configured cap
    #[error("IPC frame too large: {size} bytes (max {max})")]
    FrameTooLarge { size: usize, max: usize },

    /// Protobuf encode failure
    #[error("IPC serialization error: {0}")]
    SerializationError(String),

    /// I/O error
    #[error("IPC I/O error: {0}")]
    IoError(#[from] io::Error),
}

impl IpcError {
    /// Check if this error is recoverable
    ///
    /// Per-connection failures are recoverable: the connection is dropped
    /// and the server keeps accepting.
    #[must_use]
    pub fn is_recoverable(&self) -> bool {
        match self {
            Self::BindError { .. } => false,
            Self::ConnectionError(_) => true,
            Self::ProtocolError(_) => true,
            Self::FrameTooLarge { .. } => true,
            Self::SerializationError(_) => false,
            Self::IoError(e) => matches!(
                e.kind(),
                io::ErrorKind::Interrupted
                    | io::ErrorKind::ConnectionReset
                    | io::ErrorKind::BrokenPipe
                    | io::ErrorKind::UnexpectedEof
            ),
        }
    }

    /// Create a bind error
    pub fn bind(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::BindError {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Create a protocol error
    pub fn protocol(msg: impl Into<String>) -> Self {
        Self::ProtocolError(msg.into())
    }
}

impl From<prost::DecodeError> for IpcError {
    fn from(e: prost::DecodeError) -> Self {
        Self::ProtocolError(format!("invalid protobuf payload: {e}"))
    }
}

impl From<prost::EncodeError> for IpcError {
    fn from(e: prost::EncodeError) -> Self {
        Self::SerializationError(e.to_string())
    }
}

/// Errors raised by a metrics source
#[derive(Debug, Error)]
pub enum SourceError {
    /// HTTP request could not be completed
    #[error("Request to {url} failed: {reason}")]
    Request { url: String, reason: String },

    /// Request did not complete in time
    #[error("Request to {url} timed out after {timeout_secs}s")]
    Timeout { url: String, timeout_secs: u64 },

    /// Exporter answered with a non-success status
    #[error("Exporter at {url} returned HTTP {status}")]
    Status { url: String, status: u16 },

    /// Response body was not a valid metrics document
    #[error("Failed to decode metrics: {0}")]
    Decode(String),

    /// Host metrics could not be sampled
    #[error("System metrics unavailable: {0}")]
    System(String),
}

impl SourceError {
    /// Check if this error is recoverable
    #[must_use]
    pub const fn is_recoverable(&self) -> bool {
        match self {
            Self::Request { .. } | Self::Timeout { .. } | Self::Status { .. } => true,
            Self::Decode(_) => true,
            Self::System(_) => false,
        }
    }

    /// Create a request error
    pub fn request(url: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Request {
            url: url.into(),
            reason: reason.into(),
        }
    }
}

/// Errors that abandon a collection cycle
#[derive(Debug, Error)]
pub enum CollectionError {
    /// Fetching OSPF state failed
    #[error("OSPF metrics: {0}")]
    Ospf(#[source] SourceError),

    /// Sampling system metrics failed
    #[error("System metrics: {0}")]
    System(#[source] SourceError),

    /// Static router configuration is missing
    #[error("Router configuration not found: {path}")]
    ConfigNotFound { path: String },

    /// Static router configuration could not be read
    #[error("Failed to read router configuration {path}: {source}")]
    ConfigRead {
        path: String,
        #[source]
        source: io::Error,
    },
}

impl CollectionError {
    /// Check if this error is recoverable
    ///
    /// Every cycle is retried on the next tick regardless; this only
    /// selects the log level.
    #[must_use]
    pub fn is_recoverable(&self) -> bool {
        match self {
            Self::Ospf(e) | Self::System(e) => e.is_recoverable(),
            Self::ConfigNotFound { .. } => true,
            Self::ConfigRead { source, .. } => source.kind() != io::ErrorKind::PermissionDenied,
        }
    }

    /// Create a config read error, mapping `NotFound` to its own variant
    pub fn config_read(path: impl Into<String>, source: io::Error) -> Self {
        let path = path.into();
        if source.kind() == io::ErrorKind::NotFound {
            Self::ConfigNotFound { path }
        } else {
            Self::ConfigRead { path, source }
        }
    }
}

/// Type alias for Result with MonitorError
pub type Result<T> = std::result::Result<T, MonitorError>;
