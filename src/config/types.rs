//! Configuration types for ospf-monitor
//!
//! This module defines the daemon's configuration structures. Configuration
//! is loaded from JSON files and validated at startup.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Root configuration structure
///
/// Every section defaults when omitted, so `{}` is a valid configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    /// IPC server configuration
    #[serde(default)]
    pub ipc: IpcConfig,

    /// Snapshot collection configuration
    #[serde(default)]
    pub aggregator: AggregatorConfig,

    /// Analysis loop configuration
    #[serde(default)]
    pub analyzer: AnalyzerConfig,

    /// Logging configuration
    #[serde(default)]
    pub log: LogConfig,
}

impl Config {
    /// Validate the configuration
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::ValidationError` if validation fails.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.ipc.validate()?;
        self.aggregator.validate()?;
        self.analyzer.validate()?;
        self.log.validate()?;
        Ok(())
    }

    /// Create the default configuration
    #[must_use]
    pub fn default_config() -> Self {
        Self::default()
    }
}

/// IPC configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct IpcConfig {
    /// Path to Unix socket
    #[serde(default = "default_socket_path")]
    pub socket_path: PathBuf,

    /// Socket file mode (octal, e.g., 0o660)
    #[serde(default = "default_socket_mode")]
    pub socket_mode: u32,

    /// Maximum message size in bytes
    #[serde(default = "default_max_message_size")]
    pub max_message_size: usize,

    /// Delay between answering `system/exit` and closing the listener
    #[serde(default = "default_shutdown_grace_ms")]
    pub shutdown_grace_ms: u64,
}

impl IpcConfig {
    /// Validate IPC configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.socket_path.as_os_str().is_empty() {
            return Err(ConfigError::ValidationError(
                "IPC socket path cannot be empty".into(),
            ));
        }

        if self.max_message_size == 0 {
            return Err(ConfigError::ValidationError(
                "max_message_size must be greater than 0".into(),
            ));
        }

        if self.max_message_size > u32::MAX as usize {
            return Err(ConfigError::ValidationError(format!(
                "max_message_size cannot exceed {} (4-byte length prefix)",
                u32::MAX
            )));
        }

        Ok(())
    }

    /// Shutdown grace period as a `Duration`
    #[must_use]
    pub const fn shutdown_grace(&self) -> Duration {
        Duration::from_millis(self.shutdown_grace_ms)
    }
}

impl Default for IpcConfig {
    fn default() -> Self {
        Self {
            socket_path: default_socket_path(),
            socket_mode: default_socket_mode(),
            max_message_size: default_max_message_size(),
            shutdown_grace_ms: default_shutdown_grace_ms(),
        }
    }
}

/// Snapshot collection configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AggregatorConfig {
    /// URL of the FRR metrics exporter's JSON endpoint
    #[serde(default = "default_metrics_url")]
    pub metrics_url: String,

    /// Path to the static FRR configuration file
    #[serde(default = "default_frr_config_path")]
    pub frr_config_path: PathBuf,

    /// Seconds between collection cycles
    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,

    /// HTTP timeout for one exporter request
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

impl AggregatorConfig {
    /// Validate collection configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.metrics_url.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "metrics_url cannot be empty".into(),
            ));
        }

        if !self.metrics_url.starts_with("http://") && !self.metrics_url.starts_with("https://") {
            return Err(ConfigError::ValidationError(format!(
                "metrics_url must be an http(s) URL: {}",
                self.metrics_url
            )));
        }

        if self.frr_config_path.as_os_str().is_empty() {
            return Err(ConfigError::ValidationError(
                "frr_config_path cannot be empty".into(),
            ));
        }

        if self.poll_interval_secs == 0 {
            return Err(ConfigError::ValidationError(
                "poll_interval_secs must be greater than 0".into(),
            ));
        }

        if self.request_timeout_secs == 0 {
            return Err(ConfigError::ValidationError(
                "request_timeout_secs must be greater than 0".into(),
            ));
        }

        Ok(())
    }

    #[must_use]
    pub const fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }

    #[must_use]
    pub const fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

impl Default for AggregatorConfig {
    fn default() -> Self {
        Self {
            metrics_url: default_metrics_url(),
            frr_config_path: default_frr_config_path(),
            poll_interval_secs: default_poll_interval_secs(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

/// Analysis loop configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AnalyzerConfig {
    /// Seconds between analysis passes
    #[serde(default = "default_analysis_interval_secs")]
    pub interval_secs: u64,
}

impl AnalyzerConfig {
    /// Validate analysis configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.interval_secs == 0 {
            return Err(ConfigError::ValidationError(
                "analyzer interval_secs must be greater than 0".into(),
            ));
        }
        Ok(())
    }

    #[must_use]
    pub const fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            interval_secs: default_analysis_interval_secs(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LogConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Output format: "json" or "text"
    #[serde(default = "default_log_format")]
    pub format: String,

    /// Include target (module path)
    #[serde(default = "default_true")]
    pub target: bool,
}

impl LogConfig {
    /// Validate logging configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !matches!(self.format.as_str(), "json" | "text") {
            return Err(ConfigError::ValidationError(format!(
                "Unknown log format '{}', expected \"json\" or \"text\"",
                self.format
            )));
        }
        Ok(())
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            target: true,
        }
    }
}

// Default value functions for serde
const fn default_true() -> bool {
    true
}

fn default_socket_path() -> PathBuf {
    PathBuf::from("/var/run/ospf-monitor/analyzer.sock")
}

const fn default_socket_mode() -> u32 {
    0o660
}

const fn default_max_message_size() -> usize {
    1024 * 1024
}

const fn default_shutdown_grace_ms() -> u64 {
    100
}

fn default_metrics_url() -> String {
    "http://localhost:9342/metrics".into()
}

fn default_frr_config_path() -> PathBuf {
    PathBuf::from("/etc/frr/frr.conf")
}

const fn default_poll_interval_secs() -> u64 {
    30
}

const fn default_request_timeout_secs() -> u64 {
    5
}

const fn default_analysis_interval_secs() -> u64 {
    30
}

fn default_log_level() -> String {
    "info".into()
}

fn default_log_format() -> String {
    "text".into()
}
