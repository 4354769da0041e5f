//! Configuration loading and management
//!
//! This module handles loading configuration from files and environment variables.

use std::path::Path;

use tracing::{debug, info};

use super::types::Config;
use crate::error::ConfigError;

/// Load configuration from a JSON file
///
/// # Arguments
///
/// * `path` - Path to the configuration file
///
/// # Errors
///
/// Returns `ConfigError` if the file cannot be read or parsed.
pub fn load_config(path: impl AsRef<Path>) -> Result<Config, ConfigError> {
    let path = path.as_ref();

    debug!("Loading configuration from {:?}", path);

    if !path.exists() {
        return Err(ConfigError::FileNotFound {
            path: path.display().to_string(),
        });
    }

    let contents = std::fs::read_to_string(path)?;

    let config: Config = serde_json::from_str(&contents).map_err(|e| {
        ConfigError::ParseError(format!("Failed to parse JSON: {e} at {path:?}"))
    })?;

    config.validate()?;

    info!(
        "Configuration loaded: metrics_url={}, frr_config={:?}, socket={:?}",
        config.aggregator.metrics_url, config.aggregator.frr_config_path, config.ipc.socket_path
    );

    Ok(config)
}

/// Load configuration from a JSON string
///
/// # Errors
///
/// Returns `ConfigError` if parsing or validation fails.
pub fn load_config_str(json: &str) -> Result<Config, ConfigError> {
    let config: Config =
        serde_json::from_str(json).map_err(|e| ConfigError::ParseError(e.to_string()))?;

    config.validate()?;

    Ok(config)
}

/// Load configuration with environment variable overrides
///
/// Environment variables:
/// - `OSPF_MONITOR_METRICS_URL`: Override exporter URL
/// - `OSPF_MONITOR_FRR_CONFIG`: Override static FRR config path
/// - `OSPF_MONITOR_IPC_SOCKET`: Override IPC socket path
/// - `OSPF_MONITOR_LOG_LEVEL`: Override log level
/// - `OSPF_MONITOR_POLL_INTERVAL`: Override collection interval (seconds)
///
/// # Errors
///
/// Returns `ConfigError` if loading or parsing fails.
pub fn load_config_with_env(path: impl AsRef<Path>) -> Result<Config, ConfigError> {
    let mut config = load_config(path)?;
    apply_env_overrides(&mut config, |name| std::env::var(name).ok())?;
    Ok(config)
}

/// Default configuration with environment variable overrides
///
/// Used when no configuration file exists.
///
/// # Errors
///
/// Returns `ConfigError` if an override is invalid.
pub fn default_config_with_env() -> Result<Config, ConfigError> {
    let mut config = Config::default_config();
    apply_env_overrides(&mut config, |name| std::env::var(name).ok())?;
    Ok(config)
}

/// Apply overrides from `lookup` and re-validate
///
/// `lookup` is `std::env::var` in production; tests pass a closure over a
/// map so they do not touch the process environment.
pub(crate) fn apply_env_overrides<F>(config: &mut Config, lookup: F) -> Result<(), ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(url) = lookup("OSPF_MONITOR_METRICS_URL") {
        config.aggregator.metrics_url = url;
        debug!("Metrics URL overridden to {}", config.aggregator.metrics_url);
    }

    if let Some(path) = lookup("OSPF_MONITOR_FRR_CONFIG") {
        config.aggregator.frr_config_path = path.into();
        debug!(
            "FRR config path overridden to {:?}",
            config.aggregator.frr_config_path
        );
    }

    if let Some(socket) = lookup("OSPF_MONITOR_IPC_SOCKET") {
        config.ipc.socket_path = socket.into();
        debug!("IPC socket path overridden to {:?}", config.ipc.socket_path);
    }

    if let Some(level) = lookup("OSPF_MONITOR_LOG_LEVEL") {
        config.log.level = level;
        debug!("Log level overridden to {}", config.log.level);
    }

    if let Some(secs) = lookup("OSPF_MONITOR_POLL_INTERVAL") {
        config.aggregator.poll_interval_secs =
            secs.parse().map_err(|_| ConfigError::EnvError {
                name: "OSPF_MONITOR_POLL_INTERVAL".into(),
                reason: format!("Invalid number: {secs}"),
            })?;
        debug!(
            "Poll interval overridden to {}s",
            config.aggregator.poll_interval_secs
        );
    }

    // Re-validate after overrides
    config.validate()
}

/// Create a default configuration file at the given path
///
/// # Errors
///
/// Returns `ConfigError` if the file cannot be written.
pub fn create_default_config(path: impl AsRef<Path>) -> Result<(), ConfigError> {
    let config = Config::default_config();
    let json = serde_json::to_string_pretty(&config)
        .map_err(|e| ConfigError::ParseError(format!("Failed to serialize config: {e}")))?;

    std::fs::write(path, json)?;
    Ok(())
}
