//! Configuration module for ospf-monitor
//!
//! This module provides configuration types and loading utilities.
//!
//! # Example
//!
//! ```no_run
//! use ospf_monitor::config::load_config;
//!
//! let config = load_config("/etc/ospf-monitor/config.json").unwrap();
//! println!("Polling {} every {}s", config.aggregator.metrics_url, config.aggregator.poll_interval_secs);
//! ```

mod loader;
mod types;

pub use loader::{
    create_default_config, default_config_with_env, load_config, load_config_str,
    load_config_with_env,
};
pub use types::{AggregatorConfig, AnalyzerConfig, Config, IpcConfig, LogConfig};
