//! ospf-monitor: host-local OSPF state monitor
//!
//! This crate periodically gathers a router's live OSPF state, its static FRR
//! configuration and host resource usage into one consistent snapshot,
//! checks that snapshot for anomalies, and answers queries about both over a
//! local Unix socket.
//!
//! # Features
//!
//! - **Consistent snapshots**: all inputs of a cycle are published together or not at all
//! - **Stale but valid**: a failed cycle keeps the previous snapshot visible
//! - **Static config parsing**: `frr.conf` interfaces, areas and router ID
//! - **Anomaly analysis**: pluggable [`Analyzer`] over each snapshot
//! - **IPC Queries**: length-prefixed protobuf over a Unix socket
//!
//! # Architecture
//!
//! ```text
//! FRR exporter (HTTP) ─┐
//! sysinfo ─────────────┼→ Aggregator → Snapshot ─→ Analyzer → AnomalyAnalysis
//! frr.conf ────────────┘                  │                        │
//!                                         └──── SharedState ───────┘
//!                                                    ↓
//!                                   IpcServer ← (service, command) ← client
//! ```
//!
//! # Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//! use ospf_monitor::aggregator::{Aggregator, ExporterSource};
//! use ospf_monitor::config::load_config;
//! use ospf_monitor::state::SharedState;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = load_config("/etc/ospf-monitor/config.json")?;
//! let state = Arc::new(SharedState::new());
//!
//! let source = ExporterSource::new(
//!     config.aggregator.metrics_url.clone(),
//!     config.aggregator.request_timeout(),
//! )?;
//! let aggregator = Aggregator::new(Arc::new(source), &config.aggregator.frr_config_path, state.clone());
//! aggregator.run_cycle().await?;
//!
//! println!("{:?}", state.snapshot().map(|s| s.timestamp));
//! # Ok(())
//! # }
//! ```
//!
//! # Modules
//!
//! - [`aggregator`]: Metrics sources and the collection loop
//! - [`analysis`]: Analyzer trait and the analysis loop
//! - [`config`]: Configuration types and loading
//! - [`error`]: Error types
//! - [`ipc`]: IPC server, client and protocol
//! - [`model`]: Snapshot and wire data types
//! - [`state`]: Published snapshot and analysis
//! - [`static_config`]: FRR configuration parser

#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

pub mod aggregator;
pub mod analysis;
pub mod config;
pub mod error;
pub mod ipc;
pub mod model;
pub mod state;
pub mod static_config;

// Re-export commonly used types at the crate root
pub use aggregator::{Aggregator, ExporterSource, MetricsSource};
pub use analysis::{Analyzer, BaselineAnalyzer};
pub use config::Config;
pub use error::{CollectionError, ConfigError, IpcError, MonitorError, SourceError};
pub use ipc::{IpcClient, IpcHandler, IpcServer, Message, Response};
pub use model::{AnomalyAnalysis, NetworkConfig, Snapshot};
pub use state::SharedState;
pub use static_config::{parse_config, parse_config_str};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
