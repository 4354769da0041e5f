//! Host resource usage

use serde::{Deserialize, Serialize};

/// System resource usage sampled in one collection cycle
#[derive(Clone, PartialEq, Serialize, Deserialize, prost::Message)]
#[serde(default)]
pub struct SystemMetrics {
    /// Global CPU usage in percent (0-100)
    #[prost(double, tag = "1")]
    pub cpu_usage: f64,

    /// Used memory in percent of total (0-100)
    #[prost(double, tag = "2")]
    pub memory_usage: f64,

    /// Per-interface traffic counters
    #[prost(message, repeated, tag = "3")]
    pub network_stats: Vec<InterfaceStats>,
}

/// Cumulative traffic counters for one network interface
#[derive(Clone, PartialEq, Serialize, Deserialize, prost::Message)]
#[serde(default)]
pub struct InterfaceStats {
    #[prost(string, tag = "1")]
    pub name: String,

    #[prost(uint64, tag = "2")]
    pub rx_bytes: u64,

    #[prost(uint64, tag = "3")]
    pub tx_bytes: u64,

    #[prost(uint64, tag = "4")]
    pub rx_errors: u64,

    #[prost(uint64, tag = "5")]
    pub tx_errors: u64,
}
