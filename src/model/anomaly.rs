//! Consistency findings produced by an analyzer

use serde::{Deserialize, Serialize};

/// A single advertised (or expected) entry named in a finding
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize, prost::Message)]
#[serde(default)]
pub struct Advertisement {
    #[prost(string, tag = "1")]
    pub link_state_id: String,

    /// Prefix length, or a mask in dotted form, as the source reports it
    #[prost(string, tag = "2")]
    pub prefix_length: String,

    #[prost(string, tag = "3")]
    pub link_type: String,

    #[prost(string, tag = "4")]
    pub interface_address: String,
}

/// Findings for one consistency check
#[derive(Clone, PartialEq, Serialize, Deserialize, prost::Message)]
#[serde(default)]
pub struct AnomalyDetection {
    #[prost(bool, tag = "1")]
    pub has_over_advertised: bool,

    #[prost(bool, tag = "2")]
    pub has_un_advertised: bool,

    #[prost(bool, tag = "3")]
    pub has_duplicate: bool,

    #[prost(bool, tag = "4")]
    pub has_misconfigured: bool,

    /// Entries observed but not expected
    #[prost(message, repeated, tag = "5")]
    pub superfluous_entries: Vec<Advertisement>,

    /// Entries expected but not observed
    #[prost(message, repeated, tag = "6")]
    pub missing_entries: Vec<Advertisement>,

    /// Entries advertised more than once
    #[prost(message, repeated, tag = "7")]
    pub duplicate_entries: Vec<Advertisement>,
}

impl AnomalyDetection {
    /// Whether any of the flags is raised
    pub const fn has_anomaly(&self) -> bool {
        self.has_over_advertised || self.has_un_advertised || self.has_duplicate || self.has_misconfigured
    }
}

/// Findings for every check, evaluated against one snapshot
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnomalyAnalysis {
    /// Configured interfaces versus the router LSAs / OSPF interfaces
    pub router_anomaly: AnomalyDetection,

    /// AS-external (type 5) advertisements
    pub external_anomaly: AnomalyDetection,

    /// NSSA-external (type 7) advertisements
    pub nssa_external_anomaly: AnomalyDetection,

    /// LSDB contents versus routes installed in the RIB
    pub lsdb_to_rib_anomaly: AnomalyDetection,

    /// RIB versus forwarding table
    pub rib_to_fib_anomaly: AnomalyDetection,
}
