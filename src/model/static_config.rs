//! Structured form of the router's static FRR configuration

use serde::{Deserialize, Serialize};

/// Parsed static router configuration
#[derive(Clone, PartialEq, Serialize, Deserialize, prost::Message)]
#[serde(default)]
pub struct NetworkConfig {
    /// `ospf router-id` from the `router ospf` block
    #[prost(string, tag = "1")]
    pub router_id: String,

    /// OSPF areas in first-seen order
    #[prost(message, repeated, tag = "2")]
    pub areas: Vec<OspfArea>,

    /// Interface blocks in file order
    #[prost(message, repeated, tag = "3")]
    pub interfaces: Vec<InterfaceConfig>,

    #[prost(string, tag = "4")]
    pub hostname: String,

    #[prost(string, tag = "5")]
    pub frr_version: String,

    /// Top-level `ip route` statements in file order
    #[prost(message, repeated, tag = "6")]
    pub static_routes: Vec<StaticRoute>,

    /// `redistribute` statements of the `router ospf` block
    #[prost(message, repeated, tag = "7")]
    pub redistributions: Vec<Redistribution>,

    /// `area <ID> ...` statements of the `router ospf` block
    #[prost(message, repeated, tag = "8")]
    pub area_settings: Vec<AreaSetting>,

    /// `no ipv4 forwarding`
    #[prost(bool, tag = "9")]
    pub ipv4_forwarding_disabled: bool,

    /// `no ipv6 forwarding`
    #[prost(bool, tag = "10")]
    pub ipv6_forwarding_disabled: bool,

    /// `service advanced-vty`
    #[prost(bool, tag = "11")]
    pub service_advanced_vty: bool,
}

impl NetworkConfig {
    /// Look up an area by ID
    pub fn area(&self, id: &str) -> Option<&OspfArea> {
        self.areas.iter().find(|area| area.id == id)
    }

    /// Look up an interface block by name
    pub fn interface(&self, name: &str) -> Option<&InterfaceConfig> {
        self.interfaces.iter().find(|iface| iface.name == name)
    }

    /// Append a network to an area, creating the area on first use.
    ///
    /// Networks are appended as-is; a network declared twice for the same
    /// area appears twice.
    pub fn add_network(&mut self, network: impl Into<String>, area_id: &str) {
        let network = network.into();
        if let Some(area) = self.areas.iter_mut().find(|area| area.id == area_id) {
            area.networks.push(network);
            return;
        }
        self.areas.push(OspfArea {
            id: area_id.to_string(),
            networks: vec![network],
        });
    }
}

/// An OSPF area and the networks declared into it
#[derive(Clone, PartialEq, Serialize, Deserialize, prost::Message)]
#[serde(default)]
pub struct OspfArea {
    #[prost(string, tag = "1")]
    pub id: String,

    /// Networks in CIDR notation
    #[prost(string, repeated, tag = "2")]
    pub networks: Vec<String>,
}

/// A static route, `ip route <CIDR> <NEXTHOP>`
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize, prost::Message)]
#[serde(default)]
pub struct StaticRoute {
    /// Destination in CIDR notation
    #[prost(string, tag = "1")]
    pub prefix: String,

    /// Next-hop address or interface
    #[prost(string, tag = "2")]
    pub next_hop: String,
}

/// Routes injected into OSPF from another source
///
/// `redistribute <SOURCE> [metric-type <N>] [route-map <NAME>]`
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize, prost::Message)]
#[serde(default)]
pub struct Redistribution {
    /// Route source such as `static` or `connected`
    #[prost(string, tag = "1")]
    pub source: String,

    /// External metric type, empty if unset
    #[prost(string, tag = "2")]
    pub metric_type: String,

    #[prost(string, tag = "3")]
    pub route_map: String,
}

/// An `area <ID> <SETTING...>` statement, e.g. `area 0.0.0.1 nssa`
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize, prost::Message)]
#[serde(default)]
pub struct AreaSetting {
    #[prost(string, tag = "1")]
    pub id: String,

    /// Remainder of the statement after the area ID
    #[prost(string, tag = "2")]
    pub setting: String,
}

/// Static OSPF settings of one interface block
#[derive(Clone, PartialEq, Serialize, Deserialize, prost::Message)]
#[serde(default)]
pub struct InterfaceConfig {
    #[prost(string, tag = "1")]
    pub name: String,

    /// `ip ospf area`, empty if unset
    #[prost(string, tag = "2")]
    pub area: String,

    /// `ip ospf passive`
    #[prost(bool, tag = "3")]
    pub passive: bool,

    /// `ip ospf cost`, zero if unset
    #[prost(uint32, tag = "4")]
    pub cost: u32,

    /// `ip address` lines in CIDR notation
    #[prost(string, repeated, tag = "5")]
    pub ip_addresses: Vec<String>,
}

impl InterfaceConfig {
    /// New interface block with default OSPF settings
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }
}

/// Router identity metadata served for `frr/routerData`
#[derive(Clone, PartialEq, Serialize, Deserialize, prost::Message)]
pub struct FrrRouterData {
    #[prost(string, tag = "1")]
    pub router_name: String,

    #[prost(string, tag = "2")]
    pub ospf_router_id: String,

    #[prost(string, tag = "3")]
    pub frr_version: String,
}
