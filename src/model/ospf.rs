//! Live OSPF protocol state
//!
//! These types are decoded from the metrics exporter's JSON document and are
//! also the protobuf payloads returned to IPC clients, so every struct
//! carries both `serde` and `prost` derives. The JSON field names follow the
//! exporter (`neighborId`, `nextHop`, `lsId`, ...).

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// An OSPF neighbor adjacency
#[derive(Clone, PartialEq, Serialize, Deserialize, prost::Message)]
#[serde(default)]
pub struct OspfNeighbor {
    /// Neighbor router ID
    #[prost(string, tag = "1")]
    #[serde(rename = "neighborId")]
    pub id: String,

    /// Neighbor interface address
    #[prost(string, tag = "2")]
    #[serde(rename = "ipAddress")]
    pub ip: String,

    /// Adjacency state (e.g. "Full/DR")
    #[prost(string, tag = "3")]
    pub state: String,

    /// Local interface the neighbor was learned on
    #[prost(string, tag = "4")]
    pub interface: String,

    #[prost(string, tag = "5")]
    pub area: String,
}

/// A route computed by OSPF
#[derive(Clone, PartialEq, Serialize, Deserialize, prost::Message)]
#[serde(default)]
pub struct OspfRoute {
    /// Destination prefix in CIDR notation
    #[prost(string, tag = "1")]
    pub prefix: String,

    #[prost(string, tag = "2")]
    #[serde(rename = "nextHop")]
    pub next_hop: String,

    #[prost(string, tag = "3")]
    pub interface: String,

    #[prost(uint32, tag = "4")]
    pub cost: u32,

    /// Route type as reported by the exporter (intra-area, inter-area, external)
    #[prost(string, tag = "5")]
    #[serde(rename = "type")]
    pub route_type: String,

    #[prost(string, tag = "6")]
    pub area: String,
}

impl OspfRoute {
    /// Network address part of the prefix (`10.0.0.0/24` -> `10.0.0.0`)
    pub fn network_address(&self) -> &str {
        self.prefix.split('/').next().unwrap_or_default()
    }
}

/// Runtime view of an OSPF-enabled interface
#[derive(Clone, PartialEq, Serialize, Deserialize, prost::Message)]
#[serde(default)]
pub struct OspfInterface {
    #[prost(string, tag = "1")]
    pub name: String,

    #[prost(string, tag = "2")]
    pub area: String,

    /// Number of neighbors seen on this interface
    #[prost(uint32, tag = "3")]
    #[serde(rename = "nbrCount")]
    pub nbr_count: u32,

    /// Number of fully adjacent neighbors on this interface
    #[prost(uint32, tag = "4")]
    #[serde(rename = "nbrAdjacentCount")]
    pub nbr_adjacent: u32,

    #[prost(bool, tag = "5")]
    pub passive: bool,
}

/// A link-state advertisement held in the LSDB
#[derive(Clone, PartialEq, Serialize, Deserialize, prost::Message)]
#[serde(default)]
pub struct OspfLsa {
    /// LSA type as reported by the exporter, see [`LsaKind::classify`]
    #[prost(string, tag = "1")]
    #[serde(rename = "type")]
    pub lsa_type: String,

    /// Link-state ID
    #[prost(string, tag = "2")]
    #[serde(rename = "lsId")]
    pub ls_id: String,

    /// Router ID of the originating router
    #[prost(string, tag = "3")]
    #[serde(rename = "advRouter")]
    pub adv_router: String,

    /// Age in seconds
    #[prost(uint32, tag = "4")]
    pub age: u32,

    /// Area the LSA is flooded in (empty for AS-scoped LSAs)
    #[prost(string, tag = "5")]
    pub area: String,
}

impl OspfLsa {
    /// Classified LSA type
    pub fn kind(&self) -> LsaKind {
        LsaKind::classify(&self.lsa_type)
    }
}

/// The LSA types the query interface distinguishes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LsaKind {
    /// Type 1
    Router,
    /// Type 2
    Network,
    /// Type 3
    Summary,
    /// Type 4
    AsbrSummary,
    /// Type 5
    AsExternal,
    /// Type 7
    NssaExternal,
    /// Anything the exporter reports that is not one of the above
    Other,
}

impl LsaKind {
    /// Classify an exporter LSA type string.
    ///
    /// Accepts the numeric type (`"1"` .. `"7"`) as well as the names FRR
    /// prints (`"router-LSA"`, `"Summary"`, `"AS-external-LSA"`,
    /// `"NSSA-LSA"`, ...). Matching is case-insensitive.
    pub fn classify(raw: &str) -> Self {
        let normalized = raw.trim().to_ascii_lowercase();
        let name = normalized
            .trim_end_matches("-lsa")
            .trim_end_matches(" lsa")
            .trim_end_matches("lsa");

        match name {
            "1" | "router" => Self::Router,
            "2" | "network" | "net" => Self::Network,
            "3" | "summary" | "summary-net" | "network-summary" => Self::Summary,
            "4" | "asbr-summary" | "summary-asbr" | "asbr summary" => Self::AsbrSummary,
            "5" | "as-external" | "external" | "as external" => Self::AsExternal,
            "7" | "nssa" | "nssa-external" | "nssa external" => Self::NssaExternal,
            _ => Self::Other,
        }
    }

    /// Whether this kind is an external route advertisement (type 5 or 7)
    pub const fn is_external(self) -> bool {
        matches!(self, Self::AsExternal | Self::NssaExternal)
    }
}

/// Complete OSPF protocol state fetched in one collection cycle
#[derive(Clone, PartialEq, Serialize, Deserialize, prost::Message)]
#[serde(default)]
pub struct OspfState {
    #[prost(message, repeated, tag = "1")]
    #[serde(alias = "Neighbors")]
    pub neighbors: Vec<OspfNeighbor>,

    #[prost(message, repeated, tag = "2")]
    #[serde(alias = "Routes")]
    pub routes: Vec<OspfRoute>,

    #[prost(message, repeated, tag = "3")]
    #[serde(alias = "Interfaces")]
    pub interfaces: Vec<OspfInterface>,

    #[prost(message, repeated, tag = "4")]
    #[serde(alias = "LSAs")]
    pub lsas: Vec<OspfLsa>,
}

impl OspfState {
    /// All LSAs of the given kind, in LSDB order
    pub fn lsas_of(&self, kind: LsaKind) -> Vec<OspfLsa> {
        self.lsas
            .iter()
            .filter(|lsa| lsa.kind() == kind)
            .cloned()
            .collect()
    }

    /// External (type 5 and 7) LSAs whose link-state ID is advertised more
    /// than once, grouped by ID in first-seen order.
    pub fn duplicate_external_lsas(&self) -> Vec<OspfLsa> {
        let mut by_id: BTreeMap<&str, usize> = BTreeMap::new();
        for lsa in self.lsas.iter().filter(|lsa| lsa.kind().is_external()) {
            *by_id.entry(lsa.ls_id.as_str()).or_default() += 1;
        }

        let mut order: Vec<&str> = Vec::new();
        for lsa in self.lsas.iter().filter(|lsa| lsa.kind().is_external()) {
            if by_id.get(lsa.ls_id.as_str()).copied().unwrap_or(0) > 1
                && !order.contains(&lsa.ls_id.as_str())
            {
                order.push(lsa.ls_id.as_str());
            }
        }

        order
            .into_iter()
            .flat_map(|id| {
                self.lsas
                    .iter()
                    .filter(move |lsa| lsa.kind().is_external() && lsa.ls_id == id)
                    .cloned()
            })
            .collect()
    }
}

/// LSA list payload
#[derive(Clone, PartialEq, prost::Message)]
pub struct LsaList {
    #[prost(message, repeated, tag = "1")]
    pub lsas: Vec<OspfLsa>,
}

/// Neighbor list payload
#[derive(Clone, PartialEq, prost::Message)]
pub struct NeighborList {
    #[prost(message, repeated, tag = "1")]
    pub neighbors: Vec<OspfNeighbor>,
}

/// Interface list payload
#[derive(Clone, PartialEq, prost::Message)]
pub struct InterfaceList {
    #[prost(message, repeated, tag = "1")]
    pub interfaces: Vec<OspfInterface>,
}

/// Routing information base payload
#[derive(Clone, PartialEq, prost::Message)]
pub struct RouteList {
    #[prost(message, repeated, tag = "1")]
    pub routes: Vec<OspfRoute>,
}

/// Mapping of local OSPF interface to the address of the peer reached over it
#[derive(Clone, PartialEq, prost::Message)]
pub struct PeerMap {
    #[prost(btree_map = "string, string", tag = "1")]
    pub peer_interface_to_address: BTreeMap<String, String>,
}
