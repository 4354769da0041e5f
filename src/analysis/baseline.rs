//! Structural consistency checks that need no outside knowledge

use std::collections::BTreeMap;

use super::Analyzer;
use crate::model::{
    Advertisement, AnomalyAnalysis, AnomalyDetection, InterfaceConfig, LsaKind, OspfLsa, Snapshot,
};

/// Analyzer comparing the snapshot against itself and the static config.
///
/// - router: OSPF interfaces in `frr.conf` versus interfaces OSPF runs on
/// - external / NSSA external: link-state IDs advertised more than once
/// - LSDB to RIB: prefix-carrying LSAs without a route, and inter-area
///   routes without a summary LSA
/// - RIB to FIB: always clean, no forwarding table is collected
#[derive(Debug, Clone, Copy, Default)]
pub struct BaselineAnalyzer;

impl BaselineAnalyzer {
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl Analyzer for BaselineAnalyzer {
    fn evaluate(&self, snapshot: &Snapshot) -> AnomalyAnalysis {
        AnomalyAnalysis {
            router_anomaly: router_anomaly(snapshot),
            external_anomaly: duplicate_anomaly(snapshot, LsaKind::AsExternal),
            nssa_external_anomaly: duplicate_anomaly(snapshot, LsaKind::NssaExternal),
            lsdb_to_rib_anomaly: lsdb_to_rib_anomaly(snapshot),
            rib_to_fib_anomaly: AnomalyDetection::default(),
        }
    }
}

/// Expected advertisement for a configured interface
fn configured_advertisement(iface: &InterfaceConfig) -> Advertisement {
    let (address, prefix_length) = iface
        .ip_addresses
        .first()
        .map(|cidr| split_cidr(cidr))
        .unwrap_or_default();

    Advertisement {
        link_state_id: address.to_string(),
        prefix_length: prefix_length.to_string(),
        link_type: link_type(iface.passive).to_string(),
        interface_address: if address.is_empty() {
            iface.name.clone()
        } else {
            address.to_string()
        },
    }
}

const fn link_type(passive: bool) -> &'static str {
    if passive {
        "stub network"
    } else {
        "transit network"
    }
}

fn split_cidr(cidr: &str) -> (&str, &str) {
    cidr.split_once('/').unwrap_or((cidr, ""))
}

fn router_anomaly(snapshot: &Snapshot) -> AnomalyDetection {
    let mut detection = AnomalyDetection::default();

    let expected: BTreeMap<&str, &InterfaceConfig> = snapshot
        .static_config
        .interfaces
        .iter()
        .filter(|iface| !iface.area.is_empty())
        .map(|iface| (iface.name.as_str(), iface))
        .collect();

    for observed in &snapshot.ospf.interfaces {
        match expected.get(observed.name.as_str()) {
            None => detection.superfluous_entries.push(Advertisement {
                link_type: link_type(observed.passive).to_string(),
                interface_address: observed.name.clone(),
                ..Default::default()
            }),
            Some(configured) => {
                if configured.area != observed.area || configured.passive != observed.passive {
                    detection.has_misconfigured = true;
                    detection.missing_entries.push(configured_advertisement(configured));
                }
            }
        }
    }

    for (name, configured) in &expected {
        if !snapshot.ospf.interfaces.iter().any(|o| o.name == *name) {
            detection.has_un_advertised = true;
            detection.missing_entries.push(configured_advertisement(configured));
        }
    }

    detection.has_over_advertised = !detection.superfluous_entries.is_empty();
    detection
}

fn lsa_advertisement(lsa: &OspfLsa) -> Advertisement {
    let link_type = match lsa.kind() {
        LsaKind::Router => "router",
        LsaKind::Network => "network",
        LsaKind::Summary => "summary",
        LsaKind::AsbrSummary => "asbr-summary",
        LsaKind::AsExternal => "external",
        LsaKind::NssaExternal => "nssa-external",
        LsaKind::Other => lsa.lsa_type.as_str(),
    };
    Advertisement {
        link_state_id: lsa.ls_id.clone(),
        link_type: link_type.to_string(),
        ..Default::default()
    }
}

fn duplicate_anomaly(snapshot: &Snapshot, kind: LsaKind) -> AnomalyDetection {
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for lsa in snapshot.ospf.lsas.iter().filter(|lsa| lsa.kind() == kind) {
        *counts.entry(lsa.ls_id.as_str()).or_default() += 1;
    }

    let mut detection = AnomalyDetection::default();
    for lsa in snapshot.ospf.lsas.iter().filter(|lsa| lsa.kind() == kind) {
        if counts.get(lsa.ls_id.as_str()).copied().unwrap_or(0) > 1 {
            detection.duplicate_entries.push(lsa_advertisement(lsa));
        }
    }
    detection.has_duplicate = !detection.duplicate_entries.is_empty();
    detection
}

fn lsdb_to_rib_anomaly(snapshot: &Snapshot) -> AnomalyDetection {
    let mut detection = AnomalyDetection::default();
    let ospf = &snapshot.ospf;

    for lsa in &ospf.lsas {
        let carries_prefix = matches!(
            lsa.kind(),
            LsaKind::Summary | LsaKind::AsExternal | LsaKind::NssaExternal
        );
        // Self-originated prefixes are not installed as OSPF routes
        if !carries_prefix || lsa.adv_router == snapshot.static_config.router_id {
            continue;
        }
        if !ospf.routes.iter().any(|route| route.network_address() == lsa.ls_id) {
            detection.missing_entries.push(lsa_advertisement(lsa));
        }
    }

    for route in &ospf.routes {
        if !route.route_type.to_ascii_lowercase().contains("inter") {
            continue;
        }
        let advertised = ospf
            .lsas
            .iter()
            .any(|lsa| lsa.kind() == LsaKind::Summary && lsa.ls_id == route.network_address());
        if !advertised {
            let (address, prefix_length) = split_cidr(&route.prefix);
            detection.superfluous_entries.push(Advertisement {
                link_state_id: address.to_string(),
                prefix_length: prefix_length.to_string(),
                link_type: "summary".to_string(),
                interface_address: route.next_hop.clone(),
            });
        }
    }

    detection.has_un_advertised = !detection.missing_entries.is_empty();
    detection.has_over_advertised = !detection.superfluous_entries.is_empty();
    detection
}
