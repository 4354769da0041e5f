//! The unit of publication: one consistent view of the router

use chrono::{DateTime, Utc};

use super::ospf::{LsaKind, OspfLsa, OspfState, PeerMap};
use super::static_config::{FrrRouterData, NetworkConfig};
use super::system::SystemMetrics;

/// Everything gathered in one successful collection cycle.
///
/// A snapshot is never mutated after it is built. The aggregator replaces
/// it wholesale, so every field always comes from the same cycle.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    /// When the cycle that produced this snapshot ran
    pub timestamp: DateTime<Utc>,
    pub ospf: OspfState,
    pub static_config: NetworkConfig,
    pub system: SystemMetrics,
}

impl Snapshot {
    /// Build a snapshot stamped with the current time
    pub fn new(ospf: OspfState, static_config: NetworkConfig, system: SystemMetrics) -> Self {
        Self {
            timestamp: Utc::now(),
            ospf,
            static_config,
            system,
        }
    }

    /// Router identity metadata
    pub fn router_data(&self) -> FrrRouterData {
        FrrRouterData {
            router_name: self.static_config.hostname.clone(),
            ospf_router_id: self.static_config.router_id.clone(),
            frr_version: self.static_config.frr_version.clone(),
        }
    }

    /// Network LSAs originated by this router
    pub fn self_network_lsas(&self) -> Vec<OspfLsa> {
        self.ospf
            .lsas
            .iter()
            .filter(|lsa| lsa.kind() == LsaKind::Network && lsa.adv_router == self.static_config.router_id)
            .cloned()
            .collect()
    }

    /// Local interface to peer address, from the neighbor table.
    ///
    /// Neighbors without an interface are skipped. If several neighbors share
    /// an interface, the last one listed wins.
    pub fn peer_map(&self) -> PeerMap {
        let peer_interface_to_address = self
            .ospf
            .neighbors
            .iter()
            .filter(|nbr| !nbr.interface.is_empty())
            .map(|nbr| (nbr.interface.clone(), nbr.ip.clone()))
            .collect();
        PeerMap {
            peer_interface_to_address,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{OspfNeighbor, OspfLsa};

    fn snapshot() -> Snapshot {
        let ospf = OspfState {
            neighbors: vec![
                OspfNeighbor {
                    id: "2.2.2.2".into(),
                    ip: "10.0.0.2".into(),
                    state: "Full/DR".into(),
                    interface: "eth0".into(),
                    area: "0.0.0.0".into(),
                },
                OspfNeighbor {
                    id: "3.3.3.3".into(),
                    ip: "10.0.1.3".into(),
                    state: "Full/BDR".into(),
                    interface: "eth1".into(),
                    area: "0.0.0.1".into(),
                },
            ],
            lsas: vec![
                OspfLsa {
                    lsa_type: "network".into(),
                    ls_id: "10.0.0.1".into(),
                    adv_router: "1.1.1.1".into(),
                    ..Default::default()
                },
                OspfLsa {
                    lsa_type: "network".into(),
                    ls_id: "10.0.1.3".into(),
                    adv_router: "3.3.3.3".into(),
                    ..Default::default()
                },
            ],
            ..Default::default()
        };
        let config = NetworkConfig {
            router_id: "1.1.1.1".into(),
            hostname: "r1".into(),
            frr_version: "8.4".into(),
            ..Default::default()
        };
        Snapshot::new(ospf, config, SystemMetrics::default())
    }

    #[test]
    fn test_router_data() {
        let data = snapshot().router_data();
        assert_eq!(data.router_name, "r1");
        assert_eq!(data.ospf_router_id, "1.1.1.1");
        assert_eq!(data.frr_version, "8.4");
    }

    #[test]
    fn test_self_network_lsas() {
        let lsas = snapshot().self_network_lsas();
        assert_eq!(lsas.len(), 1);
        assert_eq!(lsas[0].ls_id, "10.0.0.1");
    }

    #[test]
    fn test_peer_map() {
        let map = snapshot().peer_map();
        assert_eq!(map.peer_interface_to_address.len(), 2);
        assert_eq!(map.peer_interface_to_address["eth0"], "10.0.0.2");
        assert_eq!(map.peer_interface_to_address["eth1"], "10.0.1.3");
    }
}
