//! Integration tests for ospf-monitor
//!
//! These tests run a real IPC server on a temporary Unix socket and talk to
//! it with [`IpcClient`], the same way `ospf-query` does.
//!
//! # Test Organization
//!
//! - `ipc_roundtrip`: every routed command over the socket
//! - `shutdown`: `system/exit` and malformed connections
//! - `concurrency`: simultaneous clients
//! - `aggregator`: collection cycles feeding the IPC layer

pub mod aggregator;
pub mod concurrency;
pub mod ipc_roundtrip;
pub mod shutdown;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use tempfile::TempDir;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use ospf_monitor::config::IpcConfig;
use ospf_monitor::ipc::{default_router, IpcClient, IpcHandler, IpcServer, Router, ServerControl};
use ospf_monitor::model::{
    InterfaceConfig, InterfaceStats, NetworkConfig, OspfInterface, OspfLsa, OspfNeighbor,
    OspfRoute, OspfState, Snapshot, SystemMetrics,
};
use ospf_monitor::state::SharedState;

// ============================================================================
// Test Helpers
// ============================================================================

/// A server listening on a socket inside its own temporary directory
pub struct TestServer {
    _dir: TempDir,
    pub socket_path: PathBuf,
    pub token: CancellationToken,
    pub handle: JoinHandle<()>,
}

impl TestServer {
    pub async fn start(state: Arc<SharedState>) -> Self {
        Self::start_with_router(state, default_router()).await
    }

    pub async fn start_with_router(state: Arc<SharedState>, router: Router) -> Self {
        let dir = tempfile::tempdir().unwrap();
        let socket_path = dir.path().join("analyzer.sock");
        let config = IpcConfig {
            socket_path: socket_path.clone(),
            socket_mode: 0o600,
            max_message_size: 64 * 1024,
            shutdown_grace_ms: 20,
        };

        let token = CancellationToken::new();
        let control = ServerControl::new(token.clone(), config.shutdown_grace());
        let handler = Arc::new(IpcHandler::with_router(state, control, router));
        let server = IpcServer::new(config, handler);
        let listener = server.bind().unwrap();
        let handle = tokio::spawn(async move { server.serve(listener).await });

        Self {
            _dir: dir,
            socket_path,
            token,
            handle,
        }
    }

    pub fn client(&self) -> IpcClient {
        IpcClient::new(&self.socket_path)
    }

    pub async fn stop(self) {
        self.token.cancel();
        let _ = tokio::time::timeout(Duration::from_secs(2), self.handle).await;
    }
}

fn lsa(kind: &str, ls_id: &str, adv_router: &str) -> OspfLsa {
    OspfLsa {
        lsa_type: kind.into(),
        ls_id: ls_id.into(),
        adv_router: adv_router.into(),
        age: 10,
        area: "0.0.0.0".into(),
    }
}

/// Snapshot of router `1.1.1.1` with one neighbor on `eth0`
pub fn sample_snapshot() -> Snapshot {
    let ospf = OspfState {
        neighbors: vec![OspfNeighbor {
            id: "2.2.2.2".into(),
            ip: "10.0.0.2".into(),
            state: "Full/DR".into(),
            interface: "eth0".into(),
            area: "0.0.0.0".into(),
        }],
        routes: vec![OspfRoute {
            prefix: "10.0.0.0/24".into(),
            next_hop: "0.0.0.0".into(),
            interface: "eth0".into(),
            cost: 10,
            route_type: "intra-area".into(),
            area: "0.0.0.0".into(),
        }],
        interfaces: vec![OspfInterface {
            name: "eth0".into(),
            area: "0.0.0.0".into(),
            nbr_count: 1,
            nbr_adjacent: 1,
            passive: false,
        }],
        lsas: vec![
            lsa("router", "1.1.1.1", "1.1.1.1"),
            lsa("router", "2.2.2.2", "2.2.2.2"),
            lsa("network", "10.0.0.1", "1.1.1.1"),
            lsa("network", "10.1.0.2", "2.2.2.2"),
            lsa("as-external", "192.168.0.0", "2.2.2.2"),
            lsa("as-external", "192.168.0.0", "3.3.3.3"),
        ],
    };

    let mut static_config = NetworkConfig {
        router_id: "1.1.1.1".into(),
        hostname: "r1".into(),
        frr_version: "8.4".into(),
        interfaces: vec![InterfaceConfig {
            area: "0.0.0.0".into(),
            cost: 10,
            ip_addresses: vec!["10.0.0.1/24".into()],
            ..InterfaceConfig::named("eth0")
        }],
        ..Default::default()
    };
    static_config.add_network("10.0.0.0/24", "0.0.0.0");

    let system = SystemMetrics {
        cpu_usage: 12.5,
        memory_usage: 40.0,
        network_stats: vec![InterfaceStats {
            name: "eth0".into(),
            rx_bytes: 1000,
            tx_bytes: 2000,
            rx_errors: 0,
            tx_errors: 0,
        }],
    };

    Snapshot::new(ospf, static_config, system)
}
