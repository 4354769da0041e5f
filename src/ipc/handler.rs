//! IPC command handlers
//!
//! Each handler reads the published snapshot or analysis and wraps the
//! relevant part in a [`Response`]. [`IpcHandler`] owns the routing table
//! and loads the shared state once per request.

use std::sync::Arc;

use parking_lot::Mutex;
use tracing::debug;

use super::protocol::{Message, Response};
use super::router::{RequestContext, Router, ServerControl};
use crate::model::{
    AnomalyAnalysis, AnomalyDetection, InterfaceList, LsaKind, LsaList, NeighborList, RouteList,
    Snapshot,
};
use crate::state::SharedState;

/// Message returned by data commands before the first successful cycle
pub const NO_SNAPSHOT_MESSAGE: &str = "No data collected yet";
/// Message returned by analysis commands before the first analysis
pub const NO_ANALYSIS_MESSAGE: &str = "No analysis available yet";

/// IPC command handler
pub struct IpcHandler {
    state: Arc<SharedState>,
    router: Router,
    control: ServerControl,
    /// Held for the duration of dispatch
    exec_lock: Mutex<()>,
}

impl IpcHandler {
    /// Create a handler with the full routing table
    pub fn new(state: Arc<SharedState>, control: ServerControl) -> Self {
        Self::with_router(state, control, default_router())
    }

    /// Create a handler with a custom routing table
    pub fn with_router(state: Arc<SharedState>, control: ServerControl, router: Router) -> Self {
        Self {
            state,
            router,
            control,
            exec_lock: Mutex::new(()),
        }
    }

    /// Handle one request
    pub fn handle(&self, msg: &Message) -> Response {
        let snapshot = self.state.snapshot();
        let analysis = self.state.analysis();

        let ctx = RequestContext {
            snapshot: snapshot.as_deref(),
            analysis: analysis.as_deref(),
            params: &msg.params,
            control: &self.control,
        };

        let _guard = self.exec_lock.lock();
        let response = self.router.dispatch(msg, &ctx);
        debug!(
            service = %msg.service,
            command = %msg.command,
            status = %response.status,
            "Handled IPC request"
        );
        response
    }

    /// Shutdown control shared with the server loop
    pub fn control(&self) -> &ServerControl {
        &self.control
    }

    pub fn router(&self) -> &Router {
        &self.router
    }
}

/// Routing table with every supported command
#[must_use]
pub fn default_router() -> Router {
    let mut router = Router::new();
    router.register("frr", "routerData", handle_router_data);

    router
        .register("ospf", "database", handle_database)
        .register("ospf", "router", handle_router_lsas)
        .register("ospf", "network", handle_self_network_lsas)
        .register("ospf", "networkAll", handle_network_lsas)
        .register("ospf", "summary", handle_summary_lsas)
        .register("ospf", "asbrSummary", handle_asbr_summary_lsas)
        .register("ospf", "externalData", handle_external_lsas)
        .register("ospf", "nssaExternalData", handle_nssa_external_lsas)
        .register("ospf", "duplicates", handle_duplicates)
        .register("ospf", "neighbors", handle_neighbors)
        .register("ospf", "interfaces", handle_interfaces)
        .register("ospf", "rib", handle_rib)
        .register("ospf", "staticConfig", handle_static_config)
        .register("ospf", "peerMap", handle_peer_map);

    router
        .register("analysis", "router", handle_router_anomaly)
        .register("analysis", "external", handle_external_anomaly)
        .register("analysis", "nssaExternal", handle_nssa_external_anomaly)
        .register("analysis", "lsdbToRib", handle_lsdb_to_rib_anomaly)
        .register("analysis", "ribToFib", handle_rib_to_fib_anomaly);

    router
        .register("system", "allResources", handle_all_resources)
        .register("system", "exit", handle_exit);

    router
}

fn with_snapshot(ctx: &RequestContext<'_>, f: impl FnOnce(&Snapshot) -> Response) -> Response {
    ctx.snapshot
        .map_or_else(|| Response::error(NO_SNAPSHOT_MESSAGE), f)
}

fn with_analysis(
    ctx: &RequestContext<'_>,
    message: &str,
    select: impl FnOnce(&AnomalyAnalysis) -> &AnomalyDetection,
) -> Response {
    ctx.analysis.map_or_else(
        || Response::error(NO_ANALYSIS_MESSAGE),
        |analysis| Response::success(message, select(analysis).clone()),
    )
}

fn lsas_of_kind(ctx: &RequestContext<'_>, kind: LsaKind, message: &str) -> Response {
    with_snapshot(ctx, |s| {
        Response::success(
            message,
            LsaList {
                lsas: s.ospf.lsas_of(kind),
            },
        )
    })
}

// ============================================================================
// frr
// ============================================================================

fn handle_router_data(ctx: &RequestContext<'_>) -> Response {
    with_snapshot(ctx, |s| Response::success("Returning FRR router data", s.router_data()))
}

// ============================================================================
// ospf
// ============================================================================

fn handle_database(ctx: &RequestContext<'_>) -> Response {
    with_snapshot(ctx, |s| {
        Response::success(
            "Returning OSPF database",
            LsaList {
                lsas: s.ospf.lsas.clone(),
            },
        )
    })
}

fn handle_router_lsas(ctx: &RequestContext<'_>) -> Response {
    lsas_of_kind(ctx, LsaKind::Router, "Returning OSPF router data")
}

fn handle_self_network_lsas(ctx: &RequestContext<'_>) -> Response {
    with_snapshot(ctx, |s| {
        Response::success(
            "Returning OSPF network data self",
            LsaList {
                lsas: s.self_network_lsas(),
            },
        )
    })
}

fn handle_network_lsas(ctx: &RequestContext<'_>) -> Response {
    lsas_of_kind(ctx, LsaKind::Network, "Returning OSPF network data")
}

fn handle_summary_lsas(ctx: &RequestContext<'_>) -> Response {
    lsas_of_kind(ctx, LsaKind::Summary, "Returning OSPF summary data")
}

fn handle_asbr_summary_lsas(ctx: &RequestContext<'_>) -> Response {
    lsas_of_kind(ctx, LsaKind::AsbrSummary, "Returning OSPF ASBR summary data")
}

fn handle_external_lsas(ctx: &RequestContext<'_>) -> Response {
    lsas_of_kind(ctx, LsaKind::AsExternal, "Returning OSPF external data")
}

fn handle_nssa_external_lsas(ctx: &RequestContext<'_>) -> Response {
    lsas_of_kind(ctx, LsaKind::NssaExternal, "Returning OSPF NSSA external data")
}

fn handle_duplicates(ctx: &RequestContext<'_>) -> Response {
    with_snapshot(ctx, |s| {
        Response::success(
            "Returning OSPF duplicates",
            LsaList {
                lsas: s.ospf.duplicate_external_lsas(),
            },
        )
    })
}

fn handle_neighbors(ctx: &RequestContext<'_>) -> Response {
    with_snapshot(ctx, |s| {
        Response::success(
            "Returning OSPF neighbors",
            NeighborList {
                neighbors: s.ospf.neighbors.clone(),
            },
        )
    })
}

fn handle_interfaces(ctx: &RequestContext<'_>) -> Response {
    with_snapshot(ctx, |s| {
        Response::success(
            "Returning interfaces",
            InterfaceList {
                interfaces: s.ospf.interfaces.clone(),
            },
        )
    })
}

fn handle_rib(ctx: &RequestContext<'_>) -> Response {
    with_snapshot(ctx, |s| {
        Response::success(
            "Returning routes",
            RouteList {
                routes: s.ospf.routes.clone(),
            },
        )
    })
}

fn handle_static_config(ctx: &RequestContext<'_>) -> Response {
    with_snapshot(ctx, |s| {
        Response::success("Returning static FRR configuration", s.static_config.clone())
    })
}

fn handle_peer_map(ctx: &RequestContext<'_>) -> Response {
    with_snapshot(ctx, |s| {
        Response::success("Returning peer interface to address map", s.peer_map())
    })
}

// ============================================================================
// analysis
// ============================================================================

fn handle_router_anomaly(ctx: &RequestContext<'_>) -> Response {
    with_analysis(ctx, "Returning router anomalies", |a| &a.router_anomaly)
}

fn handle_external_anomaly(ctx: &RequestContext<'_>) -> Response {
    with_analysis(ctx, "Returning external anomalies", |a| &a.external_anomaly)
}

fn handle_nssa_external_anomaly(ctx: &RequestContext<'_>) -> Response {
    with_analysis(ctx, "Returning NSSA external anomalies", |a| {
        &a.nssa_external_anomaly
    })
}

fn handle_lsdb_to_rib_anomaly(ctx: &RequestContext<'_>) -> Response {
    with_analysis(ctx, "Returning LSDB to RIB anomalies", |a| &a.lsdb_to_rib_anomaly)
}

fn handle_rib_to_fib_anomaly(ctx: &RequestContext<'_>) -> Response {
    with_analysis(ctx, "Returning RIB to FIB anomalies", |a| &a.rib_to_fib_anomaly)
}

// ============================================================================
// system
// ============================================================================

fn handle_all_resources(ctx: &RequestContext<'_>) -> Response {
    with_snapshot(ctx, |s| {
        Response::success("Returning system resources", s.system.clone())
    })
}

fn handle_exit(ctx: &RequestContext<'_>) -> Response {
    ctx.control.request_shutdown();
    Response::ok("Shutting system down")
}
