//! Data model shared by the collector, the analyzer and the IPC layer
//!
//! Types that travel over the socket are `prost` messages. Types decoded
//! from the metrics exporter also derive `serde`.

mod anomaly;
mod ospf;
mod snapshot;
mod static_config;
mod system;

pub use anomaly::{Advertisement, AnomalyAnalysis, AnomalyDetection};
pub use ospf::{
    InterfaceList, LsaKind, LsaList, NeighborList, OspfInterface, OspfLsa, OspfNeighbor, OspfRoute,
    OspfState, PeerMap, RouteList,
};
pub use snapshot::Snapshot;
pub use static_config::{
    AreaSetting, FrrRouterData, InterfaceConfig, NetworkConfig, OspfArea, Redistribution,
    StaticRoute,
};
pub use system::{InterfaceStats, SystemMetrics};
