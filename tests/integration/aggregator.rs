//! Collection cycles feeding the query interface
//!
//! A scripted metrics source stands in for the FRR exporter so that cycles
//! can be made to fail on demand.

use std::io::Write;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tempfile::NamedTempFile;
use tokio_util::sync::CancellationToken;

use ospf_monitor::aggregator::{Aggregator, MetricsSource};
use ospf_monitor::analysis::{self, Analyzer, BaselineAnalyzer};
use ospf_monitor::error::{CollectionError, SourceError};
use ospf_monitor::ipc::{response_value::Kind, NO_SNAPSHOT_MESSAGE};
use ospf_monitor::model::{OspfState, SystemMetrics};
use ospf_monitor::state::SharedState;

use super::{sample_snapshot, TestServer};

const FRR_CONF: &str = "\
frr version 8.4
hostname r1
interface eth0
 ip address 10.0.0.1/24
 ip ospf area 0.0.0.0
 ip ospf cost 10
exit
interface lo
 ip address 1.1.1.1/32
 ip ospf area 0.0.0.0
 ip ospf passive
exit
router ospf
 ospf router-id 1.1.1.1
 network 10.0.0.0/24 area 0.0.0.0
exit
";

/// Replays the OSPF state of [`sample_snapshot`], or fails when told to
struct ScriptedSource {
    fail: AtomicBool,
}

impl ScriptedSource {
    fn new() -> Self {
        Self {
            fail: AtomicBool::new(false),
        }
    }
}

#[async_trait]
impl MetricsSource for ScriptedSource {
    async fn fetch_ospf(&self) -> Result<OspfState, SourceError> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(SourceError::request("http://localhost:9342/metrics", "connection refused"));
        }
        Ok(sample_snapshot().ospf)
    }

    async fn collect_system_metrics(&self) -> Result<SystemMetrics, SourceError> {
        Ok(sample_snapshot().system)
    }
}

fn frr_conf() -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(FRR_CONF.as_bytes()).unwrap();
    file
}

#[tokio::test]
async fn test_cycle_populates_static_config() {
    let conf = frr_conf();
    let state = Arc::new(SharedState::new());
    let aggregator = Aggregator::new(Arc::new(ScriptedSource::new()), conf.path(), state.clone());
    let server = TestServer::start(state).await;
    let client = server.client();

    let response = client.request("ospf", "staticConfig").await.unwrap();
    assert_eq!(response.message, NO_SNAPSHOT_MESSAGE);

    aggregator.run_cycle().await.unwrap();

    let response = client.request("ospf", "staticConfig").await.unwrap();
    match response.kind() {
        Some(Kind::StaticConfig(config)) => {
            assert_eq!(config.router_id, "1.1.1.1");
            assert_eq!(config.hostname, "r1");
            assert_eq!(config.frr_version, "8.4");
            assert_eq!(config.interfaces.len(), 2);
            let lo = config.interface("lo").unwrap();
            assert!(lo.passive);
            assert_eq!(config.area("0.0.0.0").unwrap().networks, vec!["10.0.0.0/24"]);
        }
        other => panic!("unexpected payload: {other:?}"),
    }

    server.stop().await;
}

#[tokio::test]
async fn test_failed_cycle_keeps_served_snapshot() {
    let conf = frr_conf();
    let state = Arc::new(SharedState::new());
    let source = Arc::new(ScriptedSource::new());
    let aggregator = Aggregator::new(source.clone(), conf.path(), state.clone());
    let server = TestServer::start(state).await;
    let client = server.client();

    aggregator.run_cycle().await.unwrap();
    let before = client.request("ospf", "database").await.unwrap();

    source.fail.store(true, Ordering::SeqCst);
    let err = aggregator.run_cycle().await.unwrap_err();
    assert!(matches!(err, CollectionError::Ospf(_)));

    let after = client.request("ospf", "database").await.unwrap();
    assert!(after.is_success());
    assert_eq!(before, after);

    server.stop().await;
}

#[tokio::test]
async fn test_missing_config_file_fails_cycle() {
    let dir = tempfile::tempdir().unwrap();
    let state = Arc::new(SharedState::new());
    let aggregator = Aggregator::new(
        Arc::new(ScriptedSource::new()),
        dir.path().join("frr.conf"),
        state.clone(),
    );

    let err = aggregator.run_cycle().await.unwrap_err();
    assert!(matches!(err, CollectionError::ConfigNotFound { .. }));
    assert!(state.snapshot().is_none());
}

#[tokio::test]
async fn test_periodic_loops_publish_analysis() {
    let conf = frr_conf();
    let state = Arc::new(SharedState::new());
    let aggregator = Arc::new(Aggregator::new(
        Arc::new(ScriptedSource::new()),
        conf.path(),
        state.clone(),
    ));
    let cancel = CancellationToken::new();

    let collect = tokio::spawn(
        Arc::clone(&aggregator).start_periodic(Duration::from_millis(20), cancel.child_token()),
    );
    let analyzer: Arc<dyn Analyzer> = Arc::new(BaselineAnalyzer::new());
    let analyze = tokio::spawn(analysis::run_periodic(
        analyzer,
        state.clone(),
        Duration::from_millis(20),
        cancel.child_token(),
    ));

    let server = TestServer::start(state.clone()).await;
    let client = server.client();

    let mut response = client.request("analysis", "external").await.unwrap();
    for _ in 0..100 {
        if response.is_success() {
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
        response = client.request("analysis", "external").await.unwrap();
    }

    match response.kind() {
        Some(Kind::Anomaly(detection)) => {
            assert!(detection.has_duplicate);
            assert_eq!(detection.duplicate_entries.len(), 2);
        }
        other => panic!("unexpected payload: {other:?}"),
    }

    cancel.cancel();
    collect.await.unwrap();
    analyze.await.unwrap();
    assert!(aggregator.success_count() >= 1);

    server.stop().await;
}
