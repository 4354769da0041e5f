//! Request/response tests over a real Unix socket
//!
//! Every routed `(service, command)` pair is exercised against a populated
//! state, plus the error paths for unknown routes and missing data.

use std::sync::Arc;

use ospf_monitor::analysis::{Analyzer, BaselineAnalyzer};
use ospf_monitor::ipc::{
    default_router, response_value::Kind, Message, NO_ANALYSIS_MESSAGE, NO_SNAPSHOT_MESSAGE,
    STATUS_ERROR, STATUS_SUCCESS,
};
use ospf_monitor::state::SharedState;

use super::{sample_snapshot, TestServer};

fn populated_state() -> Arc<SharedState> {
    let state = Arc::new(SharedState::new());
    let snapshot = sample_snapshot();
    state.publish_analysis(BaselineAnalyzer::new().evaluate(&snapshot));
    state.publish_snapshot(snapshot);
    state
}

// ============================================================================
// Routing Table Tests
// ============================================================================

#[tokio::test]
async fn test_every_data_route_succeeds() {
    let server = TestServer::start(populated_state()).await;
    let client = server.client();

    for (service, command) in default_router().routes() {
        if (service, command) == ("system", "exit") {
            continue;
        }
        let response = client.request(service, command).await.unwrap();
        assert_eq!(
            response.status, STATUS_SUCCESS,
            "{service}/{command} failed: {}",
            response.message
        );
        assert!(response.kind().is_some(), "{service}/{command} has no data");
    }

    server.stop().await;
}

#[tokio::test]
async fn test_unknown_service() {
    let server = TestServer::start(populated_state()).await;

    let response = server.client().request("bgp", "neighbors").await.unwrap();
    assert_eq!(response.status, STATUS_ERROR);
    assert_eq!(response.message, "Unknown service: bgp");
    assert!(response.data.is_none());

    server.stop().await;
}

#[tokio::test]
async fn test_unknown_command() {
    let server = TestServer::start(populated_state()).await;

    let response = server.client().request("ospf", "lsa9").await.unwrap();
    assert_eq!(response.status, STATUS_ERROR);
    assert_eq!(response.message, "Unknown command: lsa9");

    server.stop().await;
}

// ============================================================================
// Payload Tests
// ============================================================================

#[tokio::test]
async fn test_all_resources_round_trip() {
    let state = populated_state();
    let expected = state.snapshot().unwrap().system.clone();
    let server = TestServer::start(state).await;

    let response = server.client().request("system", "allResources").await.unwrap();
    assert!(response.is_success());
    match response.kind() {
        Some(Kind::SystemMetrics(metrics)) => assert_eq!(*metrics, expected),
        other => panic!("unexpected payload: {other:?}"),
    }

    server.stop().await;
}

#[tokio::test]
async fn test_router_data() {
    let server = TestServer::start(populated_state()).await;

    let response = server.client().request("frr", "routerData").await.unwrap();
    match response.kind() {
        Some(Kind::RouterData(data)) => {
            assert_eq!(data.router_name, "r1");
            assert_eq!(data.ospf_router_id, "1.1.1.1");
            assert_eq!(data.frr_version, "8.4");
        }
        other => panic!("unexpected payload: {other:?}"),
    }

    server.stop().await;
}

#[tokio::test]
async fn test_lsa_filters() {
    let server = TestServer::start(populated_state()).await;
    let client = server.client();

    let count = |kind: Option<&Kind>| match kind {
        Some(Kind::Lsas(list)) => list.lsas.len(),
        other => panic!("unexpected payload: {other:?}"),
    };

    let database = client.request("ospf", "database").await.unwrap();
    assert_eq!(count(database.kind()), 6);

    let network_self = client.request("ospf", "network").await.unwrap();
    assert_eq!(count(network_self.kind()), 1);

    let network_all = client.request("ospf", "networkAll").await.unwrap();
    assert_eq!(count(network_all.kind()), 2);

    let duplicates = client.request("ospf", "duplicates").await.unwrap();
    assert_eq!(count(duplicates.kind()), 2);

    server.stop().await;
}

#[tokio::test]
async fn test_peer_map() {
    let server = TestServer::start(populated_state()).await;

    let response = server.client().request("ospf", "peerMap").await.unwrap();
    match response.kind() {
        Some(Kind::PeerMap(map)) => {
            assert_eq!(
                map.peer_interface_to_address.get("eth0").map(String::as_str),
                Some("10.0.0.2")
            );
        }
        other => panic!("unexpected payload: {other:?}"),
    }

    server.stop().await;
}

#[tokio::test]
async fn test_params_are_accepted() {
    let server = TestServer::start(populated_state()).await;

    let message = Message::new("ospf", "neighbors")
        .with_param("area", "0.0.0.0")
        .with_param("verbose", true);
    let response = server.client().send(&message).await.unwrap();
    assert!(response.is_success());

    server.stop().await;
}

// ============================================================================
// Empty State Tests
// ============================================================================

#[tokio::test]
async fn test_no_snapshot_yet() {
    let server = TestServer::start(Arc::new(SharedState::new())).await;
    let client = server.client();

    let response = client.request("ospf", "neighbors").await.unwrap();
    assert_eq!(response.status, STATUS_ERROR);
    assert_eq!(response.message, NO_SNAPSHOT_MESSAGE);

    let response = client.request("analysis", "router").await.unwrap();
    assert_eq!(response.status, STATUS_ERROR);
    assert_eq!(response.message, NO_ANALYSIS_MESSAGE);

    server.stop().await;
}

#[tokio::test]
async fn test_snapshot_replaced_between_requests() {
    let state = Arc::new(SharedState::new());
    let server = TestServer::start(state.clone()).await;
    let client = server.client();

    state.publish_snapshot(sample_snapshot());
    let first = client.request("ospf", "neighbors").await.unwrap();

    let mut next = sample_snapshot();
    next.ospf.neighbors.clear();
    state.publish_snapshot(next);
    let second = client.request("ospf", "neighbors").await.unwrap();

    match (first.kind(), second.kind()) {
        (Some(Kind::Neighbors(a)), Some(Kind::Neighbors(b))) => {
            assert_eq!(a.neighbors.len(), 1);
            assert!(b.neighbors.is_empty());
        }
        other => panic!("unexpected payloads: {other:?}"),
    }

    server.stop().await;
}
