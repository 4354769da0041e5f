//! Concurrent client tests
//!
//! The server handles one connection at a time; simultaneous clients queue
//! in the listen backlog and must all receive the same answer. While
//! snapshots are being replaced, each answer comes from exactly one of them.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use ospf_monitor::ipc::response_value::Kind;
use ospf_monitor::state::SharedState;

use super::{sample_snapshot, TestServer};

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_identical_requests() {
    let state = Arc::new(SharedState::new());
    state.publish_snapshot(sample_snapshot());
    let server = TestServer::start(state).await;

    let mut handles = Vec::new();
    for _ in 0..16 {
        let client = server.client();
        handles.push(tokio::spawn(async move {
            client.request("ospf", "database").await.unwrap()
        }));
    }

    let mut responses = Vec::new();
    for handle in handles {
        responses.push(handle.await.unwrap());
    }

    assert!(responses.iter().all(|r| r.is_success()));
    assert!(responses.windows(2).all(|pair| pair[0] == pair[1]));

    server.stop().await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_mixed_requests() {
    let state = Arc::new(SharedState::new());
    state.publish_snapshot(sample_snapshot());
    let server = TestServer::start(state).await;

    let commands = [
        ("ospf", "neighbors"),
        ("ospf", "interfaces"),
        ("ospf", "rib"),
        ("frr", "routerData"),
        ("system", "allResources"),
    ];

    let mut handles = Vec::new();
    for round in 0..4 {
        for (service, command) in commands {
            let client = server.client();
            handles.push(tokio::spawn(async move {
                let response = client.request(service, command).await.unwrap();
                (round, service, command, response)
            }));
        }
    }

    for handle in handles {
        let (round, service, command, response) = handle.await.unwrap();
        assert!(
            response.is_success(),
            "round {round} {service}/{command}: {}",
            response.message
        );
    }

    server.stop().await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_responses_never_mix_publications() {
    let state = Arc::new(SharedState::new());
    state.publish_snapshot(generation(0));
    let server = TestServer::start(state.clone()).await;

    let running = Arc::new(AtomicBool::new(true));
    let publisher = {
        let state = state.clone();
        let running = running.clone();
        tokio::spawn(async move {
            let mut n = 1u32;
            while running.load(Ordering::SeqCst) {
                state.publish_snapshot(generation(n));
                n += 1;
                tokio::task::yield_now().await;
            }
            n
        })
    };

    let mut handles = Vec::new();
    for _ in 0..8 {
        let client = server.client();
        handles.push(tokio::spawn(async move {
            let mut seen = Vec::new();
            for _ in 0..10 {
                seen.push(client.request("frr", "routerData").await.unwrap());
            }
            seen
        }));
    }

    for handle in handles {
        for response in handle.await.unwrap() {
            let Some(Kind::RouterData(data)) = response.kind() else {
                panic!("unexpected payload: {:?}", response.kind());
            };
            let n = data.router_name.trim_start_matches('r');
            assert_eq!(data.ospf_router_id, format!("{n}.{n}.{n}.{n}"));
            assert_eq!(data.frr_version, format!("9.{n}"));
        }
    }

    running.store(false, Ordering::SeqCst);
    let published = publisher.await.unwrap();
    assert!(published > 1);

    server.stop().await;
}

/// Snapshot whose identity fields all encode `n`
fn generation(n: u32) -> ospf_monitor::model::Snapshot {
    let mut snapshot = sample_snapshot();
    snapshot.static_config.hostname = format!("r{n}");
    snapshot.static_config.router_id = format!("{n}.{n}.{n}.{n}");
    snapshot.static_config.frr_version = format!("9.{n}");
    snapshot
}
