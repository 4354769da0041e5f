//! Shutdown and malformed connection tests
//!
//! A malformed request ends only its own connection; `system/exit` answers
//! first and then stops the server.

use std::sync::Arc;
use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::UnixStream;

use ospf_monitor::error::IpcError;
use ospf_monitor::ipc::{default_router, RequestContext, Response};
use ospf_monitor::state::SharedState;

use super::{sample_snapshot, TestServer};

fn populated_state() -> Arc<SharedState> {
    let state = Arc::new(SharedState::new());
    state.publish_snapshot(sample_snapshot());
    state
}

// ============================================================================
// Exit Command Tests
// ============================================================================

#[tokio::test]
async fn test_exit_responds_then_stops() {
    let server = TestServer::start(populated_state()).await;
    let client = server.client();

    let response = client.request("system", "exit").await.unwrap();
    assert!(response.is_success());
    assert_eq!(response.message, "Shutting system down");
    assert!(response.data.is_none());

    tokio::time::timeout(Duration::from_secs(2), server.handle)
        .await
        .expect("server did not stop after exit")
        .unwrap();

    assert!(server.token.is_cancelled());
    assert!(!server.socket_path.exists());

    let err = client.request("ospf", "neighbors").await.unwrap_err();
    assert!(matches!(err, IpcError::ConnectionError(_)));
}

#[tokio::test]
async fn test_cancel_stops_idle_server() {
    let server = TestServer::start(populated_state()).await;
    let socket_path = server.socket_path.clone();

    server.token.cancel();
    tokio::time::timeout(Duration::from_secs(2), server.handle)
        .await
        .expect("server did not stop after cancel")
        .unwrap();

    assert!(!socket_path.exists());
}

// ============================================================================
// Malformed Connection Tests
// ============================================================================

#[tokio::test]
async fn test_short_payload_dropped_then_next_served() {
    let server = TestServer::start(populated_state()).await;

    {
        let mut stream = UnixStream::connect(&server.socket_path).await.unwrap();
        stream.write_all(&100u32.to_le_bytes()).await.unwrap();
        stream.write_all(&[1, 2, 3]).await.unwrap();
        stream.shutdown().await.unwrap();

        let mut buf = Vec::new();
        let n = stream.read_to_end(&mut buf).await.unwrap_or(0);
        assert_eq!(n, 0, "malformed request must not get a response");
    }

    let response = server.client().request("ospf", "neighbors").await.unwrap();
    assert!(response.is_success());

    server.stop().await;
}

#[tokio::test]
async fn test_oversize_frame_dropped_then_next_served() {
    let server = TestServer::start(populated_state()).await;

    {
        let mut stream = UnixStream::connect(&server.socket_path).await.unwrap();
        stream.write_all(&u32::MAX.to_le_bytes()).await.unwrap();

        let mut buf = Vec::new();
        let n = stream.read_to_end(&mut buf).await.unwrap_or(0);
        assert_eq!(n, 0);
    }

    let response = server.client().request("frr", "routerData").await.unwrap();
    assert!(response.is_success());

    server.stop().await;
}

#[tokio::test]
async fn test_garbage_payload_dropped_then_next_served() {
    let server = TestServer::start(populated_state()).await;

    {
        let mut stream = UnixStream::connect(&server.socket_path).await.unwrap();
        let garbage = [0xff_u8; 8];
        stream
            .write_all(&u32::try_from(garbage.len()).unwrap().to_le_bytes())
            .await
            .unwrap();
        stream.write_all(&garbage).await.unwrap();

        let mut buf = Vec::new();
        let n = stream.read_to_end(&mut buf).await.unwrap_or(0);
        assert_eq!(n, 0);
    }

    let response = server.client().request("system", "allResources").await.unwrap();
    assert!(response.is_success());

    server.stop().await;
}

// ============================================================================
// Handler Failure Tests
// ============================================================================

fn handle_panic(ctx: &RequestContext<'_>) -> Response {
    let neighbors = ctx.snapshot.map(|s| s.ospf.neighbors.len()).unwrap_or_default();
    let empty: Vec<u32> = Vec::new();
    Response::ok(format!("{}", empty[neighbors]))
}

#[tokio::test]
async fn test_panicking_handler_only_drops_its_connection() {
    let mut router = default_router();
    router.register("debug", "panic", handle_panic);
    let server = TestServer::start_with_router(populated_state(), router).await;
    let client = server.client();

    let err = client.request("debug", "panic").await.unwrap_err();
    assert!(matches!(err, IpcError::ProtocolError(_) | IpcError::IoError(_)));

    assert!(!server.handle.is_finished());
    let response = client.request("ospf", "neighbors").await.unwrap();
    assert!(response.is_success());

    // The execution lock is not left held by the panicked request
    let response = client.request("frr", "routerData").await.unwrap();
    assert!(response.is_success());

    server.stop().await;
}
