//! Failure injection tests for the editor connection and retry policies.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::broadcast;

use unity_bridge::config::BridgeConfig;
use unity_bridge::error::BridgeError;
use unity_bridge::net::{EditorConnection, EditorState};
use unity_bridge::resilience::RetryPolicy;

mod common;
use common::MockReply;

/// Config pointed at the given peer, with delays tightened for tests.
fn config_for(addr: SocketAddr) -> BridgeConfig {
    let mut config = BridgeConfig::default();
    config.network.unity_host = addr.ip().to_string();
    config.network.unity_port = addr.port();
    config.connection.connect_timeout_secs = 0.5;
    config.connection.framed_receive_timeout_secs = 0.5;
    config.retry.max_retries = 3;
    config.retry.retry_delay_secs = 0.02;
    config.retry.reload_retry_ms = 20;
    config.retry.reload_max_retries = 5;
    config
}

#[tokio::test]
async fn tolerates_heartbeats_below_the_cap() {
    let addr = common::start_mock_editor(|_| MockReply::HeartbeatsThen(3, b"done".to_vec())).await;
    let conn = EditorConnection::new(&config_for(addr));

    let response = conn.exchange(b"build").await.unwrap();
    assert_eq!(response, b"done");
    assert_eq!(conn.state().await, EditorState::Connected);
}

#[tokio::test]
async fn heartbeat_cap_exhaustion_is_a_receive_timeout() {
    let addr = common::start_mock_editor(|_| MockReply::HeartbeatsThen(4, b"late".to_vec())).await;
    let mut config = config_for(addr);
    config.connection.max_heartbeat_frames = 4;
    let conn = EditorConnection::new(&config);

    let err = conn.exchange(b"build").await.unwrap_err();
    match err {
        BridgeError::ReceiveTimeout { heartbeats, .. } => assert_eq!(heartbeats, 4),
        other => panic!("expected receive timeout, got {other:?}"),
    }
    // A late reply must not leak into the next exchange.
    assert_eq!(conn.state().await, EditorState::Disconnected);
}

#[tokio::test]
async fn silent_peer_hits_the_receive_deadline() {
    let addr = common::start_mock_editor(|_| MockReply::Silent).await;
    let mut config = config_for(addr);
    config.connection.framed_receive_timeout_secs = 0.2;
    let conn = EditorConnection::new(&config);

    let started = Instant::now();
    let err = conn.exchange(b"ping").await.unwrap_err();
    assert!(matches!(err, BridgeError::ReceiveTimeout { .. }));
    assert!(started.elapsed() >= Duration::from_millis(200));
}

#[tokio::test]
async fn reload_signal_moves_the_state_machine() {
    let calls = Arc::new(AtomicU32::new(0));
    let seen = calls.clone();
    let addr = common::start_mock_editor(move |_| {
        if seen.fetch_add(1, Ordering::SeqCst) == 0 {
            MockReply::Reloading
        } else {
            MockReply::HeartbeatsThen(0, b"recovered".to_vec())
        }
    })
    .await;
    let config = config_for(addr);
    let conn = EditorConnection::new(&config);

    let err = conn.exchange(b"status").await.unwrap_err();
    match err {
        BridgeError::Reloading { retry_after_ms } => {
            assert_eq!(retry_after_ms, config.retry.reload_retry_ms);
        }
        other => panic!("expected reload backpressure, got {other:?}"),
    }
    assert_eq!(conn.state().await, EditorState::Reloading);

    // A normal response moves the state back to connected.
    let response = conn.exchange(b"status").await.unwrap();
    assert_eq!(response, b"recovered");
    assert_eq!(conn.state().await, EditorState::Connected);
}

#[tokio::test]
async fn reload_budget_performs_exactly_the_configured_attempts() {
    let calls = Arc::new(AtomicU32::new(0));
    let seen = calls.clone();
    let addr = common::start_mock_editor(move |_| {
        seen.fetch_add(1, Ordering::SeqCst);
        MockReply::Reloading
    })
    .await;

    let config = config_for(addr);
    let conn = EditorConnection::new(&config);
    let policy = RetryPolicy::new(&config.retry);
    let (tx, mut rx) = broadcast::channel(1);

    let started = Instant::now();
    let err = policy.execute(&conn, b"build", &mut rx).await.unwrap_err();
    drop(tx);

    match err {
        BridgeError::Reloading { retry_after_ms } => assert_eq!(retry_after_ms, 20),
        other => panic!("expected reload backpressure, got {other:?}"),
    }
    assert_eq!(calls.load(Ordering::SeqCst), 5);
    // Four sleeps between five attempts.
    assert!(started.elapsed() >= Duration::from_millis(80));
    // Exhaustion tears the connection down.
    assert_eq!(conn.state().await, EditorState::Disconnected);
}

#[tokio::test]
async fn refused_connections_consume_the_transient_budget() {
    let addr = common::refused_addr().await;
    let config = config_for(addr);
    let conn = EditorConnection::new(&config);
    let policy = RetryPolicy::new(&config.retry);
    let (tx, mut rx) = broadcast::channel(1);

    let started = Instant::now();
    let err = policy.execute(&conn, b"build", &mut rx).await.unwrap_err();
    drop(tx);

    assert!(matches!(err, BridgeError::Connect { .. }));
    // Two sleeps between three attempts.
    assert!(started.elapsed() >= Duration::from_millis(40));
}

#[tokio::test]
async fn receive_timeouts_are_retried_as_transient() {
    let calls = Arc::new(AtomicU32::new(0));
    let seen = calls.clone();
    let addr = common::start_mock_editor(move |_| {
        seen.fetch_add(1, Ordering::SeqCst);
        MockReply::Silent
    })
    .await;

    let mut config = config_for(addr);
    config.connection.framed_receive_timeout_secs = 0.1;
    config.retry.max_retries = 2;
    let conn = EditorConnection::new(&config);
    let policy = RetryPolicy::new(&config.retry);
    let (tx, mut rx) = broadcast::channel(1);

    let err = policy.execute(&conn, b"ping", &mut rx).await.unwrap_err();
    drop(tx);

    assert!(matches!(err, BridgeError::ReceiveTimeout { .. }));
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn oversized_frames_are_fatal_and_never_retried() {
    let calls = Arc::new(AtomicU32::new(0));
    let seen = calls.clone();
    let addr = common::start_mock_editor(move |_| {
        seen.fetch_add(1, Ordering::SeqCst);
        MockReply::Oversized(2048)
    })
    .await;

    let mut config = config_for(addr);
    config.connection.buffer_size = 1024;
    // Budgets left generous to prove they are not consulted.
    config.retry.max_retries = 10;
    config.retry.reload_max_retries = 10;
    let conn = EditorConnection::new(&config);
    let policy = RetryPolicy::new(&config.retry);
    let (tx, mut rx) = broadcast::channel(1);

    let err = policy.execute(&conn, b"build", &mut rx).await.unwrap_err();
    drop(tx);

    assert!(matches!(err, BridgeError::Protocol(_)));
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(conn.state().await, EditorState::Disconnected);
}

#[tokio::test]
async fn shutdown_interrupts_a_retry_loop_between_attempts() {
    let addr = common::start_mock_editor(|_| MockReply::Reloading).await;
    let mut config = config_for(addr);
    config.retry.reload_retry_ms = 10_000;
    let conn = Arc::new(EditorConnection::new(&config));
    let policy = RetryPolicy::new(&config.retry);
    let (tx, mut rx) = broadcast::channel(1);

    let task = {
        let conn = conn.clone();
        tokio::spawn(async move { policy.execute(&conn, b"build", &mut rx).await })
    };

    // Let the first attempt land, then pull the plug mid-sleep.
    tokio::time::sleep(Duration::from_millis(100)).await;
    tx.send(()).unwrap();

    let result = tokio::time::timeout(Duration::from_secs(2), task)
        .await
        .expect("retry loop did not abort on shutdown")
        .unwrap();
    assert!(matches!(result, Err(BridgeError::Canceled)));
}

#[tokio::test]
async fn concurrent_exchanges_never_interleave() {
    // Echo after a heartbeat so exchanges overlap if unserialized.
    let addr = common::start_mock_editor(|request| MockReply::HeartbeatsThen(1, request)).await;
    let conn = Arc::new(EditorConnection::new(&config_for(addr)));

    let mut tasks = Vec::new();
    for i in 0u32..8 {
        let conn = conn.clone();
        tasks.push(tokio::spawn(async move {
            let body = format!("request-{i}").into_bytes();
            let response = conn.exchange(&body).await.unwrap();
            (body, response)
        }));
    }

    for task in tasks {
        let (sent, received) = task.await.unwrap();
        assert_eq!(sent, received);
    }
}
