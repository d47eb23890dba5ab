//! Ping/pong echo over the `/ws` JSON envelope endpoint.

#![allow(clippy::panic)]

mod common;

use std::time::Duration;

use common::{
    assert_silent, connect, next_envelope, send_ping_envelope, send_text, spawn_default_server,
    spawn_server,
};
use pingpong_gateway::config::{ServerConfig, TransportSettings};
use serde_json::json;

fn pong(msg: &str) -> serde_json::Value {
    json!({ "event": "pong", "data": { "msg": msg } })
}

#[tokio::test]
async fn ping_is_echoed_as_pong() {
    let addr = spawn_default_server().await;
    let mut ws = connect(addr, "/ws").await;

    for msg in ["hello", "", " spaced  ", "ünïcødé 🚀", "{\"json\":\"inside\"}"] {
        send_ping_envelope(&mut ws, json!({ "msg": msg })).await;
        assert_eq!(next_envelope(&mut ws).await, pong(msg), "{msg:?}");
    }
}

#[tokio::test]
async fn missing_msg_is_echoed_as_empty() {
    let addr = spawn_default_server().await;
    let mut ws = connect(addr, "/ws").await;

    send_ping_envelope(&mut ws, json!({})).await;
    assert_eq!(next_envelope(&mut ws).await, pong(""));

    send_text(&mut ws, r#"{"event":"ping"}"#).await;
    assert_eq!(next_envelope(&mut ws).await, pong(""));
}

#[tokio::test]
async fn lone_surrogate_is_echoed_as_replacement_character() {
    let addr = spawn_default_server().await;
    let mut ws = connect(addr, "/ws").await;

    send_text(&mut ws, r#"{"event":"ping","data":{"msg":"a\ud800b"}}"#).await;
    assert_eq!(next_envelope(&mut ws).await, pong("a\u{FFFD}b"));
}

#[tokio::test]
async fn exactly_one_pong_per_ping() {
    let addr = spawn_default_server().await;
    let mut ws = connect(addr, "/ws").await;

    send_ping_envelope(&mut ws, json!({ "msg": "once" })).await;
    assert_eq!(next_envelope(&mut ws).await, pong("once"));
    assert_silent(&mut ws, Duration::from_millis(200)).await;
}

#[tokio::test]
async fn back_to_back_pings_keep_their_order() {
    let addr = spawn_default_server().await;
    let mut ws = connect(addr, "/ws").await;

    let msgs: Vec<String> = (0..20).map(|i| format!("seq-{i}")).collect();
    for msg in &msgs {
        send_ping_envelope(&mut ws, json!({ "msg": msg })).await;
    }
    for msg in &msgs {
        assert_eq!(next_envelope(&mut ws).await, pong(msg));
    }
}

#[tokio::test]
async fn concurrent_connections_do_not_cross_talk() {
    let addr = spawn_default_server().await;
    let mut alice = connect(addr, "/ws").await;
    let mut bob = connect(addr, "/ws").await;

    send_ping_envelope(&mut alice, json!({ "msg": "from alice" })).await;
    send_ping_envelope(&mut bob, json!({ "msg": "from bob" })).await;

    assert_eq!(next_envelope(&mut alice).await, pong("from alice"));
    assert_eq!(next_envelope(&mut bob).await, pong("from bob"));
    assert_silent(&mut alice, Duration::from_millis(200)).await;
    assert_silent(&mut bob, Duration::from_millis(200)).await;
}

#[tokio::test]
async fn many_clients_in_parallel() {
    let addr = spawn_default_server().await;

    let tasks: Vec<_> = (0..16)
        .map(|i| {
            tokio::spawn(async move {
                let mut ws = connect(addr, "/ws").await;
                let msg = format!("client-{i}");
                send_ping_envelope(&mut ws, json!({ "msg": msg })).await;
                assert_eq!(next_envelope(&mut ws).await, pong(&msg));
            })
        })
        .collect();

    for task in tasks {
        if let Err(err) = task.await {
            panic!("client task failed: {err}");
        }
    }
}

#[tokio::test]
async fn garbage_does_not_close_the_connection() {
    let addr = spawn_default_server().await;
    let mut ws = connect(addr, "/ws").await;

    for frame in ["not json", "[1,2,3]", r#"{"data":{"msg":"x"}}"#, r#"{"event":"chat"}"#] {
        send_text(&mut ws, frame).await;
    }
    assert_silent(&mut ws, Duration::from_millis(200)).await;

    send_ping_envelope(&mut ws, json!({ "msg": 12 })).await;
    assert_eq!(next_envelope(&mut ws).await, pong(""));

    send_ping_envelope(&mut ws, json!({ "msg": "still here" })).await;
    assert_eq!(next_envelope(&mut ws).await, pong("still here"));
}

#[tokio::test]
async fn oversized_frames_are_dropped() {
    let config = ServerConfig {
        transport: TransportSettings {
            max_payload_bytes: 128,
            ..TransportSettings::default()
        },
        ..ServerConfig::default()
    };
    let addr = spawn_server(config).await;
    let mut ws = connect(addr, "/ws").await;

    send_ping_envelope(&mut ws, json!({ "msg": "x".repeat(512) })).await;
    assert_silent(&mut ws, Duration::from_millis(200)).await;

    send_ping_envelope(&mut ws, json!({ "msg": "small" })).await;
    assert_eq!(next_envelope(&mut ws).await, pong("small"));
}
