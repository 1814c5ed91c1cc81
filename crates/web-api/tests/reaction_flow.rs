mod support;

use std::time::Duration;

use futures_util::SinkExt;
use serde_json::json;
use tokio::{net::TcpListener, sync::oneshot, time::sleep};
use tokio_tungstenite::{connect_async, tungstenite::Message as TungsteniteMessage};

use support::{build_router, next_json, WsStream};

async fn send_frame(ws: &mut WsStream, frame: serde_json::Value) {
    ws.send(TungsteniteMessage::text(frame.to_string()))
        .await
        .expect("send frame");
}

#[tokio::test]
async fn reaction_toggle_resyncs_all_clients() {
    // 场景B：alice 点 👍，bob 点 👍，alice 取消。最终只剩 bob 的反应。
    let router = build_router().await;
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();

    tokio::spawn(async move {
        axum::serve(listener, router.into_make_service())
            .with_graceful_shutdown(async {
                let _ = shutdown_rx.await;
            })
            .await
            .ok();
    });

    sleep(Duration::from_millis(100)).await;

    let (mut alice, _) = connect_async(format!("ws://{}/ws", addr))
        .await
        .expect("alice connect");
    let _ = next_json(&mut alice).await;
    let _ = next_json(&mut alice).await;
    send_frame(
        &mut alice,
        json!({"type": "join", "sender": "alice", "timestamp": "2025-01-01T00:00:01.000Z"}),
    )
    .await;
    let _ = next_json(&mut alice).await;
    let _ = next_json(&mut alice).await;

    let (mut bob, _) = connect_async(format!("ws://{}/ws", addr))
        .await
        .expect("bob connect");
    let _ = next_json(&mut bob).await;
    let _ = next_json(&mut bob).await;
    send_frame(
        &mut bob,
        json!({"type": "join", "sender": "bob", "timestamp": "2025-01-01T00:00:02.000Z"}),
    )
    .await;
    let _ = next_json(&mut alice).await;
    let _ = next_json(&mut alice).await;
    let _ = next_json(&mut bob).await;
    let _ = next_json(&mut bob).await;

    // 目标消息，timestamp 是反应寻址用的键
    let target = "2025-01-01T00:00:03.000Z";
    send_frame(
        &mut alice,
        json!({
            "type": "text",
            "sender": "alice",
            "content": "react to me",
            "timestamp": target
        }),
    )
    .await;
    let _ = next_json(&mut alice).await;
    let _ = next_json(&mut alice).await;
    let _ = next_json(&mut bob).await;
    let _ = next_json(&mut bob).await;

    let reaction = |sender: &str, ts: &str| {
        json!({
            "type": "reaction",
            "sender": sender,
            "targetId": target,
            "emoji": "👍",
            "timestamp": ts
        })
    };
    send_frame(&mut alice, reaction("alice", "2025-01-01T00:00:04.000Z")).await;
    send_frame(&mut bob, reaction("bob", "2025-01-01T00:00:05.000Z")).await;
    send_frame(&mut alice, reaction("alice", "2025-01-01T00:00:06.000Z")).await;

    // 每次命中的反应扩散一帧在线快照和一帧全量历史重同步，
    // 反应帧本身从不被转发
    let mut last_history = None;
    for _ in 0..6 {
        let frame = next_json(&mut bob).await;
        assert_ne!(frame["type"], "reaction");
        if frame["type"] == "history" {
            last_history = Some(frame);
        }
    }

    let history = last_history.expect("history resync");
    let content = history["content"].as_array().unwrap();
    let message = content
        .iter()
        .find(|m| m["timestamp"] == target)
        .expect("target message");
    assert_eq!(
        message["reactions"],
        json!([{"emoji": "👍", "users": ["bob"]}])
    );

    let _ = shutdown_tx.send(());
}

#[tokio::test]
async fn reaction_on_vanished_target_changes_nothing() {
    let router = build_router().await;
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();

    tokio::spawn(async move {
        axum::serve(listener, router.into_make_service())
            .with_graceful_shutdown(async {
                let _ = shutdown_rx.await;
            })
            .await
            .ok();
    });

    sleep(Duration::from_millis(100)).await;

    let (mut ws, _) = connect_async(format!("ws://{}/ws", addr))
        .await
        .expect("ws connect");
    let _ = next_json(&mut ws).await;
    let _ = next_json(&mut ws).await;

    send_frame(
        &mut ws,
        json!({
            "type": "reaction",
            "sender": "alice",
            "targetId": "never-existed",
            "emoji": "👍",
            "timestamp": "2025-01-01T00:00:01.000Z"
        }),
    )
    .await;

    // 在线快照照常刷新，但没有历史重同步跟在后面
    let users = next_json(&mut ws).await;
    assert_eq!(users["type"], "onlineUsers");

    send_frame(&mut ws, json!({"type": "history_request"})).await;
    let history = next_json(&mut ws).await;
    assert_eq!(history["type"], "history");
    assert_eq!(history["content"].as_array().unwrap().len(), 0);

    let _ = shutdown_tx.send(());
}
