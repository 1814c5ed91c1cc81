use std::sync::Arc;

use axum::Router;
use futures_util::StreamExt;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};

use application::storage::memory::MemorySnapshotStore;
use application::{RoomCore, RoomCoreDependencies, SystemClock};
use web_api::{router, AppState};

pub type WsStream = WebSocketStream<MaybeTlsStream<tokio::net::TcpStream>>;

/// 使用内存快照存储构建一个独立的路由实例
pub async fn build_router() -> Router {
    let config = config::AppConfig::from_env_with_defaults();
    let core = Arc::new(RoomCore::new(RoomCoreDependencies {
        storage: Arc::new(MemorySnapshotStore::new()),
        clock: Arc::new(SystemClock),
        history_capacity: config.history.capacity,
        broadcast_capacity: config.broadcast.capacity,
    }));
    router(AppState::new(core))
}

/// 读取下一个文本帧并解析为 JSON
pub async fn next_json(ws: &mut WsStream) -> serde_json::Value {
    loop {
        let msg = ws.next().await.expect("ws message").expect("ws frame");
        if let tokio_tungstenite::tungstenite::Message::Text(payload) = msg {
            return serde_json::from_str(&payload).expect("json");
        }
    }
}
