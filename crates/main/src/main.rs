//! 主应用程序入口
//!
//! 启动 Axum Web API 服务，并在优雅停机时把聊天记录落盘。

use std::sync::Arc;

use application::{RoomCore, RoomCoreDependencies, SystemClock};
use config::AppConfig;
use infrastructure::FileSnapshotStore;
use tracing_subscriber::EnvFilter;
use web_api::{router, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 初始化日志
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    // 读取环境变量配置
    let config = AppConfig::from_env_with_defaults();
    config.validate()?;

    tracing::info!(path = %config.history.snapshot_path, "使用历史快照文件");

    // 组装房间核心：快照存储 + 系统时钟
    let storage = Arc::new(FileSnapshotStore::new(&config.history.snapshot_path));
    let core = Arc::new(RoomCore::new(RoomCoreDependencies {
        storage,
        clock: Arc::new(SystemClock),
        history_capacity: config.history.capacity,
        broadcast_capacity: config.broadcast.capacity,
    }));

    // 加载历史记录；快照缺失或损坏不阻止启动
    if let Err(err) = core.restore().await {
        tracing::error!(error = %err, "加载聊天记录失败");
    }

    // 启动 Web 服务器
    let state = AppState::new(core.clone());
    let app = router(state);
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("聊天室服务器启动在 http://{addr}");
    tracing::info!("WebSocket服务运行在 ws://{addr}/ws");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // 进程终止前再保存一次聊天记录
    core.persist_now().await;
    tracing::info!("服务器已关闭，聊天记录已保存");

    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "无法监听停机信号");
    }
}
