use axum::extract::ws::{Message as WsMessage, WebSocket};
use futures_util::{SinkExt, StreamExt};
use tokio::sync::{broadcast, mpsc};

use application::{ConnectionId, RoomCore};
use std::sync::Arc;

use crate::state::AppState;

/// WebSocket 连接管理器
///
/// 封装单个 WebSocket 连接的生命周期：
/// - 注册到房间核心并下发欢迎载荷（全量历史 + 在线用户快照）
/// - 入站帧转交核心处理，直接回复经命令通道写回
/// - 广播消息转发
/// - 正常关闭与传输错误走同一条清理路径
pub struct WebSocketConnection {
    socket: Option<WebSocket>,
    state: AppState,
}

impl WebSocketConnection {
    pub fn new(socket: WebSocket, state: AppState) -> Self {
        Self {
            socket: Some(socket),
            state,
        }
    }

    /// 运行 WebSocket 连接的主循环。
    pub async fn run(mut self) {
        let socket = self.socket.take().expect("Socket should be available");
        let core = self.state.core.clone();

        let (connection_id, mut broadcast_rx, welcome) = core.connect().await;
        let (mut sender, mut incoming) = socket.split();

        // 新连接无条件先收到历史快照与在线用户快照
        for payload in welcome {
            if sender.send(WsMessage::Text(payload.into())).await.is_err() {
                core.disconnect(connection_id).await;
                return;
            }
        }

        // 创建 mpsc channel 来解耦对 sender 的访问
        let (cmd_tx, mut cmd_rx) = mpsc::channel::<WsCommand>(32);

        // 发送任务：统一处理所有对 WebSocket sender 的写操作
        let send_task = tokio::spawn(async move {
            loop {
                tokio::select! {
                    cmd = cmd_rx.recv() => {
                        match cmd {
                            Some(WsCommand::SendText(text)) => {
                                if sender.send(WsMessage::Text(text.into())).await.is_err() {
                                    break;
                                }
                            }
                            Some(WsCommand::SendPong(data)) => {
                                if sender.send(WsMessage::Pong(data.into())).await.is_err() {
                                    break;
                                }
                            }
                            None => break,
                        }
                    }
                    result = broadcast_rx.recv() => {
                        match result {
                            Ok(payload) => {
                                if sender.send(WsMessage::Text(payload.into())).await.is_err() {
                                    break;
                                }
                            }
                            Err(broadcast::error::RecvError::Lagged(skipped)) => {
                                // 尽力而为的投递：滞后的接收端丢弃被挤出的消息
                                tracing::warn!(skipped, "广播接收滞后");
                            }
                            Err(broadcast::error::RecvError::Closed) => break,
                        }
                    }
                }
            }
            tracing::debug!("WebSocket发送任务结束");
        });

        // 接收任务：处理来自WebSocket客户端的消息
        let recv_core: Arc<RoomCore> = core.clone();
        let recv_task = tokio::spawn(async move {
            while let Some(result) = incoming.next().await {
                let message = match result {
                    Ok(message) => message,
                    Err(err) => {
                        tracing::warn!(error = %err, "WebSocket错误");
                        break;
                    }
                };
                if Self::handle_incoming(&recv_core, connection_id, message, &cmd_tx)
                    .await
                    .is_err()
                {
                    break;
                }
            }
            tracing::debug!("WebSocket接收任务结束");
        });

        // 等待任意一个任务完成（连接断开）
        tokio::select! {
            _ = send_task => {}
            _ = recv_task => {}
        }

        // 关闭与错误共用的清理路径：解绑身份、广播离开消息与在线快照
        core.disconnect(connection_id).await;
    }

    async fn handle_incoming(
        core: &RoomCore,
        connection_id: ConnectionId,
        message: WsMessage,
        cmd_tx: &mpsc::Sender<WsCommand>,
    ) -> Result<(), ()> {
        match message {
            WsMessage::Text(text) => {
                if let Some(reply) = core.handle_frame(connection_id, text.as_str()).await {
                    if cmd_tx.send(WsCommand::SendText(reply)).await.is_err() {
                        return Err(());
                    }
                }
            }
            WsMessage::Ping(data) => {
                if cmd_tx.send(WsCommand::SendPong(data.to_vec())).await.is_err() {
                    return Err(());
                }
            }
            WsMessage::Pong(_) => {}
            WsMessage::Binary(_) => {
                tracing::debug!("收到二进制消息（不支持）");
            }
            WsMessage::Close(_) => return Err(()),
        }
        Ok(())
    }
}

/// WebSocket 写操作命令
#[derive(Debug)]
enum WsCommand {
    SendText(String),
    SendPong(Vec<u8>),
}
