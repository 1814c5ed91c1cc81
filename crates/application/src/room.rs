//! 房间核心。
//!
//! 显式持有的共享状态上下文：有界历史、在线状态、连接到身份的绑定，
//! 都在一把异步互斥锁之后，由单一串行路径完成变更。每个入站帧
//! （包括其后的持久化写入）处理完毕后，下一个帧的变更才会开始。
//!
//! 广播采用"序列化一次"的扇出：载荷先序列化为 JSON 字符串，再经
//! tokio broadcast 通道送达每个连接任务；已关闭的连接被静默跳过。

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{broadcast, Mutex};
use uuid::Uuid;

use domain::{ChatMessage, ClientFrame, ServerFrame, UserId};

use crate::clock::Clock;
use crate::errors::ApplicationResult;
use crate::history::HistoryStore;
use crate::mentions::validate_mentions;
use crate::presence::PresenceTracker;
use crate::storage::SnapshotStore;

/// 连接的临时句柄。
pub type ConnectionId = Uuid;

/// RoomCore 的构造依赖。
pub struct RoomCoreDependencies {
    pub storage: Arc<dyn SnapshotStore>,
    pub clock: Arc<dyn Clock>,
    pub history_capacity: usize,
    pub broadcast_capacity: usize,
}

struct RoomState {
    history: HistoryStore,
    presence: PresenceTracker,
    bindings: HashMap<ConnectionId, UserId>,
}

pub struct RoomCore {
    state: Mutex<RoomState>,
    storage: Arc<dyn SnapshotStore>,
    clock: Arc<dyn Clock>,
    broadcast_tx: broadcast::Sender<String>,
}

impl RoomCore {
    pub fn new(deps: RoomCoreDependencies) -> Self {
        let (broadcast_tx, _) = broadcast::channel(deps.broadcast_capacity);
        Self {
            state: Mutex::new(RoomState {
                history: HistoryStore::new(deps.history_capacity),
                presence: PresenceTracker::new(),
                bindings: HashMap::new(),
            }),
            storage: deps.storage,
            clock: deps.clock,
            broadcast_tx,
        }
    }

    /// 从快照存储恢复历史。超出容量的快照只保留最近的部分。
    pub async fn restore(&self) -> ApplicationResult<usize> {
        let messages = self.storage.load().await?;
        let mut state = self.state.lock().await;
        state.history.load(messages);
        let count = state.history.len();
        tracing::info!(count, "聊天记录已恢复");
        Ok(count)
    }

    /// 注册一个新打开的连接。
    ///
    /// 返回连接句柄、广播接收端，以及无条件下发的欢迎载荷
    /// （全量历史 + 当前在线用户快照）。在状态锁内订阅，
    /// 保证快照与后续广播之间不丢不重。
    pub async fn connect(&self) -> (ConnectionId, broadcast::Receiver<String>, Vec<String>) {
        let state = self.state.lock().await;
        let receiver = self.broadcast_tx.subscribe();
        let connection_id = Uuid::new_v4();

        let mut welcome = Vec::new();
        if let Some(payload) = serialize(&ServerFrame::History {
            content: state.history.snapshot(),
        }) {
            welcome.push(payload);
        }
        if let Some(payload) = serialize(&self.presence_frame(&state)) {
            welcome.push(payload);
        }

        tracing::info!(connection_id = %connection_id, "新客户端连接");
        (connection_id, receiver, welcome)
    }

    /// 处理一个入站文本帧，返回需要直接回给发送连接的载荷（如有）。
    ///
    /// 无法解析的帧被丢弃并记录，连接保持打开，不回发错误。
    pub async fn handle_frame(&self, connection_id: ConnectionId, raw: &str) -> Option<String> {
        let frame = match serde_json::from_str::<ClientFrame>(raw) {
            Ok(frame) => frame,
            Err(err) => {
                tracing::warn!(connection_id = %connection_id, error = %err, "消息处理错误，丢弃该帧");
                return None;
            }
        };

        match frame {
            ClientFrame::Ping { timestamp } => serialize(&ServerFrame::Pong { timestamp }),
            ClientFrame::HistoryRequest => {
                let state = self.state.lock().await;
                serialize(&ServerFrame::History {
                    content: state.history.snapshot(),
                })
            }
            ClientFrame::Join { sender, timestamp } => {
                self.handle_join(connection_id, sender, timestamp).await;
                None
            }
            ClientFrame::Text {
                sender,
                content,
                mentioned_users,
                timestamp,
            } => {
                let mut state = self.state.lock().await;
                let validated =
                    validate_mentions(&mentioned_users, &content, &sender, &state.presence);
                state.presence.upsert(sender.clone(), &timestamp);
                self.broadcast_presence(&state);

                let message = ChatMessage::text(sender, content, validated, timestamp);
                self.append_and_relay(&mut state, message).await;
                None
            }
            ClientFrame::File {
                sender,
                content,
                timestamp,
            } => {
                let mut state = self.state.lock().await;
                state.presence.upsert(sender.clone(), &timestamp);
                self.broadcast_presence(&state);

                let message = ChatMessage::file(sender, content, timestamp);
                self.append_and_relay(&mut state, message).await;
                None
            }
            ClientFrame::System {
                sender,
                content,
                timestamp,
            } => {
                let mut state = self.state.lock().await;
                state.presence.upsert(sender.clone(), &timestamp);
                self.broadcast_presence(&state);

                let message = ChatMessage::system(sender, content, timestamp);
                self.append_and_relay(&mut state, message).await;
                None
            }
            ClientFrame::Recall { ref recall_id, .. } => {
                // 撤回不刷新在线状态
                let mut state = self.state.lock().await;
                if state.history.remove_by_key(recall_id) {
                    self.persist(&state).await;
                }
                if let Some(payload) = serialize(&frame) {
                    self.broadcast(payload);
                }
                None
            }
            ClientFrame::Reaction {
                sender,
                target_id,
                emoji,
                timestamp,
            } => {
                let mut state = self.state.lock().await;
                let applied = state.history.toggle_reaction(&target_id, &emoji, &sender);
                state.presence.upsert(sender, &timestamp);
                self.broadcast_presence(&state);

                // 反应通过全量历史重同步扩散，而不是转发单条反应帧
                if applied {
                    self.persist(&state).await;
                    if let Some(payload) = serialize(&ServerFrame::History {
                        content: state.history.snapshot(),
                    }) {
                        self.broadcast(payload);
                    }
                }
                None
            }
        }
    }

    /// 连接关闭（正常关闭与传输错误走同一条清理路径）。
    ///
    /// 若连接已绑定身份：合成"退出了聊天室"系统消息并追加、持久化、
    /// 广播，然后移除在线状态并广播新的在线用户快照。
    pub async fn disconnect(&self, connection_id: ConnectionId) {
        let mut state = self.state.lock().await;
        let Some(user) = state.bindings.remove(&connection_id) else {
            tracing::info!(connection_id = %connection_id, "客户端断开连接");
            return;
        };

        let message = ChatMessage::system(
            user.clone(),
            format!("{user} 退出了聊天室"),
            self.clock.now_wire(),
        );
        self.append_and_relay(&mut state, message).await;

        state.presence.remove(&user);
        self.broadcast_presence(&state);
        tracing::info!(connection_id = %connection_id, user_id = %user, "客户端断开连接，在线状态已清理");
    }

    /// 查询连接当前绑定的身份。
    pub async fn identity_of(&self, connection_id: ConnectionId) -> Option<UserId> {
        self.state.lock().await.bindings.get(&connection_id).cloned()
    }

    /// 当前历史快照（优雅停机时的最终落盘也走这里）。
    pub async fn snapshot(&self) -> Vec<ChatMessage> {
        self.state.lock().await.history.snapshot()
    }

    /// 把当前历史整体写入快照存储。
    pub async fn persist_now(&self) {
        let state = self.state.lock().await;
        self.persist(&state).await;
    }

    async fn handle_join(&self, connection_id: ConnectionId, sender: UserId, timestamp: String) {
        let mut state = self.state.lock().await;

        // 先到先得：已绑定的连接忽略后续 join 的身份
        if !state.bindings.contains_key(&connection_id) {
            state.bindings.insert(connection_id, sender.clone());
        }

        state.presence.upsert(sender.clone(), &timestamp);
        self.broadcast_presence(&state);

        let message = ChatMessage::system(
            sender.clone(),
            format!("{sender} 加入了聊天室"),
            timestamp,
        );
        self.append_and_relay(&mut state, message).await;
    }

    /// 追加到历史、写穿持久化、再把消息本身广播出去。
    async fn append_and_relay(&self, state: &mut RoomState, message: ChatMessage) {
        state.history.append(message.clone());
        self.persist(state).await;
        if let Some(payload) = serialize(&message) {
            self.broadcast(payload);
        }
    }

    /// 每次变更后的写穿。写失败时记录错误并丢弃本次写入；
    /// 内存状态仍是权威，下一次整体重写会恢复持久层。
    async fn persist(&self, state: &RoomState) {
        if let Err(err) = self.storage.save(state.history.messages()).await {
            tracing::error!(error = %err, "保存聊天记录失败，本次写入被丢弃");
        }
    }

    fn presence_frame(&self, state: &RoomState) -> ServerFrame {
        let users = state.presence.snapshot();
        ServerFrame::OnlineUsers {
            count: users.len(),
            users,
            timestamp: self.clock.now_wire(),
        }
    }

    fn broadcast_presence(&self, state: &RoomState) {
        if let Some(payload) = serialize(&self.presence_frame(state)) {
            self.broadcast(payload);
        }
    }

    fn broadcast(&self, payload: String) {
        // 没有任何接收端时发送会失败，等价于"跳过所有非 OPEN 连接"
        let _ = self.broadcast_tx.send(payload);
    }
}

fn serialize<T: serde::Serialize>(value: &T) -> Option<String> {
    match serde_json::to_string(value) {
        Ok(json) => Some(json),
        Err(err) => {
            tracing::warn!(error = %err, "failed to serialize websocket payload");
            None
        }
    }
}
