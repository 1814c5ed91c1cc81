//! 线路协议帧定义。
//!
//! 每个 WebSocket 文本帧承载一个 JSON 对象，`type` 字段选择变体。
//! 无法识别的 `type` 在反序列化时直接失败，由调用方丢弃并记录。

use serde::{Deserialize, Serialize};

use crate::message::{ChatMessage, FileBody};
use crate::presence::OnlineUser;
use crate::value_objects::UserId;

/// 客户端上行帧。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientFrame {
    /// 加入聊天室。携带结构化的身份字段，不再从系统消息文本中推断。
    Join { sender: UserId, timestamp: String },
    /// 文本消息。mentionedUsers 为发送方声称的提及列表，服务端重新校验。
    Text {
        sender: UserId,
        content: String,
        #[serde(rename = "mentionedUsers", default)]
        mentioned_users: Vec<UserId>,
        timestamp: String,
    },
    /// 文件消息。
    File {
        sender: UserId,
        content: FileBody,
        timestamp: String,
    },
    /// 客户端上送的系统消息，原样转发。
    System {
        sender: UserId,
        content: String,
        timestamp: String,
    },
    /// 撤回消息，recallId 为目标消息的时间戳键。
    Recall {
        sender: UserId,
        #[serde(rename = "recallId")]
        recall_id: String,
        timestamp: String,
    },
    /// 反应切换，targetId 为目标消息的时间戳键。
    Reaction {
        sender: UserId,
        #[serde(rename = "targetId")]
        target_id: String,
        emoji: String,
        timestamp: String,
    },
    /// 延迟探测。服务端原样回显 timestamp。
    Ping { timestamp: String },
    /// 请求全量历史。
    HistoryRequest,
}

/// 服务端下行帧。
///
/// 聊天消息本身直接以 [`ChatMessage`] 的形状广播，不包在此枚举中。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ServerFrame {
    /// ping 的回显。
    Pong { timestamp: String },
    /// 全量历史快照。
    History { content: Vec<ChatMessage> },
    /// 在线用户快照。
    OnlineUsers {
        count: usize,
        users: Vec<OnlineUser>,
        timestamp: String,
    },
}
