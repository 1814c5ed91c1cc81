use serde::{Deserialize, Serialize};

use crate::value_objects::UserId;

/// 消息种类。
///
/// reaction 不是一种消息：反应只作为目标消息上的聚合状态存在。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageKind {
    Text,
    File,
    System,
}

/// 文件消息的内容描述，与客户端上送的对象字段一一对应。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileBody {
    pub name: String,
    pub size: u64,
    #[serde(rename = "type")]
    pub mime: String,
    pub url: String,
}

/// 消息正文：文本/系统消息是字符串，文件消息是结构化对象。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MessageBody {
    Text(String),
    File(FileBody),
}

/// 单个 emoji 的反应聚合。
///
/// 不变量：users 非空。成员清空的瞬间整个条目必须被删除。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReactionEntry {
    pub emoji: String,
    pub users: Vec<UserId>,
}

/// 聊天消息。
///
/// timestamp 字符串是撤回与反应寻址使用的唯一键，系统不额外保证其唯一性。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    #[serde(rename = "type")]
    pub kind: MessageKind,
    pub sender: UserId,
    pub content: MessageBody,
    #[serde(
        rename = "mentionedUsers",
        default,
        skip_serializing_if = "Vec::is_empty"
    )]
    pub mentioned_users: Vec<UserId>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub reactions: Vec<ReactionEntry>,
    pub timestamp: String,
}

impl ChatMessage {
    pub fn text(
        sender: UserId,
        content: impl Into<String>,
        mentioned_users: Vec<UserId>,
        timestamp: impl Into<String>,
    ) -> Self {
        Self {
            kind: MessageKind::Text,
            sender,
            content: MessageBody::Text(content.into()),
            mentioned_users,
            reactions: Vec::new(),
            timestamp: timestamp.into(),
        }
    }

    pub fn file(sender: UserId, body: FileBody, timestamp: impl Into<String>) -> Self {
        Self {
            kind: MessageKind::File,
            sender,
            content: MessageBody::File(body),
            mentioned_users: Vec::new(),
            reactions: Vec::new(),
            timestamp: timestamp.into(),
        }
    }

    pub fn system(
        sender: UserId,
        content: impl Into<String>,
        timestamp: impl Into<String>,
    ) -> Self {
        Self {
            kind: MessageKind::System,
            sender,
            content: MessageBody::Text(content.into()),
            mentioned_users: Vec::new(),
            reactions: Vec::new(),
            timestamp: timestamp.into(),
        }
    }

    /// 切换某个用户对某个 emoji 的反应。
    ///
    /// 不存在该 emoji 的条目则新建并以该用户为唯一成员；
    /// 用户已是成员则移除，成员清空时删除整个条目；否则追加成员。
    pub fn toggle_reaction(&mut self, emoji: &str, user: &UserId) {
        match self.reactions.iter().position(|r| r.emoji == emoji) {
            Some(index) => {
                let entry = &mut self.reactions[index];
                if let Some(user_index) = entry.users.iter().position(|u| u == user) {
                    entry.users.remove(user_index);
                    if entry.users.is_empty() {
                        self.reactions.remove(index);
                    }
                } else {
                    entry.users.push(user.clone());
                }
            }
            None => {
                self.reactions.push(ReactionEntry {
                    emoji: emoji.to_string(),
                    users: vec![user.clone()],
                });
            }
        }
    }
}
