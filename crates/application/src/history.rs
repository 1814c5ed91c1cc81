//! 有界消息历史。
//!
//! 按到达顺序保存最近的消息，超出容量时从头部逐出最旧的一条。
//! 撤回与反应都以消息的 timestamp 字符串为键寻址。

use domain::{ChatMessage, UserId};

pub struct HistoryStore {
    messages: Vec<ChatMessage>,
    capacity: usize,
}

impl HistoryStore {
    pub fn new(capacity: usize) -> Self {
        Self {
            messages: Vec::new(),
            capacity,
        }
    }

    /// 用一份已持久化的快照替换当前内容。
    /// 超出容量的快照只保留最近的 capacity 条。
    pub fn load(&mut self, mut messages: Vec<ChatMessage>) {
        if messages.len() > self.capacity {
            messages.drain(..messages.len() - self.capacity);
        }
        self.messages = messages;
    }

    /// 追加到尾部，超出容量时从头部逐出。
    pub fn append(&mut self, message: ChatMessage) {
        self.messages.push(message);
        while self.messages.len() > self.capacity {
            self.messages.remove(0);
        }
    }

    /// 按时间戳键移除第一条匹配的消息。目标不存在时静默返回 false。
    pub fn remove_by_key(&mut self, timestamp: &str) -> bool {
        match self.messages.iter().position(|m| m.timestamp == timestamp) {
            Some(index) => {
                self.messages.remove(index);
                true
            }
            None => false,
        }
    }

    /// 在目标消息上切换用户的反应。
    ///
    /// 返回是否找到了目标消息；目标不存在时是静默空操作。
    pub fn toggle_reaction(&mut self, target: &str, emoji: &str, user: &UserId) -> bool {
        match self.messages.iter_mut().find(|m| m.timestamp == target) {
            Some(message) => {
                message.toggle_reaction(emoji, user);
                true
            }
            None => false,
        }
    }

    /// 全量快照，用于重同步回复与持久化。
    pub fn snapshot(&self) -> Vec<ChatMessage> {
        self.messages.clone()
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}
