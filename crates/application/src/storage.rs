//! 历史快照存储抽象。
//!
//! 每次变更后整体重写一份保留消息的 JSON 数组，没有增量日志。
//! 具体介质由基础设施层实现。

use async_trait::async_trait;
use domain::ChatMessage;
use thiserror::Error;

/// 快照存储错误类型
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("快照读取失败: {0}")]
    Load(String),

    #[error("快照写入失败: {0}")]
    Save(String),

    #[error("快照数据损坏: {0}")]
    Corrupt(String),
}

impl StorageError {
    pub fn load(message: impl Into<String>) -> Self {
        Self::Load(message.into())
    }

    pub fn save(message: impl Into<String>) -> Self {
        Self::Save(message.into())
    }

    pub fn corrupt(message: impl Into<String>) -> Self {
        Self::Corrupt(message.into())
    }
}

/// 全量快照读写。
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait SnapshotStore: Send + Sync {
    /// 读取上次持久化的全部消息。介质中尚无快照时返回空序列。
    async fn load(&self) -> Result<Vec<ChatMessage>, StorageError>;

    /// 整体重写快照。
    async fn save(&self, messages: &[ChatMessage]) -> Result<(), StorageError>;
}

/// 内存实现的快照存储（用于测试）
pub mod memory {
    use super::*;
    use tokio::sync::RwLock;

    #[derive(Default)]
    pub struct MemorySnapshotStore {
        messages: RwLock<Vec<ChatMessage>>,
    }

    impl MemorySnapshotStore {
        pub fn new() -> Self {
            Self::default()
        }

        pub async fn stored(&self) -> Vec<ChatMessage> {
            self.messages.read().await.clone()
        }
    }

    #[async_trait]
    impl SnapshotStore for MemorySnapshotStore {
        async fn load(&self) -> Result<Vec<ChatMessage>, StorageError> {
            Ok(self.messages.read().await.clone())
        }

        async fn save(&self, messages: &[ChatMessage]) -> Result<(), StorageError> {
            *self.messages.write().await = messages.to_vec();
            Ok(())
        }
    }
}
