//! 基于文件的历史快照存储。
//!
//! 持久层布局：单个 JSON 文件，内容是保留消息的数组，
//! 每次变更整体重写（带缩进，便于人工检视），没有增量追加日志。

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;

use application::storage::{SnapshotStore, StorageError};
use domain::ChatMessage;

pub struct FileSnapshotStore {
    path: PathBuf,
}

impl FileSnapshotStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl SnapshotStore for FileSnapshotStore {
    /// 读取快照文件。文件尚不存在等价于空历史。
    async fn load(&self) -> Result<Vec<ChatMessage>, StorageError> {
        let data = match fs::read(&self.path).await {
            Ok(data) => data,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(err) => return Err(StorageError::load(err.to_string())),
        };

        serde_json::from_slice(&data).map_err(|err| StorageError::corrupt(err.to_string()))
    }

    /// 整体重写快照文件。
    async fn save(&self, messages: &[ChatMessage]) -> Result<(), StorageError> {
        let data = serde_json::to_vec_pretty(messages)
            .map_err(|err| StorageError::save(err.to_string()))?;
        fs::write(&self.path, data)
            .await
            .map_err(|err| StorageError::save(err.to_string()))
    }
}
