//! 统一配置中心
//!
//! 提供应用的全局配置管理，包括：
//! - 服务监听地址
//! - 历史记录容量与快照文件
//! - 广播通道容量

use serde::{Deserialize, Serialize};
use std::env;

/// 全局应用配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// 服务配置
    pub server: ServerConfig,
    /// 历史记录配置
    pub history: HistoryConfig,
    /// 广播器配置
    pub broadcast: BroadcastConfig,
}

/// 服务器配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

/// 历史记录配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryConfig {
    /// 保留的最大消息条数
    pub capacity: usize,
    /// 快照文件路径
    pub snapshot_path: String,
}

/// 广播器配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BroadcastConfig {
    pub capacity: usize,
}

impl AppConfig {
    /// 从环境变量加载配置
    /// 对于关键配置（HISTORY_SNAPSHOT_PATH），如果环境变量不存在将会 panic
    /// 这确保了生产环境中不会把聊天记录写到意料之外的位置
    pub fn from_env() -> Self {
        Self {
            server: ServerConfig {
                host: env::var("SERVER_HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
                port: env::var("SERVER_PORT")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(3000),
            },
            history: HistoryConfig {
                capacity: env::var("HISTORY_CAPACITY")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(100),
                snapshot_path: env::var("HISTORY_SNAPSHOT_PATH")
                    .expect("HISTORY_SNAPSHOT_PATH environment variable is required for production safety"),
            },
            broadcast: BroadcastConfig {
                capacity: env::var("BROADCAST_CAPACITY")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(256),
            },
        }
    }

    /// 从环境变量加载配置，开发环境版本
    /// 提供默认快照路径，仅用于测试和开发
    pub fn from_env_with_defaults() -> Self {
        Self {
            server: ServerConfig {
                host: env::var("SERVER_HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
                port: env::var("SERVER_PORT")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(3000),
            },
            history: HistoryConfig {
                capacity: env::var("HISTORY_CAPACITY")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(100),
                snapshot_path: env::var("HISTORY_SNAPSHOT_PATH")
                    .unwrap_or_else(|_| "chat_history.json".to_string()),
            },
            broadcast: BroadcastConfig {
                capacity: env::var("BROADCAST_CAPACITY")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(256),
            },
        }
    }

    /// 验证配置有效性
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.history.capacity == 0 {
            return Err(ConfigError::InvalidHistoryConfig(
                "history capacity must be greater than 0".to_string(),
            ));
        }

        if self.history.snapshot_path.trim().is_empty() {
            return Err(ConfigError::InvalidHistoryConfig(
                "snapshot path cannot be empty".to_string(),
            ));
        }

        if self.broadcast.capacity == 0 {
            return Err(ConfigError::InvalidBroadcastConfig(
                "broadcast capacity must be greater than 0".to_string(),
            ));
        }

        if self.server.host.trim().is_empty() {
            return Err(ConfigError::InvalidServerConfig(
                "server host cannot be empty".to_string(),
            ));
        }

        Ok(())
    }
}

/// 配置错误类型
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid server configuration: {0}")]
    InvalidServerConfig(String),
    #[error("Invalid history configuration: {0}")]
    InvalidHistoryConfig(String),
    #[error("Invalid broadcast configuration: {0}")]
    InvalidBroadcastConfig(String),
    #[error("Environment variable error: {0}")]
    EnvVarError(#[from] std::env::VarError),
}

impl Default for AppConfig {
    /// 默认配置使用开发环境版本
    /// 注意：生产环境应该明确调用 from_env() 而不是依赖默认值
    fn default() -> Self {
        Self::from_env_with_defaults()
    }
}
