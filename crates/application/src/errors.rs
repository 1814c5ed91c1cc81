//! 应用层错误定义

use domain::DomainError;
use thiserror::Error;

use crate::storage::StorageError;

/// 应用层错误类型
#[derive(Debug, Error)]
pub enum ApplicationError {
    /// 领域层错误
    #[error("领域错误: {0}")]
    Domain(#[from] DomainError),

    /// 快照存储错误
    #[error("存储错误: {0}")]
    Storage(#[from] StorageError),
}

/// 应用层结果类型
pub type ApplicationResult<T> = Result<T, ApplicationError>;
