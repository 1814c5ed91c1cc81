use std::fmt;

use serde::{Deserialize, Serialize};

use crate::errors::DomainError;

/// 用户标识。
///
/// 参与者加入时自选的字符串句柄，没有注册过程，也不保证全局唯一。
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
    pub fn parse(value: impl Into<String>) -> Result<Self, DomainError> {
        let value = value.into().trim().to_owned();
        if value.is_empty() {
            return Err(DomainError::invalid_argument("user_id", "cannot be empty"));
        }
        if value.len() > 50 {
            return Err(DomainError::invalid_argument("user_id", "too long"));
        }
        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
