use serde::{Deserialize, Serialize};

use crate::value_objects::UserId;

/// 在线用户记录。
///
/// lastActive 由该用户最近一条非撤回消息的时间戳刷新。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OnlineUser {
    #[serde(rename = "userId")]
    pub user_id: UserId,
    #[serde(rename = "lastActive")]
    pub last_active: String,
}
