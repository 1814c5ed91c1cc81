//! 领域模型层。
//!
//! 定义聊天消息、反应、在线用户等核心实体，以及客户端/服务端的
//! 线路协议帧。不依赖任何传输或存储细节。

pub mod errors;
pub mod message;
pub mod presence;
pub mod protocol;
pub mod value_objects;

pub use errors::{DomainError, DomainResult};
pub use message::{ChatMessage, FileBody, MessageBody, MessageKind, ReactionEntry};
pub use presence::OnlineUser;
pub use protocol::{ClientFrame, ServerFrame};
pub use value_objects::UserId;
