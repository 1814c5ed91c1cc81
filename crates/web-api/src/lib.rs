//! Web API 层。
//!
//! 提供 Axum 路由，把 WebSocket 连接接到应用层的房间核心上。

mod routes;
mod state;
mod ws_connection;

pub use routes::router;
pub use state::AppState;
