use std::sync::Arc;

use application::RoomCore;

#[derive(Clone)]
pub struct AppState {
    pub core: Arc<RoomCore>,
}

impl AppState {
    pub fn new(core: Arc<RoomCore>) -> Self {
        Self { core }
    }
}
