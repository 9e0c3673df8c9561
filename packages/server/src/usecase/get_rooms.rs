//! UseCase: ルーム情報の参照（HTTP API 用）

use std::sync::Arc;

use thiserror::Error;

use crate::domain::{ChatroomRegistry, Chatroom, RoomName, RoomSummary};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum GetRoomDetailError {
    #[error("room not found: {0}")]
    RoomNotFound(String),
}

/// ルーム一覧取得のユースケース
pub struct GetRoomsUseCase {
    registry: Arc<dyn ChatroomRegistry>,
}

impl GetRoomsUseCase {
    pub fn new(registry: Arc<dyn ChatroomRegistry>) -> Self {
        Self { registry }
    }

    pub async fn execute(&self) -> Vec<RoomSummary> {
        self.registry.list_rooms().await
    }
}

/// ルーム詳細取得のユースケース
pub struct GetRoomDetailUseCase {
    registry: Arc<dyn ChatroomRegistry>,
}

impl GetRoomDetailUseCase {
    pub fn new(registry: Arc<dyn ChatroomRegistry>) -> Self {
        Self { registry }
    }

    pub async fn execute(&self, name: String) -> Result<Chatroom, GetRoomDetailError> {
        let not_found = || GetRoomDetailError::RoomNotFound(name.clone());
        let room_name = RoomName::new(name.as_str()).map_err(|_| not_found())?;
        self.registry
            .find_room(&room_name)
            .await
            .ok_or_else(not_found)
    }
}
