//! HTTP API のレスポンス DTO

use serde::{Deserialize, Serialize};

/// `GET /api/rooms` の要素
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomSummaryDto {
    pub name: String,
    pub size: usize,
    /// JST の RFC 3339 文字列
    pub created_at: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageDto {
    pub author: String,
    pub message: String,
    pub sent_at: String,
}

/// `GET /api/rooms/{name}` のレスポンス
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomDetailDto {
    pub name: String,
    pub size: usize,
    pub created_at: String,
    pub recent_messages: Vec<MessageDto>,
}
