//! ドメイン層のエラー定義

use thiserror::Error;

/// 値オブジェクトの生成エラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValueObjectError {
    #[error("invalid username: '{0}'")]
    InvalidUsername(String),

    #[error("room name must not be empty")]
    EmptyRoomName,

    #[error("message text must not be empty")]
    EmptyMessage,
}

/// ChatroomRegistry の操作エラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("session not found: {0}")]
    SessionNotFound(String),

    #[error("username already taken: {0}")]
    UsernameTaken(String),

    #[error("room not found: {0}")]
    RoomNotFound(String),

    #[error("session is not a member of any room")]
    NotInRoom,

    #[error("operation not allowed in state {0}")]
    InvalidState(&'static str),
}

/// MessagePusher の送信エラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MessagePushError {
    #[error("client not found: {0}")]
    ClientNotFound(String),

    #[error("failed to push message: {0}")]
    PushFailed(String),
}

/// トレンド取得のエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TrendSourceError {
    #[error("trends source unavailable: {0}")]
    RemoteUnavailable(String),
}
