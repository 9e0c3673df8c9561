//! UseCase 層のエラー定義

use hottopics_shared::protocol::{CodecError, PacketKind};
use thiserror::Error;

/// 受信メッセージ処理のエラー
///
/// どれもセッション単位で完結し、接続は維持される（クライアントには何も返さない）。
#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("failed to decode frame: {0}")]
    Decode(#[from] CodecError),

    #[error("{kind} is not accepted in state {state}")]
    StateViolation {
        state: &'static str,
        kind: PacketKind,
    },

    #[error("session not found: {0}")]
    SessionNotFound(String),
}

/// ルーム更新サイクルのエラー
#[derive(Debug, Error)]
pub enum ReconcileError {
    #[error("trends unavailable: {0}")]
    RemoteUnavailable(String),
}
