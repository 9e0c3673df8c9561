//! MessagePusher trait 定義
//!
//! クライアントへの送信手段の抽象化。WebSocket の生成は UI 層、
//! 送信チャンネルの管理と送信は Infrastructure 層が担当する。

use async_trait::async_trait;
use tokio::sync::mpsc;

use super::{MessagePushError, SessionId};

/// 1 接続分の送信チャンネル（エンコード済みテキストフレームを流す）
pub type PusherChannel = mpsc::UnboundedSender<String>;

#[async_trait]
pub trait MessagePusher: Send + Sync {
    /// 送信チャンネルを登録する
    async fn register_client(&self, session_id: SessionId, sender: PusherChannel);

    /// 送信チャンネルを破棄する。受信側（writer タスク）はこれで終了する
    async fn unregister_client(&self, session_id: &SessionId);

    /// 特定のクライアントに送信する
    async fn push_to(&self, session_id: &SessionId, content: &str)
    -> Result<(), MessagePushError>;

    /// 複数のクライアントに送信する。一部の失敗はログに残して続行する
    async fn broadcast(
        &self,
        targets: Vec<SessionId>,
        content: &str,
    ) -> Result<(), MessagePushError>;
}
