//! UseCase: 接続処理
//!
//! 新しい接続を AwaitingIdentity のセッションとして Registry に登録し、
//! 送信チャンネルを MessagePusher に登録する。この時点ではまだ何も送らない
//! （クライアントが IdentityRequest を送るのを待つ）。

use std::sync::Arc;

use hottopics_shared::time::Clock;

use crate::domain::{
    ChatroomRegistry, MessagePusher, PusherChannel, Session, SessionId, Timestamp,
};

/// 接続のユースケース
pub struct ConnectSessionUseCase {
    registry: Arc<dyn ChatroomRegistry>,
    message_pusher: Arc<dyn MessagePusher>,
    clock: Arc<dyn Clock>,
}

impl ConnectSessionUseCase {
    pub fn new(
        registry: Arc<dyn ChatroomRegistry>,
        message_pusher: Arc<dyn MessagePusher>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            registry,
            message_pusher,
            clock,
        }
    }

    /// 接続を登録する
    ///
    /// # Arguments
    ///
    /// * `session_id` - 接続に払い出した ID
    /// * `sender` - クライアントへのメッセージ送信用チャンネル
    pub async fn execute(&self, session_id: SessionId, sender: PusherChannel) -> Session {
        let now = Timestamp::new(self.clock.now_millis());
        let session = self.registry.add_session(session_id, now).await;
        self.message_pusher.register_client(session_id, sender).await;
        session
    }
}
