//! UseCase: 切断処理
//!
//! 通信路からの切断通知と、死活監視による強制切断の両方がここを通る。
//! 何度呼ばれても安全（2 回目以降は何もしない）。

use std::sync::Arc;

use crate::domain::{ChatroomRegistry, MessagePusher, RemovedSession, SessionId};

use super::Notifier;

/// 切断のユースケース
pub struct DisconnectSessionUseCase {
    registry: Arc<dyn ChatroomRegistry>,
    message_pusher: Arc<dyn MessagePusher>,
    notifier: Arc<Notifier>,
}

impl DisconnectSessionUseCase {
    pub fn new(
        registry: Arc<dyn ChatroomRegistry>,
        message_pusher: Arc<dyn MessagePusher>,
        notifier: Arc<Notifier>,
    ) -> Self {
        Self {
            registry,
            message_pusher,
            notifier,
        }
    }

    /// 切断を実行
    ///
    /// セッションを Registry から削除し、ルーム参加中だった場合は残りのメンバーに
    /// 人数を、Browsing のセッションにルーム一覧を送る。最後に送信チャンネルを
    /// 破棄してソケットの writer を終了させる。
    ///
    /// # Returns
    ///
    /// * `Some(RemovedSession)` - 今回の呼び出しで削除した
    /// * `None` - 既に削除済み
    pub async fn execute(&self, session_id: &SessionId) -> Option<RemovedSession> {
        let removed = self.registry.remove_session(session_id).await;

        if let Some(left) = removed.as_ref().and_then(|r| r.left_room.as_ref()) {
            self.notifier.broadcast_occupancy(left.members.clone()).await;
            self.notifier.broadcast_room_list().await;
        }

        self.message_pusher.unregister_client(session_id).await;

        if let Some(removed) = &removed {
            tracing::info!(
                "Session '{}' ({}) removed",
                session_id,
                removed
                    .session
                    .username
                    .as_ref()
                    .map_or("anonymous", |name| name.as_str())
            );
        }
        removed
    }
}

#[cfg(test)]
mod tests {
    use hottopics_shared::protocol::{Packet, RoomInfo};

    use crate::{domain::ChatroomRegistry, usecase::test_support::Fixture};

    #[tokio::test]
    async fn test_disconnect_in_room_notifies_remaining_members() {
        // テスト項目: ルーム参加中の切断で残りのメンバーに人数が、Browsing に一覧が送られる
        // given (前提条件):
        let fixture = Fixture::new();
        fixture.create_rooms(&["Topic1"]).await;
        let alice = fixture.in_room("alice123x", "Topic1").await;
        let mut bob = fixture.in_room("bob.smith", "Topic1").await;
        let mut carol = fixture.identified("carol.lee").await;

        // when (操作):
        let removed = fixture.disconnect.execute(&alice.id).await;

        // then (期待する結果):
        assert!(removed.is_some());
        assert_eq!(bob.drain(), vec![Packet::room_occupancy_update(1)]);
        assert_eq!(
            carol.drain(),
            vec![Packet::room_list_response(vec![RoomInfo {
                name: "Topic1".to_string(),
                size: 1
            }])]
        );
        assert_eq!(fixture.registry.all_sessions().await.len(), 2);
    }

    #[tokio::test]
    async fn test_disconnect_is_idempotent() {
        // テスト項目: 2 回目の切断は何もしない
        // given (前提条件):
        let fixture = Fixture::new();
        let alice = fixture.identified("alice123x").await;
        fixture.disconnect.execute(&alice.id).await;

        // when (操作):
        let second = fixture.disconnect.execute(&alice.id).await;

        // then (期待する結果):
        assert!(second.is_none());
        assert!(fixture.registry.all_sessions().await.is_empty());
    }

    #[tokio::test]
    async fn test_disconnect_closes_outbound_channel() {
        // テスト項目: 切断すると送信チャンネルが閉じられる
        // given (前提条件):
        let fixture = Fixture::new();
        let mut alice = fixture.connect().await;

        // when (操作):
        fixture.disconnect.execute(&alice.id).await;

        // then (期待する結果):
        assert!(alice.is_closed());
        assert_eq!(fixture.pusher.client_count().await, 0);
    }
}
