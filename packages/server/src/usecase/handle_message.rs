//! UseCase: 受信メッセージ処理（セッションのプロトコル状態機械）
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - HandleMessageUseCase::execute() の状態ごとのディスパッチ
//!
//! ### なぜこのテストが必要か
//! - 受け付けるメッセージ種別はセッションの状態で厳密に決まる
//! - 状態外・不正なメッセージには返信しない（接続は維持する）
//! - ユーザー名の一意性・メンバー数の通知がクライアントから見える契約になっている
//!
//! ### どのような状況を想定しているか
//! - 正常系：ユーザー名確定 → 一覧取得 → 参加 → 発言 → 退出
//! - 異常系：重複ユーザー名、存在しないルーム、二重退出、デコード不能なフレーム
//! - エッジケース：状態外のメッセージ、サーバー → クライアント方向の種別の受信

use std::sync::Arc;

use hottopics_shared::{
    protocol::{Direction, Packet},
    time::Clock,
};

use crate::{
    domain::{
        ChatroomRegistry, MessageText, RegistryError, RoomName, SessionId, SessionState,
        Timestamp, Username,
    },
    infrastructure::dto::room_list_packet,
};

use super::{Notifier, error::ProtocolError};

/// 受信メッセージ処理のユースケース
pub struct HandleMessageUseCase {
    registry: Arc<dyn ChatroomRegistry>,
    notifier: Arc<Notifier>,
    clock: Arc<dyn Clock>,
}

impl HandleMessageUseCase {
    pub fn new(
        registry: Arc<dyn ChatroomRegistry>,
        notifier: Arc<Notifier>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            registry,
            notifier,
            clock,
        }
    }

    /// 1 フレーム分のテキストを処理する
    ///
    /// # Returns
    ///
    /// * `Ok(())` - 処理した（返信の有無は種別と結果による）
    /// * `Err(ProtocolError)` - 破棄した。呼び出し側はログに残すだけでよい
    pub async fn execute(&self, session_id: &SessionId, text: &str) -> Result<(), ProtocolError> {
        let packet = Packet::decode(text)?;

        let now = Timestamp::new(self.clock.now_millis());
        let session = self
            .registry
            .touch_session(session_id, now)
            .await
            .ok_or_else(|| ProtocolError::SessionNotFound(session_id.to_string()))?;

        let kind = packet.kind();
        if kind.direction() == Direction::ServerToClient {
            return Err(ProtocolError::StateViolation {
                state: session.state.label(),
                kind,
            });
        }
        tracing::debug!("Session '{}' ({}) sent {}", session_id, session.state, kind);

        match (&session.state, packet) {
            // touch_session で probe 待ちは解除済み
            (_, Packet::LivenessAck) => Ok(()),

            (SessionState::AwaitingIdentity, Packet::IdentityRequest(request)) => {
                self.claim_identity(session_id, request.username).await
            }

            (SessionState::Browsing, Packet::RoomListRequest) => {
                let rooms = self.registry.list_rooms().await;
                self.notifier
                    .send(session_id, &room_list_packet(&rooms))
                    .await;
                Ok(())
            }
            (SessionState::Browsing, Packet::JoinRoomRequest(request)) => {
                self.join_room(session_id, request.chatroom_name).await
            }
            // ルーム外からの退出要求は拒否を返す（続けて 2 回退出すると true → false）
            (SessionState::Browsing, Packet::LeaveRoomRequest) => {
                self.notifier
                    .send(session_id, &Packet::leave_room_response(false))
                    .await;
                Ok(())
            }

            (SessionState::InRoom { .. }, Packet::SendMessage(message)) => {
                self.post_message(session_id, message.message, now).await
            }
            (SessionState::InRoom { .. }, Packet::LeaveRoomRequest) => {
                self.leave_room(session_id).await
            }

            (state, packet) => Err(ProtocolError::StateViolation {
                state: state.label(),
                kind: packet.kind(),
            }),
        }
    }

    async fn claim_identity(
        &self,
        session_id: &SessionId,
        requested: String,
    ) -> Result<(), ProtocolError> {
        let username = match Username::new(requested) {
            Ok(username) => username,
            Err(e) => {
                tracing::info!("Session '{}' rejected: {}", session_id, e);
                self.notifier
                    .send(session_id, &Packet::identity_response(false))
                    .await;
                return Ok(());
            }
        };

        let accepted = match self.registry.claim_username(session_id, username.clone()).await {
            Ok(()) => {
                tracing::info!("Session '{}' identified as '{}'", session_id, username);
                true
            }
            Err(RegistryError::SessionNotFound(id)) => {
                return Err(ProtocolError::SessionNotFound(id));
            }
            Err(e) => {
                tracing::info!("Session '{}' rejected: {}", session_id, e);
                false
            }
        };

        self.notifier
            .send(session_id, &Packet::identity_response(accepted))
            .await;
        Ok(())
    }

    async fn join_room(
        &self,
        session_id: &SessionId,
        requested: String,
    ) -> Result<(), ProtocolError> {
        // ルーム名は完全一致で探す（前後の空白を除いた名前とは別物とみなす）
        let name = RoomName::new(requested.as_str())
            .ok()
            .filter(|name| name.as_str() == requested);
        let Some(name) = name else {
            self.notifier
                .send(session_id, &Packet::join_room_response(false))
                .await;
            return Ok(());
        };

        let joined = match self.registry.join_room(session_id, &name).await {
            Ok(joined) => joined,
            Err(RegistryError::SessionNotFound(id)) => {
                return Err(ProtocolError::SessionNotFound(id));
            }
            Err(e) => {
                tracing::info!("Session '{}' could not join '{}': {}", session_id, name, e);
                self.notifier
                    .send(session_id, &Packet::join_room_response(false))
                    .await;
                return Ok(());
            }
        };
        tracing::info!(
            "Session '{}' joined '{}' ({} members)",
            session_id,
            joined.room,
            joined.member_count()
        );

        self.notifier
            .send(session_id, &Packet::join_room_response(true))
            .await;
        for message in &joined.recent_messages {
            self.notifier.send(session_id, &Packet::from(message)).await;
        }
        self.notifier
            .broadcast_occupancy(joined.members.clone())
            .await;
        self.notifier.broadcast_room_list().await;
        Ok(())
    }

    async fn post_message(
        &self,
        session_id: &SessionId,
        text: String,
        now: Timestamp,
    ) -> Result<(), ProtocolError> {
        let Ok(text) = MessageText::new(text) else {
            tracing::debug!("Session '{}' sent an empty message, dropped", session_id);
            return Ok(());
        };

        match self.registry.post_message(session_id, text, now).await {
            Ok(posted) => {
                self.notifier
                    .send_all(posted.recipients, &Packet::from(&posted.message))
                    .await;
                Ok(())
            }
            Err(RegistryError::SessionNotFound(id)) => Err(ProtocolError::SessionNotFound(id)),
            Err(e) => {
                tracing::warn!("Session '{}' message dropped: {}", session_id, e);
                Ok(())
            }
        }
    }

    async fn leave_room(&self, session_id: &SessionId) -> Result<(), ProtocolError> {
        match self.registry.leave_room(session_id).await {
            Ok(left) => {
                tracing::info!("Session '{}' left '{}'", session_id, left.room);
                self.notifier
                    .send(session_id, &Packet::leave_room_response(true))
                    .await;
                self.notifier.broadcast_occupancy(left.members).await;
                self.notifier.broadcast_room_list().await;
                Ok(())
            }
            Err(RegistryError::SessionNotFound(id)) => Err(ProtocolError::SessionNotFound(id)),
            Err(e) => {
                tracing::warn!("Session '{}' could not leave: {}", session_id, e);
                self.notifier
                    .send(session_id, &Packet::leave_room_response(false))
                    .await;
                Ok(())
            }
        }
    }
}
