//! 送信ヘルパー
//!
//! Registry から宛先を解決し、`Packet` を 1 回だけエンコードして MessagePusher に渡す。
//! 送信失敗はログに残すだけで呼び出し元には返さない。

use std::sync::Arc;

use hottopics_shared::protocol::Packet;

use crate::{
    domain::{ChatroomRegistry, MessagePusher, SessionFilter, SessionId},
    infrastructure::dto::room_list_packet,
};

pub struct Notifier {
    registry: Arc<dyn ChatroomRegistry>,
    message_pusher: Arc<dyn MessagePusher>,
}

fn encode(packet: &Packet) -> Option<String> {
    match packet.encode() {
        Ok(text) => Some(text),
        Err(e) => {
            tracing::error!("Failed to encode {}: {}", packet.kind(), e);
            None
        }
    }
}

impl Notifier {
    pub fn new(
        registry: Arc<dyn ChatroomRegistry>,
        message_pusher: Arc<dyn MessagePusher>,
    ) -> Self {
        Self {
            registry,
            message_pusher,
        }
    }

    /// 1 セッションに送る
    pub async fn send(&self, target: &SessionId, packet: &Packet) {
        let Some(text) = encode(packet) else {
            return;
        };
        if let Err(e) = self.message_pusher.push_to(target, &text).await {
            tracing::warn!("Failed to send {} to '{}': {}", packet.kind(), target, e);
        }
    }

    /// 指定したセッション群に送る
    pub async fn send_all(&self, targets: Vec<SessionId>, packet: &Packet) {
        if targets.is_empty() {
            return;
        }
        let Some(text) = encode(packet) else {
            return;
        };
        if let Err(e) = self.message_pusher.broadcast(targets, &text).await {
            tracing::warn!("Failed to broadcast {}: {}", packet.kind(), e);
        }
    }

    /// 条件に合う全セッションに送る
    pub async fn broadcast(&self, filter: SessionFilter, packet: &Packet) {
        let targets = self.registry.session_ids(filter).await;
        self.send_all(targets, packet).await;
    }

    /// 最新のルーム一覧を Browsing の全セッションに送る
    pub async fn broadcast_room_list(&self) {
        let rooms = self.registry.list_rooms().await;
        self.broadcast(SessionFilter::Browsing, &room_list_packet(&rooms))
            .await;
    }

    /// ルームのメンバー数をメンバー全員に送る
    ///
    /// `members` は入退室と同じ排他区間で読んだもの。宛先と人数が食い違わない。
    pub async fn broadcast_occupancy(&self, members: Vec<SessionId>) {
        let count = members.len();
        self.send_all(members, &Packet::room_occupancy_update(count))
            .await;
    }
}
