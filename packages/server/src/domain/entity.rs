//! エンティティ定義（Session, Chatroom）

use std::{collections::VecDeque, fmt};

use super::value_object::{MessageText, RoomName, SessionId, Timestamp, Username};

/// ルームが保持する直近メッセージの上限
pub const RECENT_MESSAGE_CAPACITY: usize = 50;

/// セッションのプロトコル状態
///
/// 参加中のルームは `InRoom` の中にだけ存在する。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    /// ユーザー名の申請待ち（接続直後）
    AwaitingIdentity,
    /// ユーザー名確定済み、ルーム未参加
    Browsing,
    /// ルーム参加中
    InRoom { room: RoomName },
}

impl SessionState {
    pub fn label(&self) -> &'static str {
        match self {
            SessionState::AwaitingIdentity => "AwaitingIdentity",
            SessionState::Browsing => "Browsing",
            SessionState::InRoom { .. } => "InRoom",
        }
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionState::InRoom { room } => write!(f, "InRoom({})", room),
            other => f.write_str(other.label()),
        }
    }
}

/// 1 接続 = 1 セッション
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub id: SessionId,
    pub username: Option<Username>,
    pub state: SessionState,
    pub connected_at: Timestamp,
    /// 最後に正常デコードできた受信メッセージの時刻
    pub last_activity_at: Timestamp,
    /// LivenessProbe を送った時刻（応答待ちでなければ None）
    pub pending_probe: Option<Timestamp>,
}

impl Session {
    pub fn new(id: SessionId, connected_at: Timestamp) -> Self {
        Self {
            id,
            username: None,
            state: SessionState::AwaitingIdentity,
            connected_at,
            last_activity_at: connected_at,
            pending_probe: None,
        }
    }

    pub fn room(&self) -> Option<&RoomName> {
        match &self.state {
            SessionState::InRoom { room } => Some(room),
            _ => None,
        }
    }

    pub fn is_browsing(&self) -> bool {
        self.state == SessionState::Browsing
    }

    /// 受信を記録し、応答待ちの probe を解除する
    pub fn touch(&mut self, now: Timestamp) {
        self.last_activity_at = now;
        self.pending_probe = None;
    }
}

/// ルームに投稿されたメッセージ
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    pub author: Username,
    pub text: MessageText,
    pub sent_at: Timestamp,
}

/// ルーム一覧用のスナップショット
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoomSummary {
    pub name: RoomName,
    pub size: usize,
    pub created_at: Timestamp,
}

/// チャットルーム
///
/// メンバーは参加順に保持する。直近メッセージは [`RECENT_MESSAGE_CAPACITY`] 件の
/// FIFO で、上限を超えると最も古いものから捨てる。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chatroom {
    pub name: RoomName,
    members: Vec<SessionId>,
    recent_messages: VecDeque<ChatMessage>,
    pub created_at: Timestamp,
}

impl Chatroom {
    pub fn new(name: RoomName, created_at: Timestamp) -> Self {
        Self {
            name,
            members: Vec::new(),
            recent_messages: VecDeque::with_capacity(RECENT_MESSAGE_CAPACITY),
            created_at,
        }
    }

    /// メンバーを追加する。既に参加済みなら false
    pub fn add_member(&mut self, id: SessionId) -> bool {
        if self.members.contains(&id) {
            return false;
        }
        self.members.push(id);
        true
    }

    /// メンバーを削除する。参加していなければ false
    pub fn remove_member(&mut self, id: &SessionId) -> bool {
        let before = self.members.len();
        self.members.retain(|member| member != id);
        self.members.len() != before
    }

    pub fn is_member(&self, id: &SessionId) -> bool {
        self.members.contains(id)
    }

    pub fn members(&self) -> &[SessionId] {
        &self.members
    }

    pub fn member_count(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn push_message(&mut self, message: ChatMessage) {
        while self.recent_messages.len() >= RECENT_MESSAGE_CAPACITY {
            self.recent_messages.pop_front();
        }
        self.recent_messages.push_back(message);
    }

    /// 直近メッセージ（古い順）
    pub fn recent_messages(&self) -> impl Iterator<Item = &ChatMessage> {
        self.recent_messages.iter()
    }

    pub fn summary(&self) -> RoomSummary {
        RoomSummary {
            name: self.name.clone(),
            size: self.member_count(),
            created_at: self.created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn message(index: usize) -> ChatMessage {
        ChatMessage {
            author: Username::new("alice123x".to_string()).unwrap(),
            text: MessageText::new(format!("message {}", index)).unwrap(),
            sent_at: Timestamp::new(index as i64),
        }
    }

    fn room() -> Chatroom {
        Chatroom::new(RoomName::new("Topic1").unwrap(), Timestamp::new(0))
    }

    #[test]
    fn test_new_session_awaits_identity() {
        // テスト項目: 新規セッションはユーザー名待ち状態で、ルームを持たない
        // given (前提条件):
        let id = SessionId::generate();

        // when (操作):
        let session = Session::new(id, Timestamp::new(1_000));

        // then (期待する結果):
        assert_eq!(session.state, SessionState::AwaitingIdentity);
        assert!(session.username.is_none());
        assert!(session.room().is_none());
        assert_eq!(session.last_activity_at, Timestamp::new(1_000));
        assert!(session.pending_probe.is_none());
    }

    #[test]
    fn test_touch_clears_pending_probe() {
        // テスト項目: touch で最終アクティビティが更新され、probe 待ちが解除される
        // given (前提条件):
        let mut session = Session::new(SessionId::generate(), Timestamp::new(0));
        session.pending_probe = Some(Timestamp::new(60_000));

        // when (操作):
        session.touch(Timestamp::new(61_000));

        // then (期待する結果):
        assert_eq!(session.last_activity_at, Timestamp::new(61_000));
        assert!(session.pending_probe.is_none());
    }

    #[test]
    fn test_add_member_rejects_duplicate() {
        // テスト項目: 同じセッションを二重にメンバー登録できない
        // given (前提条件):
        let mut room = room();
        let id = SessionId::generate();

        // when (操作):
        let first = room.add_member(id);
        let second = room.add_member(id);

        // then (期待する結果):
        assert!(first);
        assert!(!second);
        assert_eq!(room.member_count(), 1);
    }

    #[test]
    fn test_remove_member_reports_membership() {
        // テスト項目: メンバー削除は参加していた場合のみ true を返す
        // given (前提条件):
        let mut room = room();
        let id = SessionId::generate();
        room.add_member(id);

        // when (操作):
        let first = room.remove_member(&id);
        let second = room.remove_member(&id);

        // then (期待する結果):
        assert!(first);
        assert!(!second);
        assert!(room.is_empty());
    }

    #[test]
    fn test_recent_messages_evict_oldest_after_capacity() {
        // テスト項目: 51 件目の投稿で最古のメッセージが消え、上限 50 件を超えない
        // given (前提条件):
        let mut room = room();

        // when (操作):
        for index in 1..=RECENT_MESSAGE_CAPACITY + 1 {
            room.push_message(message(index));
        }

        // then (期待する結果):
        let texts: Vec<&str> = room.recent_messages().map(|m| m.text.as_str()).collect();
        assert_eq!(texts.len(), RECENT_MESSAGE_CAPACITY);
        assert_eq!(texts.first(), Some(&"message 2"));
        assert_eq!(texts.last(), Some(&"message 51"));
        assert!(!texts.contains(&"message 1"));
    }

    #[test]
    fn test_summary_reflects_member_count() {
        // テスト項目: サマリーにメンバー数が反映される
        // given (前提条件):
        let mut room = room();
        room.add_member(SessionId::generate());
        room.add_member(SessionId::generate());

        // when (操作):
        let summary = room.summary();

        // then (期待する結果):
        assert_eq!(summary.name.as_str(), "Topic1");
        assert_eq!(summary.size, 2);
    }
}
