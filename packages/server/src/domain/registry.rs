//! ChatroomRegistry trait 定義
//!
//! 全ルームと全セッションを所有するコンポーネントのインターフェース。
//! 具体的な実装は Infrastructure 層が提供します（依存性の逆転）。
//!
//! 状態を変更する操作はすべて 1 回の呼び出しで完結する。呼び出し側で
//! 「読んでから書く」必要がないようにしておくことで、ユーザー名の重複チェックと
//! 割り当て、メンバー変更と人数の読み取りが同じ排他区間に収まる。

use async_trait::async_trait;

use super::{
    ChatMessage, Chatroom, LivenessPolicy, MessageText, RegistryError, RoomName, RoomSummary,
    Session, SessionId, Timestamp, Username,
};

/// ブロードキャスト対象の絞り込み条件
///
/// ルームのメンバーは入退室・投稿の結果（`members` / `recipients`）から得るので、
/// ここにはルーム外のセッション向けの条件だけを置く。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionFilter {
    /// ルーム未参加（ルーム一覧を見ている）セッション
    Browsing,
}

impl SessionFilter {
    pub fn matches(&self, session: &Session) -> bool {
        match self {
            SessionFilter::Browsing => session.is_browsing(),
        }
    }
}

/// ルームから抜けた結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeftRoom {
    pub room: RoomName,
    /// 退出と同じ排他区間で読んだ残りのメンバー
    pub members: Vec<SessionId>,
}

/// ルームに参加した結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JoinedRoom {
    pub room: RoomName,
    /// 参加と同じ排他区間で読んだメンバー（参加者を含む）
    pub members: Vec<SessionId>,
    /// 参加時点の直近メッセージ（古い順）
    pub recent_messages: Vec<ChatMessage>,
}

impl JoinedRoom {
    /// 参加後のメンバー数
    pub fn member_count(&self) -> usize {
        self.members.len()
    }
}

/// メッセージ投稿の結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostedMessage {
    pub room: RoomName,
    pub message: ChatMessage,
    /// 投稿を受け付けた時点のメンバー（送信者を含む）
    pub recipients: Vec<SessionId>,
}

/// セッション削除の結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemovedSession {
    pub session: Session,
    /// ルーム参加中だった場合の退出結果
    pub left_room: Option<LeftRoom>,
}

/// 死活監視 1 サイクル分の結果
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LivenessSweep {
    /// 今回 probe を送るべきセッション（pending_probe は設定済み）
    pub probed: Vec<SessionId>,
    /// 切断すべきセッション（まだ Registry からは削除していない）
    pub evicted: Vec<SessionId>,
}

/// Chatroom Registry trait
///
/// UseCase 層はこの trait に依存し、Infrastructure 層の具体的な実装には依存しない。
#[async_trait]
pub trait ChatroomRegistry: Send + Sync {
    // ----- rooms -----

    /// ルームを作成する。同名のルームがあれば何もせず false
    async fn create_room(&self, name: RoomName, now: Timestamp) -> bool;

    /// メンバーがいない場合に限りルームを削除する
    async fn remove_room_if_empty(&self, name: &RoomName) -> bool;

    /// 全ルームのスナップショット（作成順）
    async fn list_rooms(&self) -> Vec<RoomSummary>;

    async fn find_room(&self, name: &RoomName) -> Option<Chatroom>;

    // ----- sessions -----

    async fn add_session(&self, id: SessionId, now: Timestamp) -> Session;

    /// セッションを削除する。ルーム参加中ならメンバーからも外す。
    /// 存在しなければ None（何度呼んでもよい）
    async fn remove_session(&self, id: &SessionId) -> Option<RemovedSession>;

    async fn all_sessions(&self) -> Vec<Session>;

    async fn session_ids(&self, filter: SessionFilter) -> Vec<SessionId>;

    /// 受信を記録し、probe 待ちを解除する。更新後のスナップショットを返す
    async fn touch_session(&self, id: &SessionId, now: Timestamp) -> Option<Session>;

    // ----- protocol transitions -----

    /// ユーザー名を割り当て、Browsing に遷移する（重複チェックは大文字小文字を区別しない）
    async fn claim_username(&self, id: &SessionId, username: Username)
    -> Result<(), RegistryError>;

    /// Browsing のセッションをルームに参加させる
    async fn join_room(&self, id: &SessionId, name: &RoomName)
    -> Result<JoinedRoom, RegistryError>;

    /// 参加中のルームから退出し、Browsing に戻る
    async fn leave_room(&self, id: &SessionId) -> Result<LeftRoom, RegistryError>;

    /// 参加中のルームにメッセージを投稿する
    async fn post_message(
        &self,
        id: &SessionId,
        text: MessageText,
        now: Timestamp,
    ) -> Result<PostedMessage, RegistryError>;

    // ----- health -----

    /// 全セッションを判定し、probe 対象には pending_probe を設定する
    async fn sweep_liveness(&self, now: Timestamp, policy: &LivenessPolicy) -> LivenessSweep;
}
