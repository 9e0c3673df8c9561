//! InMemory Chatroom Registry 実装
//!
//! ドメイン層が定義する ChatroomRegistry trait の具体的な実装。
//! ルーム一覧とセッション表を 1 つの `tokio::sync::Mutex` で守る。
//! ロックはメソッド内で完結し、`.await` をまたいで保持しない。

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::domain::{
    ChatMessage, Chatroom, ChatroomRegistry, JoinedRoom, LeftRoom, LivenessPolicy,
    LivenessSweep, LivenessVerdict, MessageText, PostedMessage, RegistryError, RemovedSession,
    RoomName, RoomSummary, Session, SessionFilter, SessionId, SessionState, Timestamp, Username,
    assess,
};

#[derive(Debug, Default)]
struct RegistryState {
    /// 作成順（トレンド順）を保つため Vec で持つ
    rooms: Vec<Chatroom>,
    sessions: HashMap<SessionId, Session>,
}

impl RegistryState {
    fn room_mut(&mut self, name: &RoomName) -> Option<&mut Chatroom> {
        self.rooms.iter_mut().find(|room| &room.name == name)
    }
}

/// インメモリ Chatroom Registry 実装
#[derive(Debug, Default)]
pub struct InMemoryChatroomRegistry {
    state: Mutex<RegistryState>,
}

impl InMemoryChatroomRegistry {
    /// 空の Registry を作成
    pub fn new() -> Self {
        Self::default()
    }

    /// メンバー集合とセッション状態が一致していることを確認する
    ///
    /// InRoom のセッションはちょうど 1 つのルームのメンバーで、それ以外のセッションは
    /// どのルームのメンバーでもない。どのルームのメンバーも登録済みのセッション。
    #[cfg(test)]
    pub(crate) async fn assert_membership_consistent(&self) {
        let state = self.state.lock().await;
        for session in state.sessions.values() {
            let rooms_containing: Vec<&Chatroom> = state
                .rooms
                .iter()
                .filter(|room| room.is_member(&session.id))
                .collect();
            match session.room() {
                Some(room_name) => {
                    assert_eq!(rooms_containing.len(), 1);
                    assert_eq!(&rooms_containing[0].name, room_name);
                }
                None => assert!(rooms_containing.is_empty()),
            }
        }
        for room in &state.rooms {
            for member in room.members() {
                assert!(state.sessions.contains_key(member));
            }
        }
    }
}

#[async_trait]
impl ChatroomRegistry for InMemoryChatroomRegistry {
    async fn create_room(&self, name: RoomName, now: Timestamp) -> bool {
        let mut state = self.state.lock().await;
        if state.rooms.iter().any(|room| room.name == name) {
            return false;
        }
        tracing::debug!("Room '{}' created", name);
        state.rooms.push(Chatroom::new(name, now));
        true
    }

    async fn remove_room_if_empty(&self, name: &RoomName) -> bool {
        let mut state = self.state.lock().await;
        let Some(index) = state.rooms.iter().position(|room| &room.name == name) else {
            return false;
        };
        if !state.rooms[index].is_empty() {
            return false;
        }
        state.rooms.remove(index);
        tracing::debug!("Room '{}' removed", name);
        true
    }

    async fn list_rooms(&self) -> Vec<RoomSummary> {
        let state = self.state.lock().await;
        state.rooms.iter().map(Chatroom::summary).collect()
    }

    async fn find_room(&self, name: &RoomName) -> Option<Chatroom> {
        let state = self.state.lock().await;
        state.rooms.iter().find(|room| &room.name == name).cloned()
    }

    async fn add_session(&self, id: SessionId, now: Timestamp) -> Session {
        let session = Session::new(id, now);
        let mut state = self.state.lock().await;
        state.sessions.insert(id, session.clone());
        session
    }

    async fn remove_session(&self, id: &SessionId) -> Option<RemovedSession> {
        let mut state = self.state.lock().await;
        let session = state.sessions.remove(id)?;

        let left_room = match session.room() {
            Some(name) => state.room_mut(name).and_then(|room| {
                room.remove_member(id).then(|| LeftRoom {
                    room: room.name.clone(),
                    members: room.members().to_vec(),
                })
            }),
            None => None,
        };

        Some(RemovedSession { session, left_room })
    }

    async fn all_sessions(&self) -> Vec<Session> {
        let state = self.state.lock().await;
        state.sessions.values().cloned().collect()
    }

    async fn session_ids(&self, filter: SessionFilter) -> Vec<SessionId> {
        let state = self.state.lock().await;
        state
            .sessions
            .values()
            .filter(|session| filter.matches(session))
            .map(|session| session.id)
            .collect()
    }

    async fn touch_session(&self, id: &SessionId, now: Timestamp) -> Option<Session> {
        let mut state = self.state.lock().await;
        let session = state.sessions.get_mut(id)?;
        session.touch(now);
        Some(session.clone())
    }

    async fn claim_username(
        &self,
        id: &SessionId,
        username: Username,
    ) -> Result<(), RegistryError> {
        let mut state = self.state.lock().await;

        let current = state
            .sessions
            .get(id)
            .ok_or_else(|| RegistryError::SessionNotFound(id.to_string()))?;
        if current.state != SessionState::AwaitingIdentity {
            return Err(RegistryError::InvalidState(current.state.label()));
        }

        let taken = state.sessions.values().any(|session| {
            session
                .username
                .as_ref()
                .is_some_and(|existing| existing.eq_ignore_case(&username))
        });
        if taken {
            return Err(RegistryError::UsernameTaken(username.to_string()));
        }

        if let Some(session) = state.sessions.get_mut(id) {
            session.username = Some(username);
            session.state = SessionState::Browsing;
        }
        Ok(())
    }

    async fn join_room(
        &self,
        id: &SessionId,
        name: &RoomName,
    ) -> Result<JoinedRoom, RegistryError> {
        let mut guard = self.state.lock().await;
        let RegistryState { rooms, sessions } = &mut *guard;

        let session = sessions
            .get_mut(id)
            .ok_or_else(|| RegistryError::SessionNotFound(id.to_string()))?;
        if session.state != SessionState::Browsing {
            return Err(RegistryError::InvalidState(session.state.label()));
        }
        let room = rooms
            .iter_mut()
            .find(|room| &room.name == name)
            .ok_or_else(|| RegistryError::RoomNotFound(name.to_string()))?;

        room.add_member(*id);
        session.state = SessionState::InRoom {
            room: room.name.clone(),
        };

        Ok(JoinedRoom {
            room: room.name.clone(),
            members: room.members().to_vec(),
            recent_messages: room.recent_messages().cloned().collect(),
        })
    }

    async fn leave_room(&self, id: &SessionId) -> Result<LeftRoom, RegistryError> {
        let mut guard = self.state.lock().await;
        let RegistryState { rooms, sessions } = &mut *guard;

        let session = sessions
            .get_mut(id)
            .ok_or_else(|| RegistryError::SessionNotFound(id.to_string()))?;
        let name = session.room().ok_or(RegistryError::NotInRoom)?;

        // 状態だけ InRoom でメンバーにいない場合は何も変更しない
        let room = rooms
            .iter_mut()
            .find(|room| &room.name == name)
            .filter(|room| room.is_member(id))
            .ok_or(RegistryError::NotInRoom)?;

        room.remove_member(id);
        session.state = SessionState::Browsing;

        Ok(LeftRoom {
            room: room.name.clone(),
            members: room.members().to_vec(),
        })
    }

    async fn post_message(
        &self,
        id: &SessionId,
        text: MessageText,
        now: Timestamp,
    ) -> Result<PostedMessage, RegistryError> {
        let mut guard = self.state.lock().await;
        let RegistryState { rooms, sessions } = &mut *guard;

        let session = sessions
            .get(id)
            .ok_or_else(|| RegistryError::SessionNotFound(id.to_string()))?;
        let name = session.room().ok_or(RegistryError::NotInRoom)?;
        let author = session
            .username
            .clone()
            .ok_or(RegistryError::InvalidState(session.state.label()))?;

        let room = rooms
            .iter_mut()
            .find(|room| &room.name == name)
            .ok_or_else(|| RegistryError::RoomNotFound(name.to_string()))?;
        if !room.is_member(id) {
            return Err(RegistryError::NotInRoom);
        }

        let message = ChatMessage {
            author,
            text,
            sent_at: now,
        };
        room.push_message(message.clone());

        Ok(PostedMessage {
            room: room.name.clone(),
            message,
            recipients: room.members().to_vec(),
        })
    }

    async fn sweep_liveness(&self, now: Timestamp, policy: &LivenessPolicy) -> LivenessSweep {
        let mut state = self.state.lock().await;
        let mut sweep = LivenessSweep::default();

        for session in state.sessions.values_mut() {
            match assess(session, now, policy) {
                LivenessVerdict::Healthy => {}
                LivenessVerdict::Probe => {
                    session.pending_probe = Some(now);
                    sweep.probed.push(session.id);
                }
                LivenessVerdict::Evict => sweep.evicted.push(session.id),
            }
        }

        sweep
    }
}
