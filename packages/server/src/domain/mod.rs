//! ドメイン層
//!
//! エンティティ・値オブジェクトと、UseCase 層が依存する trait（Registry,
//! MessagePusher, TrendSource）を定義する。外側の層には依存しない。

pub mod entity;
pub mod error;
pub mod liveness;
pub mod message_pusher;
pub mod registry;
pub mod trend_source;
pub mod value_object;

pub use entity::{
    ChatMessage, Chatroom, RECENT_MESSAGE_CAPACITY, RoomSummary, Session, SessionState,
};
pub use error::{MessagePushError, RegistryError, TrendSourceError, ValueObjectError};
pub use liveness::{LivenessPolicy, LivenessVerdict, assess};
pub use message_pusher::{MessagePusher, PusherChannel};
pub use registry::{
    ChatroomRegistry, JoinedRoom, LeftRoom, LivenessSweep, PostedMessage, RemovedSession,
    SessionFilter,
};
pub use trend_source::{MIN_TRENDS_FETCH_INTERVAL, TrendLocation, TrendSource};
pub use value_object::{MessageText, RoomName, SessionId, Timestamp, Username};

#[cfg(test)]
pub use trend_source::MockTrendSource;
