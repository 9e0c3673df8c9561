//! Wire protocol for the Hot Topics chat.
//!
//! Every frame is a JSON object. The integer under `"id"` identifies the
//! message kind; the remaining keys are that kind's payload:
//!
//! ```text
//! {"id":2,"username":"alice123x"}          IdentityRequest   (client → server)
//! {"id":3,"response":true}                 IdentityResponse  (server → client)
//! {"id":1,"author":"alice123x","message":"hi"}  MessageDelivered
//! ```
//!
//! The tag of a kind is its position in [`PacketKind::ALL`]. That list is
//! append-only: inserting or reordering entries changes every later tag and
//! breaks deployed clients.

use serde::{Deserialize, Serialize, de::DeserializeOwned};
use serde_json::{Map, Value};
use thiserror::Error;

/// JSON key holding the type tag.
pub const TAG_KEY: &str = "id";

/// Minimum username length (inclusive)
pub const USERNAME_MIN_LEN: usize = 8;
/// Maximum username length (inclusive)
pub const USERNAME_MAX_LEN: usize = 20;

/// Decode / encode failure
#[derive(Debug, Error)]
pub enum CodecError {
    #[error("malformed JSON frame: {0}")]
    Json(#[from] serde_json::Error),

    #[error("frame is not a JSON object")]
    NotAnObject,

    #[error("frame has no integer '{TAG_KEY}' tag")]
    MissingTag,

    #[error("unknown message tag {0}")]
    UnknownTag(u64),
}

/// Which side sends a message kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    ClientToServer,
    ServerToClient,
}

/// Every message kind, in canonical tag order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PacketKind {
    SendMessage,
    MessageDelivered,
    IdentityRequest,
    IdentityResponse,
    RoomListRequest,
    RoomListResponse,
    JoinRoomRequest,
    JoinRoomResponse,
    LeaveRoomRequest,
    LeaveRoomResponse,
    RoomOccupancyUpdate,
    LivenessProbe,
    LivenessAck,
}

impl PacketKind {
    /// Canonical list. Append new kinds at the end only.
    pub const ALL: [PacketKind; 13] = [
        PacketKind::SendMessage,
        PacketKind::MessageDelivered,
        PacketKind::IdentityRequest,
        PacketKind::IdentityResponse,
        PacketKind::RoomListRequest,
        PacketKind::RoomListResponse,
        PacketKind::JoinRoomRequest,
        PacketKind::JoinRoomResponse,
        PacketKind::LeaveRoomRequest,
        PacketKind::LeaveRoomResponse,
        PacketKind::RoomOccupancyUpdate,
        PacketKind::LivenessProbe,
        PacketKind::LivenessAck,
    ];

    /// Wire tag: ordinal position in [`PacketKind::ALL`].
    pub fn tag(self) -> u64 {
        Self::ALL
            .iter()
            .position(|kind| *kind == self)
            .map_or(u64::MAX, |position| position as u64)
    }

    pub fn from_tag(tag: u64) -> Option<Self> {
        usize::try_from(tag)
            .ok()
            .and_then(|index| Self::ALL.get(index).copied())
    }

    pub fn direction(self) -> Direction {
        match self {
            PacketKind::SendMessage
            | PacketKind::IdentityRequest
            | PacketKind::RoomListRequest
            | PacketKind::JoinRoomRequest
            | PacketKind::LeaveRoomRequest
            | PacketKind::LivenessAck => Direction::ClientToServer,
            PacketKind::MessageDelivered
            | PacketKind::IdentityResponse
            | PacketKind::RoomListResponse
            | PacketKind::JoinRoomResponse
            | PacketKind::LeaveRoomResponse
            | PacketKind::RoomOccupancyUpdate
            | PacketKind::LivenessProbe => Direction::ServerToClient,
        }
    }
}

impl std::fmt::Display for PacketKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        std::fmt::Debug::fmt(self, f)
    }
}

// ========================================
// Payloads
// ========================================

/// Chat text sent by a client in a room
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SendMessage {
    #[serde(default)]
    pub message: String,
}

/// Chat text relayed by the server to room members
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageDelivered {
    #[serde(default)]
    pub author: String,
    #[serde(default)]
    pub message: String,
}

/// Username claim
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentityRequest {
    #[serde(default)]
    pub username: String,
}

/// Accept / reject answer shared by the request-response pairs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BooleanResponse {
    pub response: bool,
}

/// One entry of the room list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomInfo {
    pub name: String,
    pub size: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomListResponse {
    #[serde(default)]
    pub chatrooms: Vec<RoomInfo>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JoinRoomRequest {
    #[serde(default)]
    pub chatroom_name: String,
}

/// Member count of the room the receiver is in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomOccupancyUpdate {
    #[serde(rename = "response")]
    pub count: usize,
}

// ========================================
// Packet
// ========================================

/// A decoded wire message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Packet {
    SendMessage(SendMessage),
    MessageDelivered(MessageDelivered),
    IdentityRequest(IdentityRequest),
    IdentityResponse(BooleanResponse),
    RoomListRequest,
    RoomListResponse(RoomListResponse),
    JoinRoomRequest(JoinRoomRequest),
    JoinRoomResponse(BooleanResponse),
    LeaveRoomRequest,
    LeaveRoomResponse(BooleanResponse),
    RoomOccupancyUpdate(RoomOccupancyUpdate),
    LivenessProbe,
    LivenessAck,
}

impl Packet {
    pub fn send_message(message: impl Into<String>) -> Self {
        Packet::SendMessage(SendMessage {
            message: message.into(),
        })
    }

    pub fn message_delivered(author: impl Into<String>, message: impl Into<String>) -> Self {
        Packet::MessageDelivered(MessageDelivered {
            author: author.into(),
            message: message.into(),
        })
    }

    pub fn identity_request(username: impl Into<String>) -> Self {
        Packet::IdentityRequest(IdentityRequest {
            username: username.into(),
        })
    }

    pub fn identity_response(accepted: bool) -> Self {
        Packet::IdentityResponse(BooleanResponse { response: accepted })
    }

    pub fn room_list_response(chatrooms: Vec<RoomInfo>) -> Self {
        Packet::RoomListResponse(RoomListResponse { chatrooms })
    }

    pub fn join_room_request(chatroom_name: impl Into<String>) -> Self {
        Packet::JoinRoomRequest(JoinRoomRequest {
            chatroom_name: chatroom_name.into(),
        })
    }

    pub fn join_room_response(accepted: bool) -> Self {
        Packet::JoinRoomResponse(BooleanResponse { response: accepted })
    }

    pub fn leave_room_response(accepted: bool) -> Self {
        Packet::LeaveRoomResponse(BooleanResponse { response: accepted })
    }

    pub fn room_occupancy_update(count: usize) -> Self {
        Packet::RoomOccupancyUpdate(RoomOccupancyUpdate { count })
    }

    pub fn kind(&self) -> PacketKind {
        match self {
            Packet::SendMessage(_) => PacketKind::SendMessage,
            Packet::MessageDelivered(_) => PacketKind::MessageDelivered,
            Packet::IdentityRequest(_) => PacketKind::IdentityRequest,
            Packet::IdentityResponse(_) => PacketKind::IdentityResponse,
            Packet::RoomListRequest => PacketKind::RoomListRequest,
            Packet::RoomListResponse(_) => PacketKind::RoomListResponse,
            Packet::JoinRoomRequest(_) => PacketKind::JoinRoomRequest,
            Packet::JoinRoomResponse(_) => PacketKind::JoinRoomResponse,
            Packet::LeaveRoomRequest => PacketKind::LeaveRoomRequest,
            Packet::LeaveRoomResponse(_) => PacketKind::LeaveRoomResponse,
            Packet::RoomOccupancyUpdate(_) => PacketKind::RoomOccupancyUpdate,
            Packet::LivenessProbe => PacketKind::LivenessProbe,
            Packet::LivenessAck => PacketKind::LivenessAck,
        }
    }

    /// Semantic validity of a structurally decoded message.
    pub fn is_valid(&self) -> bool {
        match self {
            Packet::SendMessage(p) => !p.message.is_empty(),
            Packet::MessageDelivered(p) => !p.author.is_empty() && !p.message.is_empty(),
            Packet::IdentityRequest(p) => is_valid_username(&p.username),
            Packet::RoomListResponse(p) => !p.chatrooms.is_empty(),
            Packet::JoinRoomRequest(p) => !p.chatroom_name.is_empty(),
            Packet::IdentityResponse(_)
            | Packet::RoomListRequest
            | Packet::JoinRoomResponse(_)
            | Packet::LeaveRoomRequest
            | Packet::LeaveRoomResponse(_)
            | Packet::RoomOccupancyUpdate(_)
            | Packet::LivenessProbe
            | Packet::LivenessAck => true,
        }
    }

    /// Serialize to a JSON text frame with the type tag attached.
    pub fn encode(&self) -> Result<String, CodecError> {
        let payload = match self {
            Packet::SendMessage(p) => serde_json::to_value(p)?,
            Packet::MessageDelivered(p) => serde_json::to_value(p)?,
            Packet::IdentityRequest(p) => serde_json::to_value(p)?,
            Packet::IdentityResponse(p)
            | Packet::JoinRoomResponse(p)
            | Packet::LeaveRoomResponse(p) => serde_json::to_value(p)?,
            Packet::RoomListResponse(p) => serde_json::to_value(p)?,
            Packet::JoinRoomRequest(p) => serde_json::to_value(p)?,
            Packet::RoomOccupancyUpdate(p) => serde_json::to_value(p)?,
            Packet::RoomListRequest
            | Packet::LeaveRoomRequest
            | Packet::LivenessProbe
            | Packet::LivenessAck => Value::Object(Map::new()),
        };

        let Value::Object(mut object) = payload else {
            return Err(CodecError::NotAnObject);
        };
        object.insert(TAG_KEY.to_string(), Value::from(self.kind().tag()));
        Ok(serde_json::to_string(&Value::Object(object))?)
    }

    /// Parse a JSON text frame: read the tag, then the payload for that kind.
    pub fn decode(text: &str) -> Result<Self, CodecError> {
        let value: Value = serde_json::from_str(text)?;
        if !value.is_object() {
            return Err(CodecError::NotAnObject);
        }
        let tag = value
            .get(TAG_KEY)
            .and_then(Value::as_u64)
            .ok_or(CodecError::MissingTag)?;
        let kind = PacketKind::from_tag(tag).ok_or(CodecError::UnknownTag(tag))?;

        Ok(match kind {
            PacketKind::SendMessage => Packet::SendMessage(payload(value)?),
            PacketKind::MessageDelivered => Packet::MessageDelivered(payload(value)?),
            PacketKind::IdentityRequest => Packet::IdentityRequest(payload(value)?),
            PacketKind::IdentityResponse => Packet::IdentityResponse(payload(value)?),
            PacketKind::RoomListRequest => Packet::RoomListRequest,
            PacketKind::RoomListResponse => Packet::RoomListResponse(payload(value)?),
            PacketKind::JoinRoomRequest => Packet::JoinRoomRequest(payload(value)?),
            PacketKind::JoinRoomResponse => Packet::JoinRoomResponse(payload(value)?),
            PacketKind::LeaveRoomRequest => Packet::LeaveRoomRequest,
            PacketKind::LeaveRoomResponse => Packet::LeaveRoomResponse(payload(value)?),
            PacketKind::RoomOccupancyUpdate => Packet::RoomOccupancyUpdate(payload(value)?),
            PacketKind::LivenessProbe => Packet::LivenessProbe,
            PacketKind::LivenessAck => Packet::LivenessAck,
        })
    }
}

fn payload<T: DeserializeOwned>(value: Value) -> Result<T, CodecError> {
    Ok(serde_json::from_value(value)?)
}

/// Username policy: 8 to 20 characters of `[A-Za-z0-9._]`, no leading or
/// trailing separator and no two separators in a row.
pub fn is_valid_username(username: &str) -> bool {
    let is_separator = |c: char| c == '.' || c == '_';

    let len = username.chars().count();
    if !(USERNAME_MIN_LEN..=USERNAME_MAX_LEN).contains(&len) {
        return false;
    }
    if !username
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || is_separator(c))
    {
        return false;
    }
    if username.starts_with(is_separator) || username.ends_with(is_separator) {
        return false;
    }

    !username
        .chars()
        .zip(username.chars().skip(1))
        .any(|(a, b)| is_separator(a) && is_separator(b))
}
