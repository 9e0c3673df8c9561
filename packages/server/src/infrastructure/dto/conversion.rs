//! ドメインモデルから DTO / ワイヤーメッセージへの変換

use hottopics_shared::{
    protocol::{Packet, RoomInfo},
    time::timestamp_to_jst_rfc3339,
};

use crate::domain::{ChatMessage, Chatroom, RoomSummary};

use super::http::{MessageDto, RoomDetailDto, RoomSummaryDto};

// ========================================
// Domain → WebSocket
// ========================================

impl From<&RoomSummary> for RoomInfo {
    fn from(summary: &RoomSummary) -> Self {
        Self {
            name: summary.name.as_str().to_string(),
            size: summary.size,
        }
    }
}

impl From<&ChatMessage> for Packet {
    fn from(message: &ChatMessage) -> Self {
        Packet::message_delivered(message.author.as_str(), message.text.as_str())
    }
}

/// ルーム一覧のレスポンスを組み立てる
pub fn room_list_packet(rooms: &[RoomSummary]) -> Packet {
    Packet::room_list_response(rooms.iter().map(RoomInfo::from).collect())
}

// ========================================
// Domain → HTTP
// ========================================

impl From<RoomSummary> for RoomSummaryDto {
    fn from(summary: RoomSummary) -> Self {
        Self {
            name: summary.name.as_str().to_string(),
            size: summary.size,
            created_at: timestamp_to_jst_rfc3339(summary.created_at.value()),
        }
    }
}

impl From<&ChatMessage> for MessageDto {
    fn from(message: &ChatMessage) -> Self {
        Self {
            author: message.author.as_str().to_string(),
            message: message.text.as_str().to_string(),
            sent_at: timestamp_to_jst_rfc3339(message.sent_at.value()),
        }
    }
}

impl From<Chatroom> for RoomDetailDto {
    fn from(room: Chatroom) -> Self {
        Self {
            name: room.name.as_str().to_string(),
            size: room.member_count(),
            created_at: timestamp_to_jst_rfc3339(room.created_at.value()),
            recent_messages: room.recent_messages().map(MessageDto::from).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{MessageText, RoomName, SessionId, Timestamp, Username};

    fn chat_message() -> ChatMessage {
        ChatMessage {
            author: Username::new("alice123x".to_string()).unwrap(),
            text: MessageText::new("hi".to_string()).unwrap(),
            // 2023-01-01 00:00:00 JST
            sent_at: Timestamp::new(1672498800000),
        }
    }

    #[test]
    fn test_chat_message_to_packet() {
        // テスト項目: ChatMessage が MessageDelivered に変換される
        // given (前提条件):
        let message = chat_message();

        // when (操作):
        let packet = Packet::from(&message);

        // then (期待する結果):
        assert_eq!(packet, Packet::message_delivered("alice123x", "hi"));
    }

    #[test]
    fn test_room_list_packet_keeps_order_and_sizes() {
        // テスト項目: ルーム一覧のレスポンスに順序とメンバー数が反映される
        // given (前提条件):
        let rooms = vec![
            RoomSummary {
                name: RoomName::new("Topic1").unwrap(),
                size: 2,
                created_at: Timestamp::new(0),
            },
            RoomSummary {
                name: RoomName::new("Topic2").unwrap(),
                size: 0,
                created_at: Timestamp::new(0),
            },
        ];

        // when (操作):
        let packet = room_list_packet(&rooms);

        // then (期待する結果):
        assert_eq!(
            packet,
            Packet::room_list_response(vec![
                RoomInfo {
                    name: "Topic1".to_string(),
                    size: 2
                },
                RoomInfo {
                    name: "Topic2".to_string(),
                    size: 0
                },
            ])
        );
    }

    #[test]
    fn test_chatroom_to_detail_dto() {
        // テスト項目: Chatroom が詳細 DTO に変換され、時刻は JST 表記になる
        // given (前提条件):
        let mut room = Chatroom::new(RoomName::new("Topic1").unwrap(), Timestamp::new(1672498800000));
        room.add_member(SessionId::generate());
        room.push_message(chat_message());

        // when (操作):
        let dto = RoomDetailDto::from(room);

        // then (期待する結果):
        assert_eq!(dto.name, "Topic1");
        assert_eq!(dto.size, 1);
        assert!(dto.created_at.starts_with("2023-01-01T00:00:00"));
        assert_eq!(dto.recent_messages.len(), 1);
        assert_eq!(dto.recent_messages[0].author, "alice123x");
        assert_eq!(dto.recent_messages[0].message, "hi");
        assert!(dto.recent_messages[0].sent_at.contains("+09:00"));
    }
}
