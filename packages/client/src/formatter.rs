//! Message formatting utilities for client display.

use hottopics_shared::{
    protocol::{Packet, RoomInfo},
    time::timestamp_to_jst_rfc3339,
};

const RULE: &str = "============================================================";

/// Message formatter for client display
pub struct MessageFormatter;

impl MessageFormatter {
    /// Format a server packet for display.
    ///
    /// Returns `None` for packets the user does not need to see
    /// (liveness traffic and client-bound requests).
    pub fn format_packet(packet: &Packet, received_at: i64) -> Option<String> {
        match packet {
            Packet::MessageDelivered(delivered) => Some(Self::format_chat_message(
                &delivered.author,
                &delivered.message,
                received_at,
            )),
            Packet::RoomListResponse(list) => Some(Self::format_room_list(&list.chatrooms)),
            Packet::IdentityResponse(answer) => Some(Self::format_answer(
                answer.response,
                "Username accepted.",
                "Username rejected.",
            )),
            Packet::JoinRoomResponse(answer) => Some(Self::format_answer(
                answer.response,
                "Joined the room. Type to chat, /leave to go back.",
                "Could not join that room. /rooms lists the open ones.",
            )),
            Packet::LeaveRoomResponse(answer) => Some(Self::format_answer(
                answer.response,
                "Left the room.",
                "You are not in a room.",
            )),
            Packet::RoomOccupancyUpdate(update) => Some(Self::format_occupancy(update.count)),
            _ => None,
        }
    }

    /// Format the list of open chatrooms
    pub fn format_room_list(rooms: &[RoomInfo]) -> String {
        let mut output = String::new();
        output.push_str(&format!("\n\n{}\nChatrooms:\n", RULE));

        if rooms.is_empty() {
            output.push_str("(No chatrooms)\n");
        } else {
            for room in rooms {
                let unit = if room.size == 1 { "user" } else { "users" };
                output.push_str(&format!("{} - {} {}\n", room.name, room.size, unit));
            }
        }

        output.push_str(RULE);
        output.push('\n');
        output
    }

    /// Format a chat message
    ///
    /// # Arguments
    ///
    /// * `from` - Username of the author
    /// * `content` - The message content
    /// * `received_at` - Unix timestamp when the message arrived (milliseconds)
    pub fn format_chat_message(from: &str, content: &str, received_at: i64) -> String {
        format!(
            "\n\n------------------------------------------------------------\n\
             @{}: {}\n\
             received at {}\n\
             ------------------------------------------------------------\n",
            from,
            content,
            timestamp_to_jst_rfc3339(received_at)
        )
    }

    pub fn format_occupancy(count: usize) -> String {
        let unit = if count == 1 { "user" } else { "users" };
        format!("\n* {} {} in this room\n", count, unit)
    }

    fn format_answer(accepted: bool, ok: &str, rejected: &str) -> String {
        format!("\n{}\n", if accepted { ok } else { rejected })
    }

    /// Usage shown after identification
    pub fn format_help() -> String {
        "Commands: /rooms, /join <room>, /leave, /quit. Anything else is sent to the room.\n"
            .to_string()
    }
}
