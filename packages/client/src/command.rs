//! Parsing of the lines typed at the client prompt.

use hottopics_shared::protocol::Packet;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CommandError {
    #[error("usage: /join <room>")]
    MissingRoomName,
}

/// One line of user input
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// `/rooms`
    Rooms,
    /// `/join <room>`
    Join(String),
    /// `/leave`
    Leave,
    /// `/quit`
    Quit,
    /// Anything else is chat text
    Say(String),
}

impl Command {
    /// Parse a trimmed, non-empty input line
    pub fn parse(line: &str) -> Result<Self, CommandError> {
        let (word, rest) = match line.split_once(char::is_whitespace) {
            Some((word, rest)) => (word, rest.trim()),
            None => (line, ""),
        };

        match word {
            "/rooms" if rest.is_empty() => Ok(Command::Rooms),
            "/leave" if rest.is_empty() => Ok(Command::Leave),
            "/quit" if rest.is_empty() => Ok(Command::Quit),
            "/join" if rest.is_empty() => Err(CommandError::MissingRoomName),
            // ルーム名は空白を含みうるので残り全体を使う
            "/join" => Ok(Command::Join(rest.to_string())),
            _ => Ok(Command::Say(line.to_string())),
        }
    }

    /// The request to send for this command (`/quit` sends nothing)
    pub fn into_packet(self) -> Option<Packet> {
        match self {
            Command::Rooms => Some(Packet::RoomListRequest),
            Command::Join(room) => Some(Packet::join_room_request(room)),
            Command::Leave => Some(Packet::LeaveRoomRequest),
            Command::Quit => None,
            Command::Say(text) => Some(Packet::send_message(text)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_commands() {
        // テスト項目: スラッシュコマンドが対応する Command になる
        // given (前提条件):
        let lines = ["/rooms", "/leave", "/quit", "/join Rust Lang"];

        // when (操作):
        let commands: Vec<_> = lines.iter().map(|line| Command::parse(line)).collect();

        // then (期待する結果):
        assert_eq!(
            commands,
            vec![
                Ok(Command::Rooms),
                Ok(Command::Leave),
                Ok(Command::Quit),
                Ok(Command::Join("Rust Lang".to_string())),
            ]
        );
    }

    #[test]
    fn test_join_without_room_is_an_error() {
        // テスト項目: ルーム名のない /join はエラーになる
        // given (前提条件):
        let line = "/join";

        // when (操作):
        let result = Command::parse(line);

        // then (期待する結果):
        assert_eq!(result, Err(CommandError::MissingRoomName));
    }

    #[test]
    fn test_other_lines_are_chat() {
        // テスト項目: コマンド以外（未知のスラッシュ始まりや引数付きの /rooms）はチャットとして送る
        // given (前提条件):
        let lines = ["hello world", "/shrug", "/rooms please"];

        // when (操作):
        let commands: Vec<_> = lines.iter().map(|line| Command::parse(line)).collect();

        // then (期待する結果):
        assert_eq!(
            commands,
            vec![
                Ok(Command::Say("hello world".to_string())),
                Ok(Command::Say("/shrug".to_string())),
                Ok(Command::Say("/rooms please".to_string())),
            ]
        );
    }

    #[test]
    fn test_into_packet() {
        // テスト項目: コマンドが送信するパケットに変換され、/quit は何も送らない
        // given (前提条件):
        let join = Command::Join("Rust".to_string());
        let say = Command::Say("hi".to_string());

        // when (操作):
        let join_packet = join.into_packet();
        let say_packet = say.into_packet();
        let quit_packet = Command::Quit.into_packet();

        // then (期待する結果):
        assert_eq!(join_packet, Some(Packet::join_room_request("Rust")));
        assert_eq!(say_packet, Some(Packet::send_message("hi")));
        assert_eq!(Command::Leave.into_packet(), Some(Packet::LeaveRoomRequest));
        assert_eq!(Command::Rooms.into_packet(), Some(Packet::RoomListRequest));
        assert_eq!(quit_packet, None);
    }
}
