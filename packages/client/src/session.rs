//! One connection to the chat server, from handshake to close.

use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use hottopics_shared::{protocol::Packet, time::current_timestamp_millis};
use rustyline::{DefaultEditor, error::ReadlineError};
use tokio::sync::mpsc;
use tokio_tungstenite::{connect_async, tungstenite::protocol::Message};

use crate::{command::Command, error::ClientError};

use super::{
    formatter::MessageFormatter,
    ui::redisplay_prompt,
};

const IDENTITY_TIMEOUT: Duration = Duration::from_secs(10);

fn connection_lost() -> ClientError {
    ClientError::ConnectionError("Connection lost".to_string())
}

fn encode(packet: &Packet) -> Result<Message, ClientError> {
    packet
        .encode()
        .map(|text| Message::Text(text.into()))
        .map_err(|e| ClientError::ConnectionError(format!("Failed to encode {}: {}", packet.kind(), e)))
}

/// Run one session: claim `username`, then relay lines from `input_rx` until
/// `/quit`, Ctrl+C/Ctrl+D or a lost connection.
///
/// Returns `Ok(())` only when the user ended the session.
pub async fn run_client_session(
    url: &str,
    username: &str,
    input_rx: &mut mpsc::UnboundedReceiver<String>,
) -> Result<(), ClientError> {
    let (mut ws_stream, _) = connect_async(url)
        .await
        .map_err(|e| ClientError::ConnectionError(e.to_string()))?;
    tracing::info!("Connected to chat server!");

    // ユーザー名の登録が済むまでは他のパケットを送らない
    ws_stream
        .send(encode(&Packet::identity_request(username))?)
        .await
        .map_err(|e| ClientError::ConnectionError(e.to_string()))?;
    let accepted = tokio::time::timeout(IDENTITY_TIMEOUT, async {
        while let Some(message) = ws_stream.next().await {
            let Ok(Message::Text(text)) = message else {
                continue;
            };
            if let Ok(Packet::IdentityResponse(answer)) = Packet::decode(text.as_str()) {
                return Some(answer.response);
            }
        }
        None
    })
    .await
    .map_err(|_| ClientError::ConnectionError("No answer to the username request".to_string()))?
    .ok_or_else(connection_lost)?;

    if !accepted {
        return Err(ClientError::UsernameRejected(username.to_string()));
    }

    println!(
        "\nYou are '{}'. {}Press Ctrl+C to exit.\n",
        username,
        MessageFormatter::format_help()
    );

    let (mut write, mut read) = ws_stream.split();

    // Outbound packets from the user and the automatic liveness answers
    let (outbound_tx, mut outbound_rx) = mpsc::unbounded_channel::<Packet>();
    // 最初にルーム一覧を取得する
    let _ = outbound_tx.send(Packet::RoomListRequest);

    // Spawn a task to handle incoming messages
    let username_for_read = username.to_string();
    let ack_tx = outbound_tx.clone();
    let mut read_task = tokio::spawn(async move {
        while let Some(message) = read.next().await {
            match message {
                Ok(Message::Text(text)) => {
                    let packet = match Packet::decode(text.as_str()) {
                        Ok(packet) => packet,
                        Err(e) => {
                            tracing::warn!("Ignoring undecodable frame: {}", e);
                            continue;
                        }
                    };
                    if packet == Packet::LivenessProbe {
                        tracing::debug!("Answering liveness probe");
                        let _ = ack_tx.send(Packet::LivenessAck);
                        continue;
                    }
                    if let Some(formatted) =
                        MessageFormatter::format_packet(&packet, current_timestamp_millis())
                    {
                        print!("{}", formatted);
                        redisplay_prompt(&username_for_read);
                    }
                }
                Ok(Message::Close(_)) => {
                    tracing::info!("Server closed the connection");
                    break;
                }
                Err(e) => {
                    tracing::warn!("WebSocket read error: {}", e);
                    break;
                }
                _ => {}
            }
        }
    });

    // Spawn a task to write outbound packets to the socket
    let mut write_task = tokio::spawn(async move {
        while let Some(packet) = outbound_rx.recv().await {
            let message = match encode(&packet) {
                Ok(message) => message,
                Err(e) => {
                    tracing::error!("{}", e);
                    continue;
                }
            };
            if let Err(e) = write.send(message).await {
                tracing::warn!("Failed to send message: {}", e);
                break;
            }
        }
        let _ = write.close().await;
    });

    // 入力行は呼び出し側のリーダーから受け取る（再接続しても同じチャンネルを使う）
    let input = forward_input(input_rx, outbound_tx);
    tokio::pin!(input);

    // If any one of them completes, abort the others
    tokio::select! {
        _ = &mut read_task => {
            write_task.abort();
            Err(connection_lost())
        }
        _ = &mut write_task => {
            read_task.abort();
            Err(connection_lost())
        }
        end = &mut input => {
            read_task.abort();
            if end == InputEnd::ConnectionClosed {
                write_task.abort();
                return Err(connection_lost());
            }
            // /quit や Ctrl+D: 書き込みタスクが Close を送って終わる
            let _ = tokio::time::timeout(Duration::from_secs(1), write_task).await;
            Ok(())
        }
    }
}

/// Why [`forward_input`] stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum InputEnd {
    /// `/quit`
    Quit,
    /// The line reader is gone (Ctrl+C/Ctrl+D)
    InputClosed,
    /// The socket writer is gone
    ConnectionClosed,
}

/// Turn input lines into requests until the user quits or either side closes
///
/// Only borrows `input_rx`, so the next session keeps reading from the same
/// line reader. `outbound_tx` is dropped on return, which lets the writer
/// send its Close frame.
async fn forward_input(
    input_rx: &mut mpsc::UnboundedReceiver<String>,
    outbound_tx: mpsc::UnboundedSender<Packet>,
) -> InputEnd {
    while let Some(line) = input_rx.recv().await {
        match Command::parse(&line) {
            Ok(Command::Quit) => return InputEnd::Quit,
            Ok(command) => {
                if let Some(packet) = command.into_packet()
                    && outbound_tx.send(packet).is_err()
                {
                    return InputEnd::ConnectionClosed;
                }
            }
            Err(e) => println!("{}", e),
        }
    }
    InputEnd::InputClosed
}

/// Start the rustyline reader on its own thread
///
/// The thread lives for the whole client run; every session reads from the
/// returned receiver. It ends on Ctrl+C/Ctrl+D or when the receiver is dropped.
pub fn spawn_line_reader(prompt_text: String) -> mpsc::UnboundedReceiver<String> {
    let (input_tx, input_rx) = mpsc::unbounded_channel::<String>();

    std::thread::spawn(move || {
        let mut rl = match DefaultEditor::new() {
            Ok(rl) => rl,
            Err(e) => {
                eprintln!("Failed to initialize readline: {}", e);
                return;
            }
        };

        loop {
            match rl.readline(&prompt_text) {
                Ok(line) => {
                    let line = line.trim();
                    if !line.is_empty() {
                        rl.add_history_entry(line).ok();
                        if input_tx.send(line.to_string()).is_err() {
                            // Channel closed, exit thread
                            break;
                        }
                    }
                }
                Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => {
                    tracing::info!("Input closed");
                    break;
                }
                Err(err) => {
                    tracing::error!("Readline error: {}", err);
                    break;
                }
            }
        }
    });

    input_rx
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_forward_input_sends_requests_until_quit() {
        // テスト項目: 入力行はリクエストに変換され、/quit で止まる（以降の行は読まれない）
        // given (前提条件):
        let (input_tx, mut input_rx) = mpsc::unbounded_channel();
        let (outbound_tx, mut outbound_rx) = mpsc::unbounded_channel();
        for line in ["/join Topic1", "hello", "/quit", "/rooms"] {
            input_tx.send(line.to_string()).unwrap();
        }

        // when (操作):
        let end = forward_input(&mut input_rx, outbound_tx).await;

        // then (期待する結果):
        assert_eq!(end, InputEnd::Quit);
        assert_eq!(
            outbound_rx.recv().await,
            Some(Packet::join_room_request("Topic1"))
        );
        assert_eq!(outbound_rx.recv().await, Some(Packet::send_message("hello")));
        assert_eq!(outbound_rx.recv().await, None);
        assert_eq!(input_rx.recv().await, Some("/rooms".to_string()));
    }

    #[tokio::test]
    async fn test_input_reader_survives_lost_connection() {
        // テスト項目: 接続が切れても入力チャンネルは残り、次のセッションが同じ入力を読み続けられる
        // given (前提条件):
        let (input_tx, mut input_rx) = mpsc::unbounded_channel();
        let (first_tx, first_rx) = mpsc::unbounded_channel();
        drop(first_rx);
        input_tx.send("hello".to_string()).unwrap();

        // when (操作):
        let first = forward_input(&mut input_rx, first_tx).await;
        let (second_tx, mut second_rx) = mpsc::unbounded_channel();
        input_tx.send("again".to_string()).unwrap();
        drop(input_tx);
        let second = forward_input(&mut input_rx, second_tx).await;

        // then (期待する結果):
        assert_eq!(first, InputEnd::ConnectionClosed);
        assert_eq!(second, InputEnd::InputClosed);
        assert_eq!(second_rx.recv().await, Some(Packet::send_message("again")));
    }
}
