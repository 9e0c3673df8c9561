//! End-to-end tests: a server bound to an ephemeral port driven by WebSocket
//! and HTTP clients.

use std::{net::SocketAddr, sync::Arc, time::Duration};

use futures_util::{SinkExt, StreamExt};
use hottopics_server::{
    config::ServerConfig,
    infrastructure::trends::StaticTrendSource,
    ui::{CHAT_PATH, Server},
};
use hottopics_shared::{
    protocol::{Packet, RoomInfo},
    time::SystemClock,
};
use tokio::{net::TcpListener, sync::oneshot, task::JoinHandle};
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async, tungstenite::Message};

const RECV_TIMEOUT: Duration = Duration::from_secs(2);

/// Helper struct to manage an in-process server
struct TestServer {
    addr: SocketAddr,
    shutdown: Option<oneshot::Sender<()>>,
    handle: JoinHandle<std::io::Result<()>>,
}

impl TestServer {
    /// Start a server whose trend source always returns `topics`
    async fn start(topics: &[&str]) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let server = Server::build(
            &ServerConfig::default(),
            Arc::new(StaticTrendSource::new(
                topics.iter().map(|topic| topic.to_string()).collect(),
            )),
            Arc::new(SystemClock),
        );
        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
        let handle = tokio::spawn(server.serve(listener, async {
            let _ = shutdown_rx.await;
        }));

        let server = TestServer {
            addr,
            shutdown: Some(shutdown_tx),
            handle,
        };
        server.wait_for_rooms(topics.len()).await;
        server
    }

    fn ws_url(&self) -> String {
        format!("ws://{}{}", self.addr, CHAT_PATH)
    }

    fn http_url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    /// The first reconciliation runs right after startup
    async fn wait_for_rooms(&self, expected: usize) {
        for _ in 0..50 {
            let rooms: Vec<serde_json::Value> = reqwest::get(self.http_url("/api/rooms"))
                .await
                .unwrap()
                .json()
                .await
                .unwrap();
            if rooms.len() == expected {
                return;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        panic!("rooms were not created in time");
    }

    async fn connect(&self) -> TestClient {
        let (ws, _) = connect_async(self.ws_url()).await.unwrap();
        TestClient { ws }
    }

    async fn shutdown(mut self) -> std::io::Result<()> {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
        tokio::time::timeout(RECV_TIMEOUT, &mut self.handle)
            .await
            .expect("server did not stop in time")
            .unwrap()
    }
}

/// Helper struct wrapping a WebSocket connection
struct TestClient {
    ws: WebSocketStream<MaybeTlsStream<tokio::net::TcpStream>>,
}

impl TestClient {
    async fn send(&mut self, packet: Packet) {
        self.ws
            .send(Message::text(packet.encode().unwrap()))
            .await
            .unwrap();
    }

    async fn send_raw(&mut self, text: &str) {
        self.ws.send(Message::text(text.to_string())).await.unwrap();
    }

    /// Next decoded packet (panics on timeout)
    async fn recv(&mut self) -> Packet {
        loop {
            let frame = tokio::time::timeout(RECV_TIMEOUT, self.ws.next())
                .await
                .expect("timed out waiting for a packet")
                .expect("connection closed")
                .unwrap();
            if let Message::Text(text) = frame {
                return Packet::decode(text.as_str()).unwrap();
            }
        }
    }

    /// Skip packets until one matches `predicate`
    async fn recv_until(&mut self, predicate: impl Fn(&Packet) -> bool) -> Packet {
        loop {
            let packet = self.recv().await;
            if predicate(&packet) {
                return packet;
            }
        }
    }

    async fn identify(&mut self, username: &str) -> bool {
        self.send(Packet::identity_request(username)).await;
        match self.recv().await {
            Packet::IdentityResponse(answer) => answer.response,
            other => panic!("unexpected packet: {:?}", other),
        }
    }

    async fn join(&mut self, room: &str) -> bool {
        self.send(Packet::join_room_request(room)).await;
        match self
            .recv_until(|packet| matches!(packet, Packet::JoinRoomResponse(_)))
            .await
        {
            Packet::JoinRoomResponse(answer) => answer.response,
            _ => unreachable!(),
        }
    }

    async fn leave(&mut self) -> bool {
        self.send(Packet::LeaveRoomRequest).await;
        match self
            .recv_until(|packet| matches!(packet, Packet::LeaveRoomResponse(_)))
            .await
        {
            Packet::LeaveRoomResponse(answer) => answer.response,
            _ => unreachable!(),
        }
    }

    async fn close(mut self) {
        self.ws.close(None).await.unwrap();
    }
}

#[tokio::test]
async fn test_identify_and_browse_rooms() {
    // テスト項目: ユーザー名を登録するとルーム一覧を取得できる
    // given (前提条件):
    let server = TestServer::start(&["RustLang", "Tokio"]).await;
    let mut alice = server.connect().await;

    // when (操作):
    let accepted = alice.identify("alice.wonder").await;
    alice.send(Packet::RoomListRequest).await;
    let rooms = alice.recv().await;

    // then (期待する結果):
    assert!(accepted);
    assert_eq!(
        rooms,
        Packet::room_list_response(vec![
            RoomInfo {
                name: "RustLang".to_string(),
                size: 0,
            },
            RoomInfo {
                name: "Tokio".to_string(),
                size: 0,
            },
        ])
    );
}

#[tokio::test]
async fn test_username_is_unique_ignoring_case() {
    // テスト項目: 大文字小文字だけが異なるユーザー名は拒否され、別名なら登録できる
    // given (前提条件):
    let server = TestServer::start(&["RustLang"]).await;
    let mut alice = server.connect().await;
    let mut imposter = server.connect().await;
    assert!(alice.identify("alice.wonder").await);

    // when (操作):
    let duplicate = imposter.identify("ALICE.WONDER").await;
    let invalid = imposter.identify("bad").await;
    let retry = imposter.identify("alice.other").await;

    // then (期待する結果):
    assert!(!duplicate);
    assert!(!invalid);
    assert!(retry);
}

#[tokio::test]
async fn test_messages_are_relayed_to_room_members() {
    // テスト項目: ルーム内の発言が発言者を含む全メンバーに届き、人数が通知される
    // given (前提条件):
    let server = TestServer::start(&["RustLang"]).await;
    let mut alice = server.connect().await;
    let mut bob = server.connect().await;
    assert!(alice.identify("alice.wonder").await);
    assert!(bob.identify("bob_builder").await);
    assert!(alice.join("RustLang").await);

    // when (操作):
    assert!(bob.join("RustLang").await);
    let occupancy = alice
        .recv_until(|packet| matches!(packet, Packet::RoomOccupancyUpdate(_)))
        .await;
    bob.send(Packet::send_message("hello")).await;

    // then (期待する結果):
    assert_eq!(occupancy, Packet::room_occupancy_update(2));
    let expected = Packet::message_delivered("bob_builder", "hello");
    assert_eq!(
        alice
            .recv_until(|packet| matches!(packet, Packet::MessageDelivered(_)))
            .await,
        expected
    );
    assert_eq!(
        bob.recv_until(|packet| matches!(packet, Packet::MessageDelivered(_)))
            .await,
        expected
    );
}

#[tokio::test]
async fn test_late_joiner_receives_recent_messages() {
    // テスト項目: 後から入室したメンバーに直近のメッセージが再送される
    // given (前提条件):
    let server = TestServer::start(&["RustLang"]).await;
    let mut alice = server.connect().await;
    let mut bob = server.connect().await;
    assert!(alice.identify("alice.wonder").await);
    assert!(bob.identify("bob_builder").await);
    assert!(alice.join("RustLang").await);
    alice.send(Packet::send_message("first")).await;
    alice.send(Packet::send_message("second")).await;
    alice
        .recv_until(|packet| *packet == Packet::message_delivered("alice.wonder", "second"))
        .await;

    // when (操作):
    bob.send(Packet::join_room_request("RustLang")).await;

    // then (期待する結果):
    assert_eq!(
        bob.recv_until(|packet| matches!(packet, Packet::JoinRoomResponse(_)))
            .await,
        Packet::join_room_response(true)
    );
    assert_eq!(
        bob.recv().await,
        Packet::message_delivered("alice.wonder", "first")
    );
    assert_eq!(
        bob.recv().await,
        Packet::message_delivered("alice.wonder", "second")
    );
}

#[tokio::test]
async fn test_leave_room_twice() {
    // テスト項目: 退室は 1 回目が成功し、2 回目は false が返る
    // given (前提条件):
    let server = TestServer::start(&["RustLang"]).await;
    let mut alice = server.connect().await;
    assert!(alice.identify("alice.wonder").await);
    assert!(alice.join("RustLang").await);

    // when (操作):
    let first = alice.leave().await;
    let second = alice.leave().await;

    // then (期待する結果):
    assert!(first);
    assert!(!second);
}

#[tokio::test]
async fn test_join_unknown_room_is_rejected() {
    // テスト項目: 存在しないルームや前後に空白を含む名前への入室は拒否される
    // given (前提条件):
    let server = TestServer::start(&["RustLang"]).await;
    let mut alice = server.connect().await;
    assert!(alice.identify("alice.wonder").await);

    // when (操作):
    let unknown = alice.join("Python").await;
    let padded = alice.join(" RustLang ").await;

    // then (期待する結果):
    assert!(!unknown);
    assert!(!padded);
}

#[tokio::test]
async fn test_invalid_frames_do_not_close_the_connection() {
    // テスト項目: 不正なフレームや状態に合わないメッセージは無視され、接続は維持される
    // given (前提条件):
    let server = TestServer::start(&["RustLang"]).await;
    let mut alice = server.connect().await;

    // when (操作):
    alice.send_raw("not json").await;
    alice.send_raw(r#"{"id": 99}"#).await;
    alice.send(Packet::RoomListRequest).await;
    alice.send(Packet::send_message("too early")).await;
    let accepted = alice.identify("alice.wonder").await;

    // then (期待する結果):
    assert!(accepted);
}

#[tokio::test]
async fn test_disconnect_updates_remaining_members() {
    // テスト項目: メンバーが切断すると残りのメンバーに人数が通知される
    // given (前提条件):
    let server = TestServer::start(&["RustLang"]).await;
    let mut alice = server.connect().await;
    let mut bob = server.connect().await;
    assert!(alice.identify("alice.wonder").await);
    assert!(bob.identify("bob_builder").await);
    assert!(alice.join("RustLang").await);
    assert!(bob.join("RustLang").await);
    alice
        .recv_until(|packet| *packet == Packet::room_occupancy_update(2))
        .await;

    // when (操作):
    bob.close().await;

    // then (期待する結果):
    assert_eq!(
        alice
            .recv_until(|packet| matches!(packet, Packet::RoomOccupancyUpdate(_)))
            .await,
        Packet::room_occupancy_update(1)
    );
}

#[tokio::test]
async fn test_http_api_reports_rooms() {
    // テスト項目: HTTP API でルーム一覧・詳細が取得でき、存在しないルームは 404 になる
    // given (前提条件):
    let server = TestServer::start(&["RustLang", "Tokio"]).await;
    let mut alice = server.connect().await;
    assert!(alice.identify("alice.wonder").await);
    assert!(alice.join("Tokio").await);
    alice.send(Packet::send_message("hi")).await;
    alice
        .recv_until(|packet| matches!(packet, Packet::MessageDelivered(_)))
        .await;

    // when (操作):
    let health: serde_json::Value = reqwest::get(server.http_url("/api/health"))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let rooms: Vec<serde_json::Value> = reqwest::get(server.http_url("/api/rooms"))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let detail: serde_json::Value = reqwest::get(server.http_url("/api/rooms/Tokio"))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let missing = reqwest::get(server.http_url("/api/rooms/Python"))
        .await
        .unwrap();

    // then (期待する結果):
    assert_eq!(health["status"], "ok");
    assert_eq!(rooms.len(), 2);
    assert_eq!(rooms[1]["name"], "Tokio");
    assert_eq!(rooms[1]["size"], 1);
    assert_eq!(detail["name"], "Tokio");
    assert_eq!(detail["recent_messages"][0]["author"], "alice.wonder");
    assert_eq!(detail["recent_messages"][0]["message"], "hi");
    assert_eq!(missing.status(), reqwest::StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_server_stops_on_shutdown() {
    // テスト項目: shutdown を受けるとサーバーと周期タスクが停止する
    // given (前提条件):
    let server = TestServer::start(&["RustLang"]).await;

    // when (操作):
    let result = server.shutdown().await;

    // then (期待する結果):
    assert!(result.is_ok());
}
