//! UseCase テスト用の共通フィクスチャ

use std::sync::Arc;

use hottopics_shared::{protocol::Packet, time::ManualClock};
use tokio::sync::mpsc;

use crate::{
    domain::{ChatroomRegistry, RoomName, SessionId, Timestamp},
    infrastructure::{
        message_pusher::WebSocketMessagePusher, repository::InMemoryChatroomRegistry,
    },
};

use super::{ConnectSessionUseCase, DisconnectSessionUseCase, HandleMessageUseCase, Notifier};

/// 接続済みクライアントの受信側
pub struct TestClient {
    pub id: SessionId,
    rx: mpsc::UnboundedReceiver<String>,
}

impl TestClient {
    /// 届いているメッセージをすべて取り出す
    pub fn drain(&mut self) -> Vec<Packet> {
        let mut packets = Vec::new();
        while let Ok(text) = self.rx.try_recv() {
            packets.push(Packet::decode(&text).unwrap());
        }
        packets
    }

    /// 送信チャンネルが閉じられたか（未読メッセージは捨てる）
    pub fn is_closed(&mut self) -> bool {
        loop {
            match self.rx.try_recv() {
                Ok(_) => continue,
                Err(mpsc::error::TryRecvError::Empty) => return false,
                Err(mpsc::error::TryRecvError::Disconnected) => return true,
            }
        }
    }
}

pub struct Fixture {
    pub registry: Arc<InMemoryChatroomRegistry>,
    pub pusher: Arc<WebSocketMessagePusher>,
    pub clock: Arc<ManualClock>,
    pub notifier: Arc<Notifier>,
    pub connect: ConnectSessionUseCase,
    pub handler: HandleMessageUseCase,
    pub disconnect: DisconnectSessionUseCase,
}

impl Fixture {
    pub fn new() -> Self {
        let registry = Arc::new(InMemoryChatroomRegistry::new());
        let pusher = Arc::new(WebSocketMessagePusher::new());
        let clock = Arc::new(ManualClock::new(0));
        let notifier = Arc::new(Notifier::new(registry.clone(), pusher.clone()));
        Self {
            connect: ConnectSessionUseCase::new(registry.clone(), pusher.clone(), clock.clone()),
            handler: HandleMessageUseCase::new(registry.clone(), notifier.clone(), clock.clone()),
            disconnect: DisconnectSessionUseCase::new(
                registry.clone(),
                pusher.clone(),
                notifier.clone(),
            ),
            registry,
            pusher,
            clock,
            notifier,
        }
    }

    pub async fn create_rooms(&self, names: &[&str]) {
        for name in names {
            self.registry
                .create_room(RoomName::new(*name).unwrap(), Timestamp::new(0))
                .await;
        }
    }

    pub async fn connect(&self) -> TestClient {
        let (tx, rx) = mpsc::unbounded_channel();
        let id = SessionId::generate();
        self.connect.execute(id, tx).await;
        TestClient { id, rx }
    }

    pub async fn send(&self, client: &TestClient, packet: Packet) {
        let text = packet.encode().unwrap();
        self.handler.execute(&client.id, &text).await.unwrap();
    }

    /// 接続してユーザー名を確定させる（受信済みメッセージは捨てる）
    pub async fn identified(&self, username: &str) -> TestClient {
        let mut client = self.connect().await;
        self.send(&client, Packet::identity_request(username)).await;
        assert_eq!(client.drain(), vec![Packet::identity_response(true)]);
        client
    }

    /// ユーザー名を確定させてルームに参加させる（受信済みメッセージは捨てる）
    pub async fn in_room(&self, username: &str, room: &str) -> TestClient {
        let mut client = self.identified(username).await;
        self.send(&client, Packet::join_room_request(room)).await;
        client.drain();
        client
    }
}
