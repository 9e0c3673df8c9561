//! Infrastructure 層
//!
//! ドメイン層が定義する trait の具体的な実装（インメモリ Registry,
//! WebSocket 送信, トレンド取得）と DTO を提供する。

pub mod dto;
pub mod message_pusher;
pub mod repository;
pub mod trends;
