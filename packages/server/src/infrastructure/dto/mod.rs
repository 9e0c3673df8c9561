//! Data Transfer Objects (DTOs)
//!
//! - `http`: HTTP API のレスポンス DTO
//! - `conversion`: ドメインモデルからの変換（WebSocket 側は shared の `Packet` に変換する）

pub mod conversion;
pub mod http;

pub use conversion::room_list_packet;
