//! UseCase 層
//!
//! ドメイン層の trait だけに依存し、接続・受信・切断・ルーム更新・死活監視の
//! 各処理を組み立てる。

pub mod connect_session;
pub mod disconnect_session;
pub mod error;
pub mod get_rooms;
pub mod handle_message;
pub mod monitor_health;
pub mod notifier;
pub mod reconcile_rooms;

#[cfg(test)]
pub(crate) mod test_support;

pub use connect_session::ConnectSessionUseCase;
pub use disconnect_session::DisconnectSessionUseCase;
pub use error::{ProtocolError, ReconcileError};
pub use get_rooms::{GetRoomDetailError, GetRoomDetailUseCase, GetRoomsUseCase};
pub use handle_message::HandleMessageUseCase;
pub use monitor_health::MonitorHealthUseCase;
pub use notifier::Notifier;
pub use reconcile_rooms::{ReconcileOutcome, ReconcileRoomsUseCase};
