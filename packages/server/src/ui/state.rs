//! Shared application state.

use std::sync::Arc;

use crate::usecase::{
    ConnectSessionUseCase, DisconnectSessionUseCase, GetRoomDetailUseCase, GetRoomsUseCase,
    HandleMessageUseCase,
};

/// ハンドラから参照するユースケース群
pub struct AppState {
    /// ConnectSessionUseCase（接続のユースケース）
    pub connect_session_usecase: Arc<ConnectSessionUseCase>,
    /// HandleMessageUseCase（受信メッセージ処理のユースケース）
    pub handle_message_usecase: Arc<HandleMessageUseCase>,
    /// DisconnectSessionUseCase（切断のユースケース）
    pub disconnect_session_usecase: Arc<DisconnectSessionUseCase>,
    /// GetRoomsUseCase（ルーム一覧取得のユースケース）
    pub get_rooms_usecase: Arc<GetRoomsUseCase>,
    /// GetRoomDetailUseCase（ルーム詳細取得のユースケース）
    pub get_room_detail_usecase: Arc<GetRoomDetailUseCase>,
}
