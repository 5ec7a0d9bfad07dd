//! Server state shared by all handlers.

use std::sync::Arc;

use crate::usecase::{
    ConnectClientUseCase, DisconnectClientUseCase, GetStreamClientsUseCase,
    GetStreamStatusUseCase, SessionCoordinator,
};

/// Shared application state
pub struct AppState {
    /// ConnectClientUseCase（接続受付のユースケース）
    pub connect_client_usecase: Arc<ConnectClientUseCase>,
    /// DisconnectClientUseCase（切断処理のユースケース）
    pub disconnect_client_usecase: Arc<DisconnectClientUseCase>,
    /// SessionCoordinator（セッション状態機械）
    pub session_coordinator: Arc<SessionCoordinator>,
    /// GetStreamStatusUseCase（セッション状態取得のユースケース）
    pub get_stream_status_usecase: Arc<GetStreamStatusUseCase>,
    /// GetStreamClientsUseCase（クライアント一覧取得のユースケース）
    pub get_stream_clients_usecase: Arc<GetStreamClientsUseCase>,
}
