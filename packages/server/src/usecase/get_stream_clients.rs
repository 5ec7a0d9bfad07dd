//! UseCase: join 済みクライアント一覧の取得（診断用）

use std::sync::Arc;

use crate::domain::{ClientEntry, ConnectionId, StreamRepository};

/// クライアント一覧取得のユースケース
pub struct GetStreamClientsUseCase {
    store: Arc<dyn StreamRepository>,
}

impl GetStreamClientsUseCase {
    pub fn new(store: Arc<dyn StreamRepository>) -> Self {
        Self { store }
    }

    /// join 順のクライアント一覧
    pub async fn execute(&self) -> Vec<(ConnectionId, ClientEntry)> {
        self.store.clients_snapshot().await
    }
}
