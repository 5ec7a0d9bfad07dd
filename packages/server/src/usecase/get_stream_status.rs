//! UseCase: セッション状態の取得（診断用）

use std::sync::Arc;

use crate::domain::{StreamRepository, StreamSession};

/// セッション状態取得のユースケース
pub struct GetStreamStatusUseCase {
    store: Arc<dyn StreamRepository>,
}

impl GetStreamStatusUseCase {
    pub fn new(store: Arc<dyn StreamRepository>) -> Self {
        Self { store }
    }

    pub async fn execute(&self) -> StreamSession {
        self.store.session_snapshot().await
    }
}
