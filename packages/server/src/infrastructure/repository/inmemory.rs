//! InMemory Stream Repository 実装
//!
//! プロセス内に一つだけ存在する `LiveStream`（セッション状態 + クライアント登録簿）を
//! `tokio::sync::Mutex` で保持します。
//!
//! ## 直列化
//!
//! コマンド処理・遅延遷移・切断処理はすべて `lock()` で得たガードを保持したまま
//! read-modify-write を行います。これにより状態更新は一つずつ実行されます。
//! 遅延遷移の待機中はガードを保持しません。

use async_trait::async_trait;
use tokio::sync::{Mutex, MutexGuard};

use crate::domain::{ClientEntry, ConnectionId, LiveStream, StreamRepository, StreamSession};

/// インメモリのストリーム状態ストア
#[derive(Debug, Default)]
pub struct InMemoryStreamStore {
    state: Mutex<LiveStream>,
}

impl InMemoryStreamStore {
    /// OFFLINE のセッションと空の登録簿で作成
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl StreamRepository for InMemoryStreamStore {
    async fn lock(&self) -> MutexGuard<'_, LiveStream> {
        self.state.lock().await
    }

    async fn session_snapshot(&self) -> StreamSession {
        self.state.lock().await.session.clone()
    }

    async fn clients_snapshot(&self) -> Vec<(ConnectionId, ClientEntry)> {
        self.state.lock().await.clients.snapshot()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{JoinMetadata, Role, StreamStatus};

    #[tokio::test]
    async fn test_new_store_is_offline_and_empty() {
        // テスト項目: 新しいストアは OFFLINE で登録簿が空
        // given (前提条件):
        let store = InMemoryStreamStore::new();

        // when (操作):
        let state = store.lock().await;

        // then (期待する結果):
        assert_eq!(state.session.status(), StreamStatus::Offline);
        assert!(state.clients.is_empty());
    }

    #[tokio::test]
    async fn test_mutations_are_visible_in_snapshot() {
        // テスト項目: ロック中の変更がスナップショットに反映される
        // given (前提条件):
        let store = InMemoryStreamStore::new();
        let admin = ConnectionId::new("admin");

        // when (操作):
        {
            let mut state = store.lock().await;
            state
                .clients
                .register(admin.clone(), Role::Admin, JoinMetadata::new());
            state.session.set_admin(admin.clone());
            state.session.begin_starting(vec![]);
        }
        let snapshot = store.session_snapshot().await;

        // then (期待する結果):
        assert_eq!(snapshot.status(), StreamStatus::Starting);
        assert_eq!(snapshot.admin_connection_id(), Some(&admin));
    }
}
