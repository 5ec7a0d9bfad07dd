//! UseCase: 接続受付処理
//!
//! 新しい接続の送信チャンネルを EventChannel に登録し、現在のセッション状態
//! （`stream_state`）をその接続にだけ送ります。
//!
//! 登録とスナップショット送信は状態ロックを保持したまま行うため、
//! 後続のブロードキャストがスナップショットを追い越すことはありません。

use std::sync::Arc;

use crate::domain::{ConnectionId, EventChannel, PusherChannel, StreamEvent, StreamRepository};

/// 接続受付のユースケース
pub struct ConnectClientUseCase {
    /// 状態ストア
    store: Arc<dyn StreamRepository>,
    /// EventChannel（イベント配送の抽象化）
    event_channel: Arc<dyn EventChannel>,
}

impl ConnectClientUseCase {
    /// 新しい ConnectClientUseCase を作成
    pub fn new(store: Arc<dyn StreamRepository>, event_channel: Arc<dyn EventChannel>) -> Self {
        Self {
            store,
            event_channel,
        }
    }

    /// 接続受付を実行
    ///
    /// # Arguments
    ///
    /// * `connection_id` - トランスポートが割り当てた接続 ID
    /// * `sender` - その接続へのフレーム送信用チャンネル
    pub async fn execute(&self, connection_id: ConnectionId, sender: PusherChannel) {
        let state = self.store.lock().await;
        self.event_channel
            .register_client(connection_id.clone(), sender)
            .await;

        let snapshot = StreamEvent::StreamState(state.session.clone());
        if let Err(e) = self.event_channel.unicast(&connection_id, &snapshot).await {
            tracing::warn!("Failed to send stream state to '{}': {}", connection_id, e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::usecase::test_support::TestHarness;
    use serde_json::json;
    use tokio::sync::mpsc;

    #[tokio::test]
    async fn test_connect_pushes_offline_snapshot() {
        // テスト項目: 接続直後に OFFLINE のスナップショットが届く
        // given (前提条件):
        let harness = TestHarness::new();
        let (tx, mut rx) = mpsc::unbounded_channel();

        // when (操作):
        harness
            .connect_usecase
            .execute(ConnectionId::new("alice"), tx)
            .await;

        // then (期待する結果):
        let events = TestHarness::drain(&mut rx);
        assert_eq!(events.len(), 1);
        assert_eq!(events[0]["event"], json!("stream_state"));
        assert_eq!(events[0]["data"]["status"], json!("offline"));
        assert_eq!(events[0]["data"]["isActive"], json!(false));
    }

    #[tokio::test(start_paused = true)]
    async fn test_connect_while_live_pushes_live_snapshot() {
        // テスト項目: LIVE 中に接続すると LIVE のスナップショットが届き、参加前は視聴者に数えない
        // given (前提条件):
        let harness = TestHarness::new();
        let (admin, _admin_rx) = harness.admin().await;
        harness.go_live(&admin).await;
        let (tx, mut rx) = mpsc::unbounded_channel();

        // when (操作):
        harness
            .connect_usecase
            .execute(ConnectionId::new("late"), tx)
            .await;

        // then (期待する結果):
        let events = TestHarness::drain(&mut rx);
        assert_eq!(events[0]["data"]["status"], json!("live"));
        assert_eq!(events[0]["data"]["viewerCount"], json!(1));
        assert_eq!(events[0]["data"]["adminConnectionId"], json!(admin.as_str()));
        assert!(events[0]["data"]["startedAt"].is_string());
    }
}
