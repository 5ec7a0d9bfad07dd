//! UseCase: 切断処理（Disconnection Reconciler）
//!
//! 接続が閉じたときに一度だけ呼ばれ、セッション状態と登録簿の整合を回復します。
//!
//! - join していない接続: 何もしない
//! - ADMIN: ステータスに関係なくセッションを OFFLINE の初期値に戻し、
//!   残りの接続に `admin_disconnected` と `stream_ended` を送る
//! - VIEWER: 視聴者数が 0 より大きければ 1 減らし、`viewer_update` を送る
//! - いずれの場合も最後に登録簿から削除する
//!
//! ## テスト実装の作業記録
//!
//! ### どのような状況を想定しているか
//! - 正常系：LIVE 中の admin 切断、viewer 切断
//! - エッジケース：視聴者数 0 での viewer 切断、join 前の切断

use std::sync::Arc;

use crate::domain::{ConnectionId, EventChannel, Role, StreamEvent, StreamRepository};

/// 切断処理のユースケース
pub struct DisconnectClientUseCase {
    /// 状態ストア
    store: Arc<dyn StreamRepository>,
    /// EventChannel（イベント配送の抽象化）
    event_channel: Arc<dyn EventChannel>,
}

impl DisconnectClientUseCase {
    /// 新しい DisconnectClientUseCase を作成
    pub fn new(store: Arc<dyn StreamRepository>, event_channel: Arc<dyn EventChannel>) -> Self {
        Self {
            store,
            event_channel,
        }
    }

    /// 切断処理を実行
    ///
    /// # Returns
    ///
    /// 切断した接続が join していた場合はそのロール、していなければ `None`
    pub async fn execute(&self, connection_id: &ConnectionId) -> Option<Role> {
        let mut state = self.store.lock().await;
        // 以降のブロードキャストは残りの接続にだけ届く
        self.event_channel.unregister_client(connection_id).await;

        let role = state.clients.lookup(connection_id).map(|entry| entry.role)?;
        match role {
            Role::Admin => {
                state.session.reset();
                tracing::info!("Admin '{}' disconnected, stream forced offline", connection_id);
                self.event_channel
                    .broadcast_all(&StreamEvent::AdminDisconnected)
                    .await;
                self.event_channel
                    .broadcast_all(&StreamEvent::StreamEnded)
                    .await;
            }
            Role::Viewer => {
                if let Some(viewer_count) = state.session.viewer_left() {
                    self.event_channel
                        .broadcast_all(&StreamEvent::ViewerUpdate { viewer_count })
                        .await;
                }
                tracing::info!("Viewer '{}' disconnected", connection_id);
            }
        }

        state.clients.unregister(connection_id);
        Some(role)
    }
}
