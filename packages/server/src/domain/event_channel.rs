//! EventChannel trait 定義
//!
//! 接続中のクライアントへイベントを届ける publish/subscribe 経路の抽象化です。
//! 具体的な実装は Infrastructure 層が提供します（依存性の逆転）。
//!
//! ## 配送の性質
//!
//! - at-most-once: 再送・永続化・ACK なし
//! - 同一呼び出し元から同一受信者へは発行順に届く
//! - 遅い受信者が他の受信者への配送を止めることはない

use async_trait::async_trait;
use tokio::sync::mpsc;

use super::{error::EventPushError, event::StreamEvent, value_object::ConnectionId};

/// 接続ごとの送信チャンネル（シリアライズ済みのフレームを流す）
pub type PusherChannel = mpsc::UnboundedSender<String>;

/// イベント配送の抽象化
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EventChannel: Send + Sync {
    /// 接続の送信チャンネルを登録
    async fn register_client(&self, connection_id: ConnectionId, sender: PusherChannel);

    /// 接続の送信チャンネルを登録解除
    async fn unregister_client(&self, connection_id: &ConnectionId);

    /// 送信者を含む全接続へ配送
    async fn broadcast_all(&self, event: &StreamEvent);

    /// 送信者以外の全接続へ配送
    async fn broadcast_others(&self, sender: &ConnectionId, event: &StreamEvent);

    /// 指定の接続だけに配送
    ///
    /// 接続が既に存在しない場合は `EventPushError::ConnectionNotFound` を返す。
    /// 呼び出し側はこれを黙って捨ててよい。
    async fn unicast(
        &self,
        target: &ConnectionId,
        event: &StreamEvent,
    ) -> Result<(), EventPushError>;
}
