//! WebSocket を使った EventChannel 実装
//!
//! ## 責務
//!
//! - 接続ごとの `UnboundedSender` を管理
//! - ドメインイベントを JSON フレームにシリアライズして配送
//!
//! ## 設計ノート
//!
//! WebSocket の受付と sender の生成は UI 層（`ui/handler/websocket.rs`）で行われます。
//! この実装は生成された sender を受け取り、配送にのみ使用します。
//! 送信は unbounded channel への push なので、遅い受信者が他の受信者を待たせることはありません。

use std::{collections::HashMap, sync::Arc};

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::{
    domain::{ConnectionId, EventChannel, EventPushError, PusherChannel, StreamEvent},
    infrastructure::dto::websocket::ServerEvent,
};

/// WebSocket を使った EventChannel 実装
pub struct WebSocketEventChannel {
    /// 接続中のクライアントの sender
    ///
    /// Key: connection_id (String)
    /// Value: PusherChannel
    clients: Arc<Mutex<HashMap<String, PusherChannel>>>,
}

impl WebSocketEventChannel {
    /// 新しい WebSocketEventChannel を作成
    pub fn new(clients: Arc<Mutex<HashMap<String, PusherChannel>>>) -> Self {
        Self { clients }
    }

    /// イベントを一度だけシリアライズ
    fn encode(event: &StreamEvent) -> Option<String> {
        match serde_json::to_string(&ServerEvent::from(event)) {
            Ok(json) => Some(json),
            Err(e) => {
                tracing::warn!("Failed to serialize event '{}': {}", event.name(), e);
                None
            }
        }
    }

    async fn fan_out(&self, exclude: Option<&ConnectionId>, event: &StreamEvent) {
        let Some(json) = Self::encode(event) else {
            return;
        };

        let clients = self.clients.lock().await;
        for (id, sender) in clients.iter() {
            if exclude.is_some_and(|excluded| excluded.as_str() == id) {
                continue;
            }
            // ブロードキャストでは一部の送信失敗を許容
            if let Err(e) = sender.send(json.clone()) {
                tracing::warn!("Failed to push '{}' to '{}': {}", event.name(), id, e);
            }
        }
        tracing::debug!("Broadcasted '{}' to {} client(s)", event.name(), clients.len());
    }
}

#[async_trait]
impl EventChannel for WebSocketEventChannel {
    async fn register_client(&self, connection_id: ConnectionId, sender: PusherChannel) {
        let mut clients = self.clients.lock().await;
        tracing::debug!("Connection '{}' registered to EventChannel", connection_id);
        clients.insert(connection_id.into_string(), sender);
    }

    async fn unregister_client(&self, connection_id: &ConnectionId) {
        let mut clients = self.clients.lock().await;
        clients.remove(connection_id.as_str());
        tracing::debug!("Connection '{}' unregistered from EventChannel", connection_id);
    }

    async fn broadcast_all(&self, event: &StreamEvent) {
        self.fan_out(None, event).await;
    }

    async fn broadcast_others(&self, sender: &ConnectionId, event: &StreamEvent) {
        self.fan_out(Some(sender), event).await;
    }

    async fn unicast(
        &self,
        target: &ConnectionId,
        event: &StreamEvent,
    ) -> Result<(), EventPushError> {
        let clients = self.clients.lock().await;
        let sender = clients
            .get(target.as_str())
            .ok_or_else(|| EventPushError::ConnectionNotFound(target.as_str().to_string()))?;
        let json = Self::encode(event).ok_or_else(|| {
            EventPushError::PushFailed(format!("cannot encode '{}'", event.name()))
        })?;
        sender
            .send(json)
            .map_err(|e| EventPushError::PushFailed(e.to_string()))?;
        tracing::debug!("Pushed '{}' to '{}'", event.name(), target);
        Ok(())
    }
}
