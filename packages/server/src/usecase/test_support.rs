//! Shared fixtures for usecase tests: a real store and WebSocket event channel
//! with one mpsc receiver per simulated connection.

use std::{collections::HashMap, sync::Arc};

use tokio::sync::{Mutex, mpsc};

use livestream_shared::time::FixedClock;

use crate::{
    config::StreamTimings,
    domain::{
        ConnectionId, ConnectionIdFactory, EventChannel, JoinMetadata, ProductRef,
        StreamRepository,
    },
    infrastructure::{event_channel::WebSocketEventChannel, repository::InMemoryStreamStore},
};

use super::{ConnectClientUseCase, DisconnectClientUseCase, SessionCoordinator};

pub fn product(id: &str) -> ProductRef {
    ProductRef {
        id: id.to_string(),
        name: format!("Product {id}"),
        price: 12.5,
        image: None,
    }
}

pub struct TestHarness {
    pub store: Arc<dyn StreamRepository>,
    pub event_channel: Arc<dyn EventChannel>,
    pub coordinator: SessionCoordinator,
    pub connect_usecase: ConnectClientUseCase,
    pub disconnect_usecase: DisconnectClientUseCase,
}

impl TestHarness {
    pub const FIXED_NOW: i64 = 1_700_000_000_000;

    pub fn new() -> Self {
        let store: Arc<dyn StreamRepository> = Arc::new(InMemoryStreamStore::new());
        let event_channel: Arc<dyn EventChannel> =
            Arc::new(WebSocketEventChannel::new(Arc::new(Mutex::new(HashMap::new()))));
        let coordinator = SessionCoordinator::new(
            store.clone(),
            event_channel.clone(),
            Arc::new(FixedClock::new(Self::FIXED_NOW)),
            StreamTimings::default(),
        );
        Self {
            connect_usecase: ConnectClientUseCase::new(store.clone(), event_channel.clone()),
            disconnect_usecase: DisconnectClientUseCase::new(store.clone(), event_channel.clone()),
            store,
            event_channel,
            coordinator,
        }
    }

    /// Open a connection and swallow its `stream_state` snapshot.
    pub async fn connect(&self) -> (ConnectionId, mpsc::UnboundedReceiver<String>) {
        let connection_id = ConnectionIdFactory::generate();
        let (tx, mut rx) = mpsc::unbounded_channel();
        self.connect_usecase.execute(connection_id.clone(), tx).await;
        let snapshot = Self::drain(&mut rx);
        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot[0]["event"], "stream_state");
        (connection_id, rx)
    }

    pub async fn admin(&self) -> (ConnectionId, mpsc::UnboundedReceiver<String>) {
        let (connection_id, rx) = self.connect().await;
        self.coordinator
            .admin_join(&connection_id, JoinMetadata::new())
            .await;
        (connection_id, rx)
    }

    pub async fn viewer(&self) -> (ConnectionId, mpsc::UnboundedReceiver<String>) {
        let (connection_id, rx) = self.connect().await;
        self.coordinator
            .user_join(&connection_id, JoinMetadata::new())
            .await;
        (connection_id, rx)
    }

    /// Start the stream as `admin` and wait for the go-live continuation.
    pub async fn go_live(&self, admin: &ConnectionId) {
        let transition = self
            .coordinator
            .start_stream(admin, vec![product("p1")])
            .await
            .expect("admin should be allowed to start");
        transition.handle.await.expect("go-live task panicked");
    }

    /// Every frame currently queued for a connection, parsed as JSON.
    pub fn drain(rx: &mut mpsc::UnboundedReceiver<String>) -> Vec<serde_json::Value> {
        let mut frames = Vec::new();
        while let Ok(frame) = rx.try_recv() {
            frames.push(serde_json::from_str(&frame).expect("frame should be JSON"));
        }
        frames
    }
}
