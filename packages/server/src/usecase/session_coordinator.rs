//! UseCase: ライブ配信セッションの状態機械
//!
//! ## 状態遷移
//!
//! ```text
//! OFFLINE ──start_stream──▶ STARTING ──(starting_delay)──▶ LIVE
//!    ▲                                                      │
//!    └──────(ending_delay)────── ENDING ◀──end_stream───────┘
//! ```
//!
//! - role が必要なコマンドは、送信者が ADMIN として登録されていなければ黙って捨てる
//! - STARTING / ENDING からの遅延遷移は別タスクで実行し、待機中はロックを保持しない
//! - 遅延遷移はキャンセルされない。重なった場合は後に完了した方が勝つ（last-write-wins）
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - 各コマンドの状態変化と発行されるイベント
//! - ADMIN 以外からのコマンドが無視されること
//! - 遅延遷移の結果と、end_stream / start_stream が重なったときの結果
//!
//! ### どのような状況を想定しているか
//! - 正常系：配信開始から終了までの一連の流れ
//! - 異常系：viewer による start_stream、LIVE でない update_products
//! - エッジケース：admin 不在時の add_to_cart、遅延遷移の競合

use std::{
    sync::{
        Arc,
        atomic::{AtomicU64, Ordering},
    },
    time::Duration,
};

use tokio::task::JoinHandle;

use livestream_shared::time::Clock;

use crate::{
    config::StreamTimings,
    domain::{
        ConnectionId, EventChannel, JoinMetadata, ProductRef, Role, StreamCommand, StreamEvent,
        StreamRepository, Timestamp,
    },
};

use super::error::CommandRejected;

/// Identifies one scheduled continuation in logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct TransitionToken(u64);

impl TransitionToken {
    pub fn value(&self) -> u64 {
        self.0
    }
}

/// A continuation that will fire after its delay.
///
/// Dropping it detaches the task; the continuation still runs.
#[derive(Debug)]
pub struct ScheduledTransition {
    pub token: TransitionToken,
    pub handle: JoinHandle<()>,
}

/// The delayed half of `start_stream` / `end_stream`.
#[derive(Debug, Clone)]
enum Continuation {
    /// STARTING → LIVE, issued by `issuer`
    GoLive { issuer: ConnectionId },
    /// ENDING → OFFLINE
    Finish,
}

/// セッション状態機械（Session Coordinator）
#[derive(Clone)]
pub struct SessionCoordinator {
    /// 状態ストア（セッション状態 + 登録簿）
    store: Arc<dyn StreamRepository>,
    /// EventChannel（イベント配送の抽象化）
    event_channel: Arc<dyn EventChannel>,
    /// 時刻（startedAt 用）
    clock: Arc<dyn Clock>,
    timings: StreamTimings,
    next_token: Arc<AtomicU64>,
}

impl SessionCoordinator {
    /// 新しい SessionCoordinator を作成
    pub fn new(
        store: Arc<dyn StreamRepository>,
        event_channel: Arc<dyn EventChannel>,
        clock: Arc<dyn Clock>,
        timings: StreamTimings,
    ) -> Self {
        Self {
            store,
            event_channel,
            clock,
            timings,
            next_token: Arc::new(AtomicU64::new(1)),
        }
    }

    /// 検証済みコマンドを対応するハンドラへ振り分ける
    ///
    /// # Returns
    ///
    /// * `Ok(Some(ScheduledTransition))` - 遅延遷移を予約した（start_stream / end_stream）
    /// * `Ok(None)` - 即時に処理が完了した
    /// * `Err(CommandRejected)` - role または前提条件を満たさず無視した
    pub async fn dispatch(
        &self,
        sender: &ConnectionId,
        command: StreamCommand,
    ) -> Result<Option<ScheduledTransition>, CommandRejected> {
        match command {
            StreamCommand::AdminJoin { metadata } => {
                self.admin_join(sender, metadata).await;
                Ok(None)
            }
            StreamCommand::UserJoin { metadata } => {
                self.user_join(sender, metadata).await;
                Ok(None)
            }
            StreamCommand::StartStream { products } => {
                self.start_stream(sender, products).await.map(Some)
            }
            StreamCommand::UpdateProducts { products } => {
                self.update_products(sender, products).await.map(|()| None)
            }
            StreamCommand::EndStream => self.end_stream(sender).await.map(Some),
            StreamCommand::AddToCart {
                product,
                product_name,
            } => {
                self.add_to_cart(sender, product, product_name).await;
                Ok(None)
            }
            StreamCommand::Ping => {
                self.ping(sender).await;
                Ok(None)
            }
        }
    }

    /// 送信者を ADMIN として登録し、セッションの admin にする（後勝ち）
    pub async fn admin_join(&self, sender: &ConnectionId, metadata: JoinMetadata) {
        let mut state = self.store.lock().await;
        state.clients.register(sender.clone(), Role::Admin, metadata);
        if let Some(previous) = state.session.admin_connection_id()
            && previous != sender
        {
            tracing::warn!("Admin '{}' replaces admin '{}'", sender, previous);
        }
        state.session.set_admin(sender.clone());
        tracing::info!("Admin joined: '{}'", sender);

        self.event_channel
            .broadcast_others(sender, &StreamEvent::AdminConnected)
            .await;
    }

    /// 送信者を VIEWER として登録し、LIVE 中なら視聴者数を増やす
    pub async fn user_join(&self, sender: &ConnectionId, metadata: JoinMetadata) {
        let mut state = self.store.lock().await;
        state.clients.register(sender.clone(), Role::Viewer, metadata);
        // an admin re-joining as viewer no longer owns the session
        state.session.clear_admin_if(sender);
        tracing::info!("Viewer joined: '{}'", sender);

        if let Some(viewer_count) = state.session.viewer_joined() {
            self.event_channel
                .broadcast_all(&StreamEvent::ViewerUpdate { viewer_count })
                .await;
        }
    }

    /// STARTING に入り、`starting_delay` 後に LIVE へ遷移する
    pub async fn start_stream(
        &self,
        sender: &ConnectionId,
        products: Vec<ProductRef>,
    ) -> Result<ScheduledTransition, CommandRejected> {
        {
            let mut state = self.store.lock().await;
            if !state.clients.is_admin(sender) {
                return Err(CommandRejected::NotAdmin);
            }
            tracing::info!("Starting live stream with {} product(s)", products.len());
            state.session.begin_starting(products);
            state.session.set_admin(sender.clone());

            let event = StreamEvent::StreamStarting {
                products: state.session.products().to_vec(),
            };
            self.event_channel.broadcast_all(&event).await;
        }

        Ok(self.schedule(
            self.timings.starting_delay,
            Continuation::GoLive {
                issuer: sender.clone(),
            },
        ))
    }

    /// LIVE 中に商品リストを差し替える
    pub async fn update_products(
        &self,
        sender: &ConnectionId,
        products: Vec<ProductRef>,
    ) -> Result<(), CommandRejected> {
        let mut state = self.store.lock().await;
        if !state.clients.is_admin(sender) {
            return Err(CommandRejected::NotAdmin);
        }
        if !state.session.is_active() {
            return Err(CommandRejected::NotLive);
        }
        tracing::info!("Admin updated products: {}", products.len());
        state.session.replace_products(products);

        let event = StreamEvent::ProductsUpdated {
            products: state.session.products().to_vec(),
        };
        self.event_channel.broadcast_all(&event).await;
        Ok(())
    }

    /// ENDING に入り、`ending_delay` 後に OFFLINE へ戻る
    pub async fn end_stream(
        &self,
        sender: &ConnectionId,
    ) -> Result<ScheduledTransition, CommandRejected> {
        {
            let mut state = self.store.lock().await;
            if !state.clients.is_admin(sender) {
                return Err(CommandRejected::NotAdmin);
            }
            tracing::info!("Admin ending stream...");
            state.session.begin_ending();
            self.event_channel
                .broadcast_all(&StreamEvent::StreamEnding)
                .await;
        }

        Ok(self.schedule(self.timings.ending_delay, Continuation::Finish))
    }

    /// カート追加を現在の admin にだけ通知する（admin 不在なら何もしない）
    pub async fn add_to_cart(
        &self,
        sender: &ConnectionId,
        product: Option<ProductRef>,
        product_name: Option<String>,
    ) {
        let state = self.store.lock().await;
        tracing::info!(
            "'{}' added to cart: {}",
            sender,
            product_name
                .as_deref()
                .or(product.as_ref().map(|p| p.name.as_str()))
                .unwrap_or("(unnamed)")
        );

        let Some(admin) = state.session.admin_connection_id() else {
            return;
        };
        let event = StreamEvent::CartActivity {
            product,
            user_id: sender.clone(),
        };
        if let Err(e) = self.event_channel.unicast(admin, &event).await {
            tracing::debug!("Dropped cart_activity for admin '{}': {}", admin, e);
        }
    }

    /// 送信者に pong を返す
    pub async fn ping(&self, sender: &ConnectionId) {
        if let Err(e) = self.event_channel.unicast(sender, &StreamEvent::Pong).await {
            tracing::debug!("Dropped pong for '{}': {}", sender, e);
        }
    }

    fn schedule(&self, delay: Duration, continuation: Continuation) -> ScheduledTransition {
        let token = TransitionToken(self.next_token.fetch_add(1, Ordering::Relaxed));
        tracing::debug!(
            "Scheduled transition #{} ({:?}) in {:?}",
            token.value(),
            continuation,
            delay
        );

        let this = self.clone();
        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            this.complete(token, continuation).await;
        });
        ScheduledTransition { token, handle }
    }

    /// 遅延遷移の本体。状態の再確認はせず、そのまま上書きする（last-write-wins）。
    async fn complete(&self, token: TransitionToken, continuation: Continuation) {
        let mut state = self.store.lock().await;
        match continuation {
            Continuation::GoLive { issuer } => {
                let now = Timestamp::new(self.clock.now_millis());
                state.session.go_live(now);
                // re-assert ownership only while the issuer is still a registered admin
                if state.clients.is_admin(&issuer) {
                    state.session.set_admin(issuer);
                }
                tracing::info!("Stream is now LIVE (transition #{})", token.value());

                let event = StreamEvent::StreamLive {
                    products: state.session.products().to_vec(),
                    viewer_count: state.session.viewer_count(),
                    started_at: now,
                };
                self.event_channel.broadcast_all(&event).await;
            }
            Continuation::Finish => {
                state.session.reset();
                tracing::info!("Stream ended (transition #{})", token.value());
                self.event_channel
                    .broadcast_all(&StreamEvent::StreamEnded)
                    .await;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        domain::{MockEventChannel, StreamStatus},
        infrastructure::repository::InMemoryStreamStore,
        usecase::test_support::{TestHarness, product},
    };
    use livestream_shared::time::FixedClock;
    use serde_json::json;

    #[tokio::test(start_paused = true)]
    async fn test_start_stream_goes_live_after_delay() {
        // テスト項目: admin の start_stream から遅延後に LIVE になる
        // given (前提条件):
        let harness = TestHarness::new();
        let (admin, mut admin_rx) = harness.admin().await;

        // when (操作):
        let transition = harness
            .coordinator
            .start_stream(&admin, vec![product("p1")])
            .await
            .unwrap();

        // then (期待する結果): 遅延前は STARTING
        let session = harness.store.session_snapshot().await;
        assert_eq!(session.status(), StreamStatus::Starting);
        assert!(!session.is_active());

        transition.handle.await.unwrap();

        let session = harness.store.session_snapshot().await;
        assert_eq!(session.status(), StreamStatus::Live);
        assert!(session.is_active());
        assert_eq!(session.viewer_count(), 1);
        assert_eq!(
            session.started_at(),
            Some(Timestamp::new(TestHarness::FIXED_NOW))
        );
        assert_eq!(session.admin_connection_id(), Some(&admin));

        let events = TestHarness::drain(&mut admin_rx);
        let names: Vec<_> = events.iter().map(|e| e["event"].clone()).collect();
        assert_eq!(names, vec![json!("stream_starting"), json!("stream_live")]);
        assert_eq!(events[1]["data"]["viewerCount"], json!(1));
        assert_eq!(events[1]["data"]["products"][0]["id"], json!("p1"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_continuation_does_not_block_other_commands() {
        // テスト項目: 遅延遷移の待機中も他のコマンド（ping / user_join）が処理される
        // given (前提条件):
        let harness = TestHarness::new();
        let (admin, _admin_rx) = harness.admin().await;
        let (viewer, mut viewer_rx) = harness.connect().await;
        let transition = harness
            .coordinator
            .start_stream(&admin, vec![])
            .await
            .unwrap();

        // when (操作):
        harness.coordinator.ping(&viewer).await;
        harness
            .coordinator
            .user_join(&viewer, JoinMetadata::new())
            .await;

        // then (期待する結果):
        assert!(!transition.handle.is_finished());
        let events = TestHarness::drain(&mut viewer_rx);
        assert_eq!(events.last().unwrap()["event"], json!("pong"));
        // STARTING 中の参加は視聴者数に数えない
        assert_eq!(harness.store.session_snapshot().await.viewer_count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_start_stream_by_viewer_is_ignored() {
        // テスト項目: ADMIN でない接続の start_stream は状態もイベントも変えない
        // given (前提条件):
        let harness = TestHarness::new();
        let (viewer, mut viewer_rx) = harness.viewer().await;
        let (_unjoined, mut unjoined_rx) = harness.connect().await;

        // when (操作):
        let result = harness
            .coordinator
            .start_stream(&viewer, vec![product("p1")])
            .await;
        tokio::time::sleep(Duration::from_secs(5)).await;

        // then (期待する結果):
        assert!(matches!(result, Err(CommandRejected::NotAdmin)));
        let session = harness.store.session_snapshot().await;
        assert_eq!(session.status(), StreamStatus::Offline);
        assert!(session.products().is_empty());
        assert!(TestHarness::drain(&mut viewer_rx).is_empty());
        assert!(TestHarness::drain(&mut unjoined_rx).is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_unjoined_connection_cannot_end_stream() {
        // テスト項目: join していない接続の end_stream は無視される
        // given (前提条件):
        let harness = TestHarness::new();
        let (stranger, _rx) = harness.connect().await;

        // when (操作):
        let result = harness.coordinator.end_stream(&stranger).await;

        // then (期待する結果):
        assert!(matches!(result, Err(CommandRejected::NotAdmin)));
        assert_eq!(
            harness.store.session_snapshot().await.status(),
            StreamStatus::Offline
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_viewer_joins_while_live_increment_count() {
        // テスト項目: LIVE 中の N 人の参加で視聴者数がちょうど N 増え、単調な viewer_update が N 回届く
        // given (前提条件):
        let harness = TestHarness::new();
        let (admin, mut admin_rx) = harness.admin().await;
        harness.go_live(&admin).await;
        TestHarness::drain(&mut admin_rx);

        // when (操作):
        let n = 5;
        for _ in 0..n {
            harness.viewer().await;
        }

        // then (期待する結果):
        assert_eq!(harness.store.session_snapshot().await.viewer_count(), 1 + n);
        let counts: Vec<u64> = TestHarness::drain(&mut admin_rx)
            .iter()
            .filter(|e| e["event"] == json!("viewer_update"))
            .map(|e| e["data"]["viewerCount"].as_u64().unwrap())
            .collect();
        assert_eq!(counts.len() as u64, n);
        assert!(counts.windows(2).all(|w| w[0] <= w[1]));
        assert_eq!(counts, vec![2, 3, 4, 5, 6]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_update_products_requires_live() {
        // テスト項目: LIVE でない間の update_products は無視され、LIVE 中は反映される
        // given (前提条件):
        let harness = TestHarness::new();
        let (admin, mut admin_rx) = harness.admin().await;

        // when (操作):
        let offline_result = harness
            .coordinator
            .update_products(&admin, vec![product("p1")])
            .await;
        harness.go_live(&admin).await;
        TestHarness::drain(&mut admin_rx);
        let live_result = harness
            .coordinator
            .update_products(&admin, vec![product("p2"), product("p3")])
            .await;

        // then (期待する結果):
        assert_eq!(offline_result, Err(CommandRejected::NotLive));
        assert_eq!(live_result, Ok(()));
        let session = harness.store.session_snapshot().await;
        assert_eq!(session.products().len(), 2);
        let events = TestHarness::drain(&mut admin_rx);
        assert_eq!(events.len(), 1);
        assert_eq!(events[0]["event"], json!("products_updated"));
        assert_eq!(events[0]["data"]["products"][1]["id"], json!("p3"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_end_stream_resets_after_delay() {
        // テスト項目: end_stream で ENDING を経て OFFLINE の初期値に戻る
        // given (前提条件):
        let harness = TestHarness::new();
        let (admin, mut admin_rx) = harness.admin().await;
        harness.go_live(&admin).await;
        TestHarness::drain(&mut admin_rx);

        // when (操作):
        let transition = harness.coordinator.end_stream(&admin).await.unwrap();

        // then (期待する結果):
        let session = harness.store.session_snapshot().await;
        assert_eq!(session.status(), StreamStatus::Ending);
        assert!(!session.is_active());

        transition.handle.await.unwrap();

        let session = harness.store.session_snapshot().await;
        assert_eq!(session, crate::domain::StreamSession::new());
        let names: Vec<_> = TestHarness::drain(&mut admin_rx)
            .into_iter()
            .map(|e| e["event"].clone())
            .collect();
        assert_eq!(names, vec![json!("stream_ending"), json!("stream_ended")]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_end_then_start_before_either_fires() {
        // テスト項目: end_stream 直後に start_stream した場合、後に完了する go-live が勝つ
        // given (前提条件): LIVE 中
        let harness = TestHarness::new();
        let (admin, _admin_rx) = harness.admin().await;
        harness.go_live(&admin).await;

        // when (操作): 1 秒後に OFFLINE、2 秒後に LIVE が予約される
        let end = harness.coordinator.end_stream(&admin).await.unwrap();
        let start = harness
            .coordinator
            .start_stream(&admin, vec![product("p9")])
            .await
            .unwrap();
        assert!(end.token < start.token);

        // then (期待する結果):
        end.handle.await.unwrap();
        let midway = harness.store.session_snapshot().await;
        assert_eq!(midway.status(), StreamStatus::Offline);
        assert!(midway.admin_connection_id().is_none());

        start.handle.await.unwrap();
        let session = harness.store.session_snapshot().await;
        assert_eq!(session.status(), StreamStatus::Live);
        assert!(session.is_active());
        assert_eq!(session.viewer_count(), 1);
        // end の reset で消えた admin 参照は、発行者がまだ admin なので復元される
        assert_eq!(session.admin_connection_id(), Some(&admin));
        // reset で商品リストは空になっている
        assert!(session.products().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_end_during_starting_after_go_live() {
        // テスト項目: go-live の後に完了する end_stream が勝ち、最終状態は OFFLINE
        // given (前提条件):
        let harness = TestHarness::new();
        let (admin, _admin_rx) = harness.admin().await;
        let start = harness
            .coordinator
            .start_stream(&admin, vec![])
            .await
            .unwrap();

        // when (操作): 1.5 秒後に end_stream（2.5 秒で完了）
        tokio::time::sleep(Duration::from_millis(1500)).await;
        let end = harness.coordinator.end_stream(&admin).await.unwrap();

        // then (期待する結果):
        start.handle.await.unwrap();
        assert_eq!(
            harness.store.session_snapshot().await.status(),
            StreamStatus::Live
        );
        end.handle.await.unwrap();
        assert_eq!(
            harness.store.session_snapshot().await,
            crate::domain::StreamSession::new()
        );
    }

    #[tokio::test]
    async fn test_admin_join_notifies_others_only() {
        // テスト項目: admin_join は他の接続にだけ admin_connected を送る
        // given (前提条件):
        let harness = TestHarness::new();
        let (viewer, mut viewer_rx) = harness.viewer().await;

        // when (操作):
        let (admin, mut admin_rx) = harness.admin().await;

        // then (期待する結果):
        assert!(TestHarness::drain(&mut admin_rx).is_empty());
        let events = TestHarness::drain(&mut viewer_rx);
        assert_eq!(events.len(), 1);
        assert_eq!(events[0]["event"], json!("admin_connected"));
        assert_eq!(
            harness.store.session_snapshot().await.admin_connection_id(),
            Some(&admin)
        );
        assert_ne!(admin, viewer);
    }

    #[tokio::test]
    async fn test_latest_admin_join_wins() {
        // テスト項目: 複数の admin_join は後勝ちで admin 参照を上書きする
        // given (前提条件):
        let harness = TestHarness::new();
        let (_first, _rx1) = harness.admin().await;

        // when (操作):
        let (second, _rx2) = harness.admin().await;

        // then (期待する結果):
        assert_eq!(
            harness.store.session_snapshot().await.admin_connection_id(),
            Some(&second)
        );
    }

    #[tokio::test]
    async fn test_admin_rejoining_as_viewer_releases_session() {
        // テスト項目: admin が viewer として join し直すと admin 参照が外れる
        // given (前提条件):
        let harness = TestHarness::new();
        let (admin, _rx) = harness.admin().await;

        // when (操作):
        harness
            .coordinator
            .user_join(&admin, JoinMetadata::new())
            .await;

        // then (期待する結果):
        assert!(
            harness
                .store
                .session_snapshot()
                .await
                .admin_connection_id()
                .is_none()
        );
        assert!(harness.coordinator.end_stream(&admin).await.is_err());
    }

    #[tokio::test]
    async fn test_add_to_cart_is_forwarded_to_admin_only() {
        // テスト項目: add_to_cart は admin にだけ cart_activity として届く
        // given (前提条件):
        let harness = TestHarness::new();
        let (_admin, mut admin_rx) = harness.admin().await;
        let (viewer, mut viewer_rx) = harness.viewer().await;
        TestHarness::drain(&mut admin_rx);

        // when (操作):
        harness
            .coordinator
            .add_to_cart(&viewer, Some(product("p1")), Some("Product p1".to_string()))
            .await;

        // then (期待する結果):
        let events = TestHarness::drain(&mut admin_rx);
        assert_eq!(events.len(), 1);
        assert_eq!(events[0]["event"], json!("cart_activity"));
        assert_eq!(events[0]["data"]["userId"], json!(viewer.as_str()));
        assert!(TestHarness::drain(&mut viewer_rx).is_empty());
    }

    #[tokio::test]
    async fn test_add_to_cart_without_admin_sends_nothing() {
        // テスト項目: admin がいない場合、add_to_cart はどこにも送られない
        // given (前提条件):
        let mut event_channel = MockEventChannel::new();
        event_channel.expect_unicast().times(0);
        event_channel.expect_broadcast_all().times(0);
        event_channel.expect_broadcast_others().times(0);
        let coordinator = SessionCoordinator::new(
            Arc::new(InMemoryStreamStore::new()),
            Arc::new(event_channel),
            Arc::new(FixedClock::new(0)),
            StreamTimings::default(),
        );

        // when (操作):
        coordinator
            .add_to_cart(&ConnectionId::new("viewer"), None, None)
            .await;

        // then (期待する結果): MockEventChannel の drop 時に呼び出し回数が検証される
    }

    #[tokio::test]
    async fn test_ping_replies_to_sender() {
        // テスト項目: ping には送信者にだけ pong が返る
        // given (前提条件):
        let mut event_channel = MockEventChannel::new();
        event_channel
            .expect_unicast()
            .withf(|target, event| target.as_str() == "alice" && matches!(event, StreamEvent::Pong))
            .times(1)
            .returning(|_, _| Ok(()));
        let coordinator = SessionCoordinator::new(
            Arc::new(InMemoryStreamStore::new()),
            Arc::new(event_channel),
            Arc::new(FixedClock::new(0)),
            StreamTimings::default(),
        );

        // when (操作):
        let result = coordinator
            .dispatch(&ConnectionId::new("alice"), StreamCommand::Ping)
            .await;

        // then (期待する結果):
        assert!(matches!(result, Ok(None)));
    }
}
