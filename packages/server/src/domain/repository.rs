//! Repository trait 定義
//!
//! ドメイン層が必要とする状態アクセスのインターフェースを定義します。
//! 具体的な実装は Infrastructure 層が提供します（依存性の逆転）。

use async_trait::async_trait;
use tokio::sync::MutexGuard;

use super::{ClientEntry, ConnectionId, LiveStream, StreamSession};

/// Stream Repository trait
///
/// セッション状態とクライアント登録簿（`LiveStream` 集約）へのインターフェース。
/// UseCase 層はこの trait に依存し、Infrastructure 層の具体的な実装には依存しない。
///
/// ## 直列化
///
/// `lock` が返すガードは集約全体に対する唯一の排他ロック。
/// コマンド処理・遅延遷移・切断処理はガードを保持したまま read-modify-write を行う。
#[async_trait]
pub trait StreamRepository: Send + Sync {
    /// 集約の排他ロックを取得
    async fn lock(&self) -> MutexGuard<'_, LiveStream>;

    /// セッション状態のコピーを取得
    async fn session_snapshot(&self) -> StreamSession;

    /// join 済みクライアントを join 順に取得
    async fn clients_snapshot(&self) -> Vec<(ConnectionId, ClientEntry)>;
}
