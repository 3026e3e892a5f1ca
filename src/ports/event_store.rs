use crate::domain::{events::DomainEvent, value_objects::LoanId};
use async_trait::async_trait;

use super::Result;

/// イベントストアポート
///
/// 貸出ごとの履歴を追記専用ログとして保存する。
/// 状態の真実の情報源はリポジトリであり、ここは監査用の履歴。
#[async_trait]
pub trait EventStore: Send + Sync {
    /// 貸出のイベントを追加する
    ///
    /// イベントの順序は保持される。
    async fn append(&self, loan_id: LoanId, events: Vec<DomainEvent>) -> Result<()>;

    /// 貸出のすべてのイベントを追加順に読み込む
    async fn load(&self, loan_id: LoanId) -> Result<Vec<DomainEvent>>;
}
