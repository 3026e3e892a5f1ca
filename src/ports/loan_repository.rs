use crate::domain::{
    loan::Loan,
    value_objects::{ItemId, LoanId, MemberId},
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::Result;

/// 貸出リポジトリポート
#[async_trait]
pub trait LoanRepository: Send + Sync {
    /// IDで貸出を取得する
    async fn get(&self, loan_id: LoanId) -> Result<Option<Loan>>;

    /// 貸出の現在状態を保存する（upsert）
    async fn save(&self, loan: Loan) -> Result<()>;

    /// 資料のすべての貸出（過去・現在・予約）を開始日時の昇順で取得する
    ///
    /// タイムライン構築に使用される。
    async fn loans_for_item(&self, item_id: ItemId) -> Result<Vec<Loan>>;

    /// 会員のすべての貸出を取得する
    async fn loans_for_member(&self, member_id: MemberId) -> Result<Vec<Loan>>;

    /// 返却期限が`cutoff`より前の貸出中の貸出を検索する
    ///
    /// 延滞一覧に使用される。
    async fn find_late_candidates(&self, cutoff: DateTime<Utc>) -> Result<Vec<Loan>>;
}
