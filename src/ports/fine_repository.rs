use crate::domain::{
    fine::Fine,
    value_objects::{FineId, MemberId},
};
use async_trait::async_trait;

use super::Result;

/// 罰金リポジトリポート
#[async_trait]
pub trait FineRepository: Send + Sync {
    async fn get(&self, fine_id: FineId) -> Result<Option<Fine>>;

    /// 罰金を保存する（upsert）
    async fn save(&self, fine: Fine) -> Result<()>;

    /// 会員の罰金（取消済みを含む）を取得する
    async fn fines_for_member(&self, member_id: MemberId) -> Result<Vec<Fine>>;
}
