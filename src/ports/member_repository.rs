use crate::domain::{member::Member, value_objects::MemberId};
use async_trait::async_trait;

use super::Result;

/// 会員リポジトリポート
///
/// 会員の詳細は貸出の判定には使わない。存在確認と支払い記録のみ。
#[async_trait]
pub trait MemberRepository: Send + Sync {
    async fn get(&self, member_id: MemberId) -> Result<Option<Member>>;

    /// 新しい会員を保存する（version 0）
    async fn insert(&self, member: Member) -> Result<()>;

    /// 会員を保存し、versionを1進める
    ///
    /// 保存済みのversionが一致しない場合は`RepositoryError::VersionConflict`。
    async fn update(&self, member: Member) -> Result<Member>;
}
