use crate::domain::{item::Item, value_objects::ItemId};
use async_trait::async_trait;

use super::Result;

/// 資料リポジトリポート
#[async_trait]
pub trait ItemRepository: Send + Sync {
    /// IDで資料を取得する
    async fn get(&self, item_id: ItemId) -> Result<Option<Item>>;

    /// 新しい資料を保存する（version 0）
    async fn insert(&self, item: Item) -> Result<()>;

    /// 資料を保存し、versionを1進める
    ///
    /// 保存済みのversionが`item.version`と一致しない場合は
    /// `RepositoryError::VersionConflict`を返す。
    /// 予約・受け渡し・返却・更新はすべてこれを経由するため、
    /// 同じ資料に対する「区間を読む→判定→書く」が直列化される。
    ///
    /// 戻り値は保存後の資料。
    async fn update(&self, item: Item) -> Result<Item>;
}
