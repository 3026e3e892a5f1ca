pub mod event_store;
pub mod fine_repository;
pub mod item_repository;
pub mod loan_repository;
pub mod member_repository;

pub use event_store::*;
pub use fine_repository::*;
pub use item_repository::*;
pub use loan_repository::*;
pub use member_repository::*;

use thiserror::Error;
use uuid::Uuid;

/// ポート層の共通エラー
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// 楽観的排他制御の失敗（読み込み後に他の要求が先に保存した）
    #[error("{entity} {id} was modified concurrently (expected version {expected})")]
    VersionConflict {
        entity: &'static str,
        id: Uuid,
        expected: u64,
    },

    /// 永続化基盤のエラー
    #[error("storage backend error")]
    Backend(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// ポート層の Result型
pub type Result<T> = std::result::Result<T, RepositoryError>;
