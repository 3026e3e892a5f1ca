pub mod event_store;
pub mod fine_repository;
pub mod item_repository;
pub mod loan_repository;
pub mod member_repository;

pub use event_store::EventStore as PostgresEventStore;
pub use fine_repository::FineRepository as PostgresFineRepository;
pub use item_repository::ItemRepository as PostgresItemRepository;
pub use loan_repository::LoanRepository as PostgresLoanRepository;
pub use member_repository::MemberRepository as PostgresMemberRepository;

use crate::ports::RepositoryError;

/// マイグレーション（`migrations/`）
pub static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("./migrations");

impl From<sqlx::Error> for RepositoryError {
    fn from(err: sqlx::Error) -> Self {
        RepositoryError::Backend(Box::new(err))
    }
}

impl From<serde_json::Error> for RepositoryError {
    fn from(err: serde_json::Error) -> Self {
        RepositoryError::Backend(Box::new(err))
    }
}

/// 行データの変換失敗
fn invalid_data(message: impl Into<String>) -> RepositoryError {
    RepositoryError::Backend(Box::new(std::io::Error::new(
        std::io::ErrorKind::InvalidData,
        message.into(),
    )))
}
