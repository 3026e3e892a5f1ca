mod dispatch;
mod errors;
pub mod fines;
pub mod loan;
mod lookup;
pub mod registry;

use std::sync::Arc;

use crate::config::LibrarySettings;
use crate::ports::{EventStore, FineRepository, ItemRepository, LoanRepository, MemberRepository};

pub use dispatch::{CommandOutcome, dispatch};
pub use errors::{LibraryError, Result};

/// サービスの依存関係
///
/// 振る舞い（メソッド）は持たず、各ユースケース関数に引数として渡す。
#[derive(Clone)]
pub struct ServiceDependencies {
    pub items: Arc<dyn ItemRepository>,
    pub loans: Arc<dyn LoanRepository>,
    pub fines: Arc<dyn FineRepository>,
    pub members: Arc<dyn MemberRepository>,
    pub event_store: Arc<dyn EventStore>,
    pub settings: LibrarySettings,
}
