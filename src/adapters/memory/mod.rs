//! In-memory adapters
//!
//! Used by tests and local runs without PostgreSQL.
//! Every repository guards its state with a `Mutex`; a poisoned lock surfaces
//! as a backend error instead of a panic.

pub mod event_store;
pub mod fine_repository;
pub mod item_repository;
pub mod loan_repository;
pub mod member_repository;

pub use event_store::EventStore;
pub use fine_repository::FineRepository;
pub use item_repository::ItemRepository;
pub use loan_repository::LoanRepository;
pub use member_repository::MemberRepository;

use crate::ports::{RepositoryError, Result};
use std::sync::{Mutex, MutexGuard};

fn lock<T>(mutex: &Mutex<T>) -> Result<MutexGuard<'_, T>> {
    mutex
        .lock()
        .map_err(|e| RepositoryError::Backend(format!("lock poisoned: {}", e).into()))
}
