use crate::domain::{
    loan::Loan,
    value_objects::{ItemId, LoanId, MemberId},
};
use crate::ports::Result;
use crate::ports::loan_repository::LoanRepository as LoanRepositoryTrait;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Mutex;

use super::lock;

/// In-memory implementation of LoanRepository
#[derive(Default)]
pub struct LoanRepository {
    loans: Mutex<HashMap<LoanId, Loan>>,
}

impl LoanRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn collect_sorted(&self, filter: impl Fn(&Loan) -> bool) -> Result<Vec<Loan>> {
        let mut loans: Vec<Loan> = lock(&self.loans)?
            .values()
            .filter(|loan| filter(loan))
            .cloned()
            .collect();
        loans.sort_by_key(|loan| loan.core().period.start());
        Ok(loans)
    }
}

#[async_trait]
impl LoanRepositoryTrait for LoanRepository {
    async fn get(&self, loan_id: LoanId) -> Result<Option<Loan>> {
        Ok(lock(&self.loans)?.get(&loan_id).cloned())
    }

    async fn save(&self, loan: Loan) -> Result<()> {
        lock(&self.loans)?.insert(loan.loan_id(), loan);
        Ok(())
    }

    async fn loans_for_item(&self, item_id: ItemId) -> Result<Vec<Loan>> {
        self.collect_sorted(|loan| loan.core().item_id == item_id)
    }

    async fn loans_for_member(&self, member_id: MemberId) -> Result<Vec<Loan>> {
        self.collect_sorted(|loan| loan.core().member_id == member_id)
    }

    async fn find_late_candidates(&self, cutoff: DateTime<Utc>) -> Result<Vec<Loan>> {
        self.collect_sorted(|loan| matches!(loan, Loan::OnLoan(_)) && loan.due_date() < cutoff)
    }
}
