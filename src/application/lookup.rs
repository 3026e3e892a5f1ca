use crate::domain::{
    FineId, ItemId, LoanId, MemberId,
    fine::Fine,
    item::Item,
    loan::{self, Loan},
    member::Member,
    schedule::LoanTimeline,
};

use super::{LibraryError, Result, ServiceDependencies};

pub(super) async fn item(deps: &ServiceDependencies, item_id: ItemId) -> Result<Item> {
    deps.items
        .get(item_id)
        .await?
        .ok_or(LibraryError::ItemNotFound(item_id.value()))
}

pub(super) async fn member(deps: &ServiceDependencies, member_id: MemberId) -> Result<Member> {
    deps.members
        .get(member_id)
        .await?
        .ok_or(LibraryError::MemberNotFound(member_id.value()))
}

pub(super) async fn loan(deps: &ServiceDependencies, loan_id: LoanId) -> Result<Loan> {
    deps.loans
        .get(loan_id)
        .await?
        .ok_or(LibraryError::LoanNotFound(loan_id.value()))
}

pub(super) async fn fine(deps: &ServiceDependencies, fine_id: FineId) -> Result<Fine> {
    deps.fines
        .get(fine_id)
        .await?
        .ok_or(LibraryError::FineNotFound(fine_id.value()))
}

/// 資料のすべての貸出（過去・現在・予約）からタイムラインを構築する
pub(super) async fn timeline(deps: &ServiceDependencies, item_id: ItemId) -> Result<LoanTimeline> {
    let loans = deps.loans.loans_for_item(item_id).await?;
    Ok(loan::timeline_of(&loans))
}
