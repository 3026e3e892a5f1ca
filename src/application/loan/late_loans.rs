use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::domain::{
    ItemId, LoanId, MemberId, Money,
    fine,
    loan::Loan,
};

use crate::application::{Result, ServiceDependencies};

/// 延滞中の貸出
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LateLoan {
    pub loan_id: LoanId,
    pub item_id: ItemId,
    pub member_id: MemberId,
    pub due_date: DateTime<Utc>,
    pub days_late: i64,
    /// `as_of`に返却された場合の罰金
    pub projected_fine: Money,
}

/// 延滞一覧
///
/// 処理フロー：
/// 1. 返却期限が`as_of`より前の貸出中の貸出を候補として取得
/// 2. 日単位で延滞しているものだけを残す（期限当日中は延滞ではない）
/// 3. 返却期限の昇順で返す
///
/// 状態は変更しない。延滞は返却時に確定する。
pub async fn find_late_loans(
    deps: &ServiceDependencies,
    as_of: DateTime<Utc>,
) -> Result<Vec<LateLoan>> {
    let candidates = deps.loans.find_late_candidates(as_of).await?;
    let rate = deps.settings.fine_rate_per_day;

    let mut late: Vec<LateLoan> = candidates
        .iter()
        .filter_map(|loan| match loan {
            Loan::OnLoan(active) if loan.is_late(as_of) => {
                let days_late = -loan.days_until_due(as_of);
                Some(LateLoan {
                    loan_id: active.loan_id,
                    item_id: active.item_id,
                    member_id: active.member_id,
                    due_date: active.due_date(),
                    days_late,
                    projected_fine: fine::fine_amount(days_late, rate),
                })
            }
            _ => None,
        })
        .collect();
    late.sort_by_key(|loan| (loan.due_date, loan.loan_id.value()));

    tracing::debug!(candidates = candidates.len(), late = late.len(), %as_of, "late loans listed");
    Ok(late)
}
