use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{
    CancelFineError, FineCancelled, FineId, FineStatus, ItemId, LoanId, MemberId, Money,
    loan::LoanCore,
};

/// Fine集約 - 延滞返却に対する罰金
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fine {
    pub fine_id: FineId,
    pub loan_id: LoanId,
    pub item_id: ItemId,
    pub member_id: MemberId,
    pub days_late: i64,
    pub daily_rate: Money,
    pub amount: Money,
    pub status: FineStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Fine {
    pub fn is_active(&self) -> bool {
        self.status == FineStatus::Active
    }
}

/// 純粋関数：罰金額 = 延滞日数 × 日額（上限はi64の最大値）
pub fn fine_amount(days_late: i64, daily_rate: Money) -> Money {
    daily_rate * days_late.max(0)
}

/// 延滞した貸出に対して罰金を課す
///
/// `days_late`が正であることは呼び出し側（返却処理）で保証する。
pub(crate) fn assess_fine(
    loan: &LoanCore,
    days_late: i64,
    daily_rate: Money,
    assessed_at: DateTime<Utc>,
) -> Fine {
    Fine {
        fine_id: FineId::new(),
        loan_id: loan.loan_id,
        item_id: loan.item_id,
        member_id: loan.member_id,
        days_late,
        daily_rate,
        amount: fine_amount(days_late, daily_rate),
        status: FineStatus::Active,
        created_at: assessed_at,
        updated_at: assessed_at,
    }
}

/// 純粋関数：罰金を取り消す
pub fn cancel_fine(
    fine: &Fine,
    cancelled_at: DateTime<Utc>,
) -> Result<(Fine, FineCancelled), CancelFineError> {
    if !fine.is_active() {
        return Err(CancelFineError::AlreadyCancelled);
    }

    let cancelled = Fine {
        status: FineStatus::Cancelled,
        updated_at: cancelled_at,
        ..fine.clone()
    };

    let event = FineCancelled {
        fine_id: fine.fine_id,
        loan_id: fine.loan_id,
        member_id: fine.member_id,
        amount: fine.amount,
        cancelled_at,
    };

    Ok((cancelled, event))
}
