use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::domain::{
    ItemCondition, ItemId, LoanId, LoanStatus, MemberId,
    item::CurrentLoan,
    loan::{self, Loan},
    schedule::TimelineEntry,
};

use crate::application::{Result, ServiceDependencies, lookup};

/// 貸出の概要
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LoanSummary {
    pub loan: Loan,
    pub status_code: u8,
    pub due_date: DateTime<Utc>,
    /// 返却期限までの日数（負なら延滞日数）
    pub days_until_due: i64,
    /// 返却済みの貸出は常にfalse
    pub is_late: bool,
    pub renewable: bool,
}

/// 貸出の概要を取得する
pub async fn loan_summary(
    deps: &ServiceDependencies,
    loan_id: LoanId,
    as_of: DateTime<Utc>,
) -> Result<LoanSummary> {
    let loan = lookup::loan(deps, loan_id).await?;
    let status = loan.status();

    Ok(LoanSummary {
        status_code: status.code(),
        due_date: loan.due_date(),
        days_until_due: loan.days_until_due(as_of),
        is_late: !status.is_terminal() && loan.is_late(as_of),
        renewable: loan::is_renewable(&loan, deps.settings.renewal_limit),
        loan,
    })
}

/// 資料の貸出状況
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ItemStatus {
    pub item_id: ItemId,
    pub title: String,
    pub loanable: bool,
    pub condition: ItemCondition,
    pub on_loan: bool,
    pub current_loan: Option<CurrentLoan>,
    /// `as_of`時点で資料を占有している貸出
    pub covering_loan: Option<TimelineEntry>,
    /// `as_of`より後に始まる貸出
    pub upcoming: Vec<TimelineEntry>,
}

/// 資料の貸出状況を取得する
pub async fn item_status(
    deps: &ServiceDependencies,
    item_id: ItemId,
    as_of: DateTime<Utc>,
) -> Result<ItemStatus> {
    let item = lookup::item(deps, item_id).await?;
    let timeline = lookup::timeline(deps, item_id).await?;

    Ok(ItemStatus {
        on_loan: item.is_currently_on_loan(),
        current_loan: item.current_loan,
        covering_loan: timeline.covering(as_of).copied(),
        upcoming: timeline.upcoming(as_of).copied().collect(),
        item_id: item.item_id,
        title: item.title,
        loanable: item.loanable,
        condition: item.condition,
    })
}

/// 会員の貸出一覧を取得する（状態で絞り込み可能）
pub async fn member_loans(
    deps: &ServiceDependencies,
    member_id: MemberId,
    status: Option<LoanStatus>,
) -> Result<Vec<Loan>> {
    lookup::member(deps, member_id).await?;
    let loans = deps.loans.loans_for_member(member_id).await?;

    Ok(match status {
        Some(status) => loans
            .into_iter()
            .filter(|loan| loan.status() == status)
            .collect(),
        None => loans,
    })
}
