use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{
    DateRange, FineId, GiveItemError, ItemGiven, ItemId, ItemReturned, LoanId, LoanRenewed,
    LoanScheduled, LoanStatus, MemberId, Money, RenewLoanError, RenewalCount, RenewalLimit,
    ReturnItemError, ScheduleLoanError,
    fine::{self, Fine},
    item::{self, CurrentLoan, Item},
    schedule::{self, LoanTimeline, TimelineEntry},
};

// ============================================================================
// 型安全な状態パターン
// ============================================================================

/// Loan集約の共通フィールド
///
/// すべての貸出状態（Scheduled, OnLoan, Returned）で共有されるコアデータ。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoanCore {
    // 識別子
    pub loan_id: LoanId,

    // 他の集約への参照（IDのみ）
    pub item_id: ItemId,
    pub member_id: MemberId,

    // 予定の貸出期間。endが返却期限
    pub period: DateRange,
    pub renewal_count: RenewalCount,

    // 監査情報
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl LoanCore {
    /// 返却期限
    pub fn due_date(&self) -> DateTime<Utc> {
        self.period.end()
    }
}

/// 予約済み状態
///
/// ビジネスルール：
/// - 期間内であれば資料を渡せる
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduledLoan {
    #[serde(flatten)]
    pub core: LoanCore,
}

impl std::ops::Deref for ScheduledLoan {
    type Target = LoanCore;

    fn deref(&self) -> &Self::Target {
        &self.core
    }
}

/// 貸出中状態
///
/// ビジネスルール：
/// - given_atが必須（型で保証）
/// - 更新・返却が可能
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActiveLoan {
    #[serde(flatten)]
    pub core: LoanCore,
    pub given_at: DateTime<Utc>,
}

impl std::ops::Deref for ActiveLoan {
    type Target = LoanCore;

    fn deref(&self) -> &Self::Target {
        &self.core
    }
}

/// 返却の結果
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ReturnOutcome {
    /// 期限内
    OnTime,
    /// 延滞（罰金免除）
    Late { days_late: i64 },
    /// 延滞（罰金あり）
    LateFined { days_late: i64, fine_id: FineId },
}

impl ReturnOutcome {
    pub fn days_late(&self) -> i64 {
        match self {
            ReturnOutcome::OnTime => 0,
            ReturnOutcome::Late { days_late } | ReturnOutcome::LateFined { days_late, .. } => {
                *days_late
            }
        }
    }
}

/// 返却済み状態
///
/// ビジネスルール：
/// - given_at, returned_atが必須（型で保証）
/// - 操作不可（読み取り専用）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReturnedLoan {
    #[serde(flatten)]
    pub core: LoanCore,
    pub given_at: DateTime<Utc>,
    pub returned_at: DateTime<Utc>,
    pub outcome: ReturnOutcome,
}

impl std::ops::Deref for ReturnedLoan {
    type Target = LoanCore;

    fn deref(&self) -> &Self::Target {
        &self.core
    }
}

/// Loan集約の統合型
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Loan {
    Scheduled(ScheduledLoan),
    OnLoan(ActiveLoan),
    Returned(ReturnedLoan),
}

impl Loan {
    pub fn core(&self) -> &LoanCore {
        match self {
            Loan::Scheduled(loan) => &loan.core,
            Loan::OnLoan(loan) => &loan.core,
            Loan::Returned(loan) => &loan.core,
        }
    }

    pub fn loan_id(&self) -> LoanId {
        self.core().loan_id
    }

    pub fn status(&self) -> LoanStatus {
        match self {
            Loan::Scheduled(_) => LoanStatus::Scheduled,
            Loan::OnLoan(_) => LoanStatus::OnLoan,
            Loan::Returned(returned) => match returned.outcome {
                ReturnOutcome::OnTime => LoanStatus::Returned,
                ReturnOutcome::Late { .. } => LoanStatus::ReturnedLate,
                ReturnOutcome::LateFined { .. } => LoanStatus::ReturnedLateFined,
            },
        }
    }

    pub fn due_date(&self) -> DateTime<Utc> {
        self.core().due_date()
    }

    /// 資料を占有する区間
    ///
    /// 早期返却された貸出は返却時点で区間を閉じる。
    /// 延滞返却でも予定の返却期限を超えては伸ばさない（後続の予約と重ねないため）。
    pub fn occupancy(&self) -> DateRange {
        match self {
            Loan::Scheduled(loan) => loan.period,
            Loan::OnLoan(loan) => loan.period,
            Loan::Returned(loan) => DateRange::spanning(
                loan.period.start(),
                loan.returned_at.min(loan.period.end()),
            ),
        }
    }

    pub fn timeline_entry(&self) -> TimelineEntry {
        TimelineEntry {
            loan_id: self.loan_id(),
            period: self.occupancy(),
        }
    }

    /// 返却期限までの日数（負なら延滞日数）
    pub fn days_until_due(&self, as_of: DateTime<Utc>) -> i64 {
        schedule::days_until_due(self.due_date(), as_of)
    }

    pub fn is_late(&self, as_of: DateTime<Utc>) -> bool {
        schedule::is_late(self.due_date(), as_of)
    }
}

/// 延滞返却時の罰金の扱い
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FineDecision {
    Fine,
    Waive,
}

/// 貸出群から資料のタイムラインを構築する
pub fn timeline_of<'a>(loans: impl IntoIterator<Item = &'a Loan>) -> LoanTimeline {
    LoanTimeline::new(loans.into_iter().map(Loan::timeline_entry))
}

// ============================================================================
// 純粋関数
// ============================================================================

/// 純粋関数：貸出を予約する
///
/// ビジネスルール：
/// - 資料が貸出可能であること
/// - 期間が資料の既存の貸出（過去・現在・予約）と重ならず、接しもしないこと
///
/// 副作用なし。新しいScheduledLoanとイベントを返す。
pub fn schedule_loan(
    item: &Item,
    member_id: MemberId,
    period: DateRange,
    timeline: &LoanTimeline,
    scheduled_at: DateTime<Utc>,
) -> Result<(ScheduledLoan, LoanScheduled), ScheduleLoanError> {
    if !item.loanable {
        return Err(ScheduleLoanError::ItemNotLoanable);
    }

    if !timeline.accepts(&period) {
        return Err(ScheduleLoanError::Conflict);
    }

    let loan_id = LoanId::new();
    let loan = ScheduledLoan {
        core: LoanCore {
            loan_id,
            item_id: item.item_id,
            member_id,
            period,
            renewal_count: RenewalCount::new(),
            created_at: scheduled_at,
            updated_at: scheduled_at,
        },
    };

    let event = LoanScheduled {
        loan_id,
        item_id: item.item_id,
        member_id,
        start: period.start(),
        end: period.end(),
        scheduled_at,
    };

    Ok((loan, event))
}

/// 純粋関数：予約済みの資料を会員に渡す
///
/// ビジネスルール：
/// - 受け渡し日時が予約期間`[start, end]`内であること
/// - 資料が他の貸出で貸出中でないこと
///
/// 副作用なし。ActiveLoan、更新後のItem、イベントを返す。
pub fn give_item(
    loan: ScheduledLoan,
    item: &Item,
    given_at: DateTime<Utc>,
) -> Result<(ActiveLoan, Item, ItemGiven), GiveItemError> {
    if loan.item_id != item.item_id {
        return Err(GiveItemError::ItemMismatch);
    }

    if !loan.period.contains(given_at) {
        return Err(GiveItemError::OutsideScheduledPeriod);
    }

    let current = CurrentLoan {
        loan_id: loan.loan_id,
        member_id: loan.member_id,
    };
    let item = item::assign(item, current, given_at).ok_or(GiveItemError::ItemAlreadyOnLoan)?;

    let event = ItemGiven {
        loan_id: loan.loan_id,
        item_id: loan.item_id,
        member_id: loan.member_id,
        given_at,
    };

    let active = ActiveLoan {
        core: LoanCore {
            updated_at: given_at,
            ..loan.core
        },
        given_at,
    };

    Ok((active, item, event))
}

/// 返却処理の結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReturnResult {
    pub loan: ReturnedLoan,
    pub item: Item,
    pub fine: Option<Fine>,
    pub event: ItemReturned,
}

/// 純粋関数：資料を返却する
///
/// ビジネスルール：
/// - 返却日時が受け渡し日時以降であること
/// - 延滞している場合、罰金を課すか免除するかを呼び出し側が必ず指定する
///   （未指定はエラー。既定値で補わない）
/// - 罰金額 = 延滞日数 × 日額
///
/// 副作用なし。
pub fn return_item(
    loan: ActiveLoan,
    item: &Item,
    returned_at: DateTime<Utc>,
    decision: Option<FineDecision>,
    daily_rate: Money,
) -> Result<ReturnResult, ReturnItemError> {
    if loan.item_id != item.item_id {
        return Err(ReturnItemError::ItemMismatch);
    }

    if returned_at < loan.given_at {
        return Err(ReturnItemError::ReturnedBeforeGiven);
    }

    let days_late = -schedule::days_until_due(loan.due_date(), returned_at);

    let (outcome, fine) = if days_late > 0 {
        match decision {
            None => return Err(ReturnItemError::FineDecisionRequired),
            Some(FineDecision::Waive) => (ReturnOutcome::Late { days_late }, None),
            Some(FineDecision::Fine) => {
                let fine = fine::assess_fine(&loan.core, days_late, daily_rate, returned_at);
                (
                    ReturnOutcome::LateFined {
                        days_late,
                        fine_id: fine.fine_id,
                    },
                    Some(fine),
                )
            }
        }
    } else {
        (ReturnOutcome::OnTime, None)
    };

    let item = match item.current_loan {
        Some(current) if current.loan_id == loan.loan_id => item::release(item, returned_at),
        _ => item::touch(item, returned_at),
    };

    let event = ItemReturned {
        loan_id: loan.loan_id,
        item_id: loan.item_id,
        member_id: loan.member_id,
        returned_at,
        days_late: days_late.max(0),
        fine_id: fine.as_ref().map(|f| f.fine_id),
    };

    let returned = ReturnedLoan {
        core: LoanCore {
            updated_at: returned_at,
            ..loan.core
        },
        given_at: loan.given_at,
        returned_at,
        outcome,
    };

    Ok(ReturnResult {
        loan: returned,
        item,
        fine,
        event,
    })
}

/// 純粋関数：更新可能かを理由付きで判定する
pub fn check_renewable(loan: &Loan, limit: RenewalLimit) -> Result<(), RenewLoanError> {
    match loan {
        Loan::OnLoan(active) if limit.allows(active.renewal_count) => Ok(()),
        Loan::OnLoan(_) => Err(RenewLoanError::RenewalLimitReached),
        _ => Err(RenewLoanError::NotOnLoan),
    }
}

/// 純粋関数：更新可能か
pub fn is_renewable(loan: &Loan, limit: RenewalLimit) -> bool {
    check_renewable(loan, limit).is_ok()
}

/// 純粋関数：貸出を更新する（返却期限を延ばす）
///
/// ビジネスルール：
/// - 更新回数が上限に達していないこと（上限0は無制限）
/// - 新しい返却期限が現在の返却期限より後であること
/// - この貸出を除いた資料のタイムラインが`[start, new_due_date]`を受け入れること
///
/// 副作用なし。新しいActiveLoanとイベントを返す。
pub fn renew_loan(
    loan: ActiveLoan,
    new_due_date: DateTime<Utc>,
    timeline: &LoanTimeline,
    limit: RenewalLimit,
    renewed_at: DateTime<Utc>,
) -> Result<(ActiveLoan, LoanRenewed), RenewLoanError> {
    let renewal_count = loan.renewal_count.increment(limit)?;

    let old_due_date = loan.due_date();
    if new_due_date <= old_due_date {
        return Err(RenewLoanError::DueDateNotLater);
    }

    let period = loan
        .period
        .with_end(new_due_date)
        .map_err(|_| RenewLoanError::DueDateNotLater)?;

    if !timeline.without(loan.loan_id).accepts(&period) {
        return Err(RenewLoanError::Conflict);
    }

    let event = LoanRenewed {
        loan_id: loan.loan_id,
        old_due_date,
        new_due_date,
        renewed_at,
        renewal_count: renewal_count.value(),
    };

    let renewed = ActiveLoan {
        core: LoanCore {
            period,
            renewal_count,
            updated_at: renewed_at,
            ..loan.core
        },
        given_at: loan.given_at,
    };

    Ok((renewed, event))
}
