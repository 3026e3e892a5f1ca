use super::{DateRangeError, RenewalError};

/// 予約のエラー
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScheduleLoanError {
    /// 資料が貸出不可
    ItemNotLoanable,
    /// 期間が不正（終了が開始以前）
    InvalidPeriod,
    /// 既存の貸出と重なる、または接する
    Conflict,
}

impl From<DateRangeError> for ScheduleLoanError {
    fn from(err: DateRangeError) -> Self {
        match err {
            DateRangeError::EndNotAfterStart => ScheduleLoanError::InvalidPeriod,
        }
    }
}

/// 貸出（資料の受け渡し）のエラー
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GiveItemError {
    /// 受け渡し日時が予約期間外
    OutsideScheduledPeriod,
    /// 資料が既に別の貸出で貸出中
    ItemAlreadyOnLoan,
    /// 資料と貸出が一致しない
    ItemMismatch,
}

/// 返却のエラー
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReturnItemError {
    /// 返却日時が受け渡し日時より前
    ReturnedBeforeGiven,
    /// 延滞返却で罰金の可否が指定されていない
    FineDecisionRequired,
    /// 資料と貸出が一致しない
    ItemMismatch,
}

/// 更新のエラー
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenewLoanError {
    /// 貸出中ではない
    NotOnLoan,
    /// 更新回数の上限に達した
    RenewalLimitReached,
    /// 新しい返却期限が現在の期限以前
    DueDateNotLater,
    /// 延長後の期間が他の貸出と重なる
    Conflict,
}

impl From<RenewalError> for RenewLoanError {
    fn from(err: RenewalError) -> Self {
        match err {
            RenewalError::LimitReached => RenewLoanError::RenewalLimitReached,
        }
    }
}

/// 罰金取消のエラー
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CancelFineError {
    /// 既に取り消し済み
    AlreadyCancelled,
}

/// 支払いのエラー
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PaymentError {
    /// 金額が0以下
    NonPositiveAmount,
    /// 未払い額を超えている
    ExceedsOwed,
}
