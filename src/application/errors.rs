use thiserror::Error;
use uuid::Uuid;

use crate::config::ConfigError;
use crate::domain::{
    CancelFineError, GiveItemError, PaymentError, RenewLoanError, ReturnItemError,
    ScheduleLoanError,
};
use crate::ports::RepositoryError;

/// アプリケーション層のエラー
///
/// すべてのエラーは数値コードを持つ。
/// - 1xx: 設定
/// - 2xx: 貸出の状態
/// - 3xx: 不正なパラメータ、存在しないエンティティ
/// - 4xx: 貸出・罰金操作の失敗
/// - 5xx: 永続化・ディスパッチの失敗
#[derive(Debug, Error)]
pub enum LibraryError {
    // 1xx
    #[error(transparent)]
    Config(#[from] ConfigError),

    // 2xx
    #[error("Loan is not scheduled and cannot be given out")]
    LoanNotScheduled,

    #[error("Loan is not currently on loan")]
    LoanNotOnLoan,

    #[error("Item is already on loan")]
    ItemAlreadyOnLoan,

    #[error("Fine is already cancelled")]
    FineAlreadyCancelled,

    // 3xx
    #[error("Item {0} not found")]
    ItemNotFound(Uuid),

    #[error("Member {0} not found")]
    MemberNotFound(Uuid),

    #[error("Loan {0} not found")]
    LoanNotFound(Uuid),

    #[error("Fine {0} not found")]
    FineNotFound(Uuid),

    #[error("Loan period must end after it starts")]
    InvalidPeriod,

    #[error("Item can only be given out within the scheduled period")]
    OutsideScheduledPeriod,

    #[error("Item cannot be returned before it was given out")]
    ReturnedBeforeGiven,

    #[error("Loan is late; a fine decision (fine or waive) is required")]
    FineDecisionRequired,

    #[error("New due date must be after the current due date")]
    DueDateNotLater,

    #[error("Payment amount must be positive")]
    NonPositivePayment,

    #[error("Loan does not belong to the item")]
    ItemMismatch,

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    // 4xx
    #[error("Item is not loanable")]
    ItemNotLoanable,

    #[error("Loan period conflicts with another loan of the item")]
    ScheduleConflict,

    #[error("Renewal limit reached")]
    RenewalLimitReached,

    #[error("Renewed period conflicts with another loan of the item")]
    RenewalConflict,

    #[error("Payment exceeds the amount owed")]
    PaymentExceedsOwed,

    #[error("{entity} {id} was modified concurrently, retry the operation")]
    ConcurrentModification { entity: &'static str, id: Uuid },

    // 5xx
    #[error("Storage error")]
    Storage(#[source] RepositoryError),

    #[error("Command could not be dispatched: {0}")]
    InvalidCommand(String),
}

impl LibraryError {
    /// エラーコード
    pub fn code(&self) -> u16 {
        match self {
            LibraryError::Config(e) => e.code(),

            LibraryError::LoanNotScheduled => 201,
            LibraryError::LoanNotOnLoan => 202,
            LibraryError::ItemAlreadyOnLoan => 203,
            LibraryError::FineAlreadyCancelled => 204,

            LibraryError::ItemNotFound(_) => 301,
            LibraryError::MemberNotFound(_) => 302,
            LibraryError::LoanNotFound(_) => 303,
            LibraryError::FineNotFound(_) => 304,
            LibraryError::InvalidPeriod => 305,
            LibraryError::OutsideScheduledPeriod => 306,
            LibraryError::ReturnedBeforeGiven => 307,
            LibraryError::FineDecisionRequired => 308,
            LibraryError::DueDateNotLater => 309,
            LibraryError::NonPositivePayment => 310,
            LibraryError::ItemMismatch => 311,
            LibraryError::InvalidInput(_) => 312,

            LibraryError::ItemNotLoanable => 401,
            LibraryError::ScheduleConflict => 402,
            LibraryError::RenewalLimitReached => 403,
            LibraryError::RenewalConflict => 404,
            LibraryError::PaymentExceedsOwed => 405,
            LibraryError::ConcurrentModification { .. } => 406,

            LibraryError::Storage(_) => 501,
            LibraryError::InvalidCommand(_) => 502,
        }
    }

    /// 利用者側では対処できない障害か（ログレベルの判定用）
    pub fn is_internal(&self) -> bool {
        matches!(self, LibraryError::Config(_) | LibraryError::Storage(_))
    }
}

impl From<RepositoryError> for LibraryError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::VersionConflict { entity, id, .. } => {
                LibraryError::ConcurrentModification { entity, id }
            }
            backend @ RepositoryError::Backend(_) => LibraryError::Storage(backend),
        }
    }
}

impl From<ScheduleLoanError> for LibraryError {
    fn from(err: ScheduleLoanError) -> Self {
        match err {
            ScheduleLoanError::ItemNotLoanable => LibraryError::ItemNotLoanable,
            ScheduleLoanError::InvalidPeriod => LibraryError::InvalidPeriod,
            ScheduleLoanError::Conflict => LibraryError::ScheduleConflict,
        }
    }
}

impl From<GiveItemError> for LibraryError {
    fn from(err: GiveItemError) -> Self {
        match err {
            GiveItemError::OutsideScheduledPeriod => LibraryError::OutsideScheduledPeriod,
            GiveItemError::ItemAlreadyOnLoan => LibraryError::ItemAlreadyOnLoan,
            GiveItemError::ItemMismatch => LibraryError::ItemMismatch,
        }
    }
}

impl From<ReturnItemError> for LibraryError {
    fn from(err: ReturnItemError) -> Self {
        match err {
            ReturnItemError::ReturnedBeforeGiven => LibraryError::ReturnedBeforeGiven,
            ReturnItemError::FineDecisionRequired => LibraryError::FineDecisionRequired,
            ReturnItemError::ItemMismatch => LibraryError::ItemMismatch,
        }
    }
}

impl From<RenewLoanError> for LibraryError {
    fn from(err: RenewLoanError) -> Self {
        match err {
            RenewLoanError::NotOnLoan => LibraryError::LoanNotOnLoan,
            RenewLoanError::RenewalLimitReached => LibraryError::RenewalLimitReached,
            RenewLoanError::DueDateNotLater => LibraryError::DueDateNotLater,
            RenewLoanError::Conflict => LibraryError::RenewalConflict,
        }
    }
}

impl From<CancelFineError> for LibraryError {
    fn from(err: CancelFineError) -> Self {
        match err {
            CancelFineError::AlreadyCancelled => LibraryError::FineAlreadyCancelled,
        }
    }
}

impl From<PaymentError> for LibraryError {
    fn from(err: PaymentError) -> Self {
        match err {
            PaymentError::NonPositiveAmount => LibraryError::NonPositivePayment,
            PaymentError::ExceedsOwed => LibraryError::PaymentExceedsOwed,
        }
    }
}

/// アプリケーション層の Result型
pub type Result<T> = std::result::Result<T, LibraryError>;
