use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{FineId, ItemCondition, ItemId, LoanId, MemberId, Money, loan::FineDecision};

/// コマンド：資料を登録する
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisterItem {
    pub title: String,
    pub loanable: bool,
    pub condition: ItemCondition,
}

/// コマンド：会員を登録する
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisterMember {
    pub name: String,
}

/// コマンド：貸出を予約する
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleLoan {
    pub item_id: ItemId,
    pub member_id: MemberId,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

/// コマンド：資料をその場で貸し出す（予約と受け渡しを同時に行う）
///
/// `end`省略時は設定の貸出日数を使う。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoanItem {
    pub item_id: ItemId,
    pub member_id: MemberId,
    pub loaned_at: DateTime<Utc>,
    #[serde(default)]
    pub end: Option<DateTime<Utc>>,
}

/// コマンド：予約済みの資料を渡す
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GiveItem {
    pub loan_id: LoanId,
    pub given_at: DateTime<Utc>,
}

/// コマンド：資料を返却する
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReturnItem {
    pub loan_id: LoanId,
    pub returned_at: DateTime<Utc>,
    #[serde(default)]
    pub fine_decision: Option<FineDecision>,
}

/// コマンド：貸出を更新する
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenewLoan {
    pub loan_id: LoanId,
    pub new_due_date: DateTime<Utc>,
    pub renewed_at: DateTime<Utc>,
}

/// コマンド：罰金を取り消す
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CancelFine {
    pub fine_id: FineId,
    pub cancelled_at: DateTime<Utc>,
}

/// コマンド：支払いを記録する
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordPayment {
    pub member_id: MemberId,
    pub amount: Money,
    pub paid_at: DateTime<Utc>,
}

/// コマンド統合型
///
/// JSONでは`{"action": "schedule_loan", ...}`の形で表現される。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Command {
    RegisterItem(RegisterItem),
    RegisterMember(RegisterMember),
    ScheduleLoan(ScheduleLoan),
    LoanItem(LoanItem),
    GiveItem(GiveItem),
    ReturnItem(ReturnItem),
    RenewLoan(RenewLoan),
    CancelFine(CancelFine),
    RecordPayment(RecordPayment),
}

impl Command {
    pub fn action(&self) -> &'static str {
        match self {
            Command::RegisterItem(_) => "register_item",
            Command::RegisterMember(_) => "register_member",
            Command::ScheduleLoan(_) => "schedule_loan",
            Command::LoanItem(_) => "loan_item",
            Command::GiveItem(_) => "give_item",
            Command::ReturnItem(_) => "return_item",
            Command::RenewLoan(_) => "renew_loan",
            Command::CancelFine(_) => "cancel_fine",
            Command::RecordPayment(_) => "record_payment",
        }
    }
}
