use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{FineId, ItemId, LoanId, MemberId, Money};

/// イベント：貸出が予約された
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoanScheduled {
    pub loan_id: LoanId,
    pub item_id: ItemId,
    pub member_id: MemberId,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub scheduled_at: DateTime<Utc>,
}

/// イベント：資料が会員に渡された
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemGiven {
    pub loan_id: LoanId,
    pub item_id: ItemId,
    pub member_id: MemberId,
    pub given_at: DateTime<Utc>,
}

/// イベント：資料が返却された
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemReturned {
    pub loan_id: LoanId,
    pub item_id: ItemId,
    pub member_id: MemberId,
    pub returned_at: DateTime<Utc>,
    pub days_late: i64,
    pub fine_id: Option<FineId>,
}

/// イベント：貸出が更新された
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoanRenewed {
    pub loan_id: LoanId,
    pub old_due_date: DateTime<Utc>,
    pub new_due_date: DateTime<Utc>,
    pub renewed_at: DateTime<Utc>,
    pub renewal_count: u32,
}

/// イベント：罰金が取り消された
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FineCancelled {
    pub fine_id: FineId,
    pub loan_id: LoanId,
    pub member_id: MemberId,
    pub amount: Money,
    pub cancelled_at: DateTime<Utc>,
}

/// ドメインイベント統合型
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum DomainEvent {
    LoanScheduled(LoanScheduled),
    ItemGiven(ItemGiven),
    ItemReturned(ItemReturned),
    LoanRenewed(LoanRenewed),
    FineCancelled(FineCancelled),
}

impl DomainEvent {
    /// イベント種別（永続化の識別子）
    pub fn event_type(&self) -> &'static str {
        match self {
            DomainEvent::LoanScheduled(_) => "LoanScheduled",
            DomainEvent::ItemGiven(_) => "ItemGiven",
            DomainEvent::ItemReturned(_) => "ItemReturned",
            DomainEvent::LoanRenewed(_) => "LoanRenewed",
            DomainEvent::FineCancelled(_) => "FineCancelled",
        }
    }

    /// 発生日時
    pub fn occurred_at(&self) -> DateTime<Utc> {
        match self {
            DomainEvent::LoanScheduled(e) => e.scheduled_at,
            DomainEvent::ItemGiven(e) => e.given_at,
            DomainEvent::ItemReturned(e) => e.returned_at,
            DomainEvent::LoanRenewed(e) => e.renewed_at,
            DomainEvent::FineCancelled(e) => e.cancelled_at,
        }
    }

    /// 対象の貸出
    pub fn loan_id(&self) -> LoanId {
        match self {
            DomainEvent::LoanScheduled(e) => e.loan_id,
            DomainEvent::ItemGiven(e) => e.loan_id,
            DomainEvent::ItemReturned(e) => e.loan_id,
            DomainEvent::LoanRenewed(e) => e.loan_id,
            DomainEvent::FineCancelled(e) => e.loan_id,
        }
    }
}
