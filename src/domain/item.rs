use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{ItemCondition, ItemId, LoanId, MemberId};

/// 現在の貸出先
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrentLoan {
    pub loan_id: LoanId,
    pub member_id: MemberId,
}

/// Item集約 - 貸出対象の所蔵品1点
///
/// `current_loan`は貸出中の判定を区間走査なしで行うためのキャッシュ。
/// `version`は楽観的排他制御に使う。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub item_id: ItemId,
    pub title: String,
    pub loanable: bool,
    pub condition: ItemCondition,
    pub current_loan: Option<CurrentLoan>,
    pub version: u64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Item {
    /// 貸出中か
    pub fn is_currently_on_loan(&self) -> bool {
        self.current_loan.is_some()
    }

    /// 現在の借り手
    pub fn current_member(&self) -> Option<MemberId> {
        self.current_loan.map(|current| current.member_id)
    }
}

/// 純粋関数：資料を登録する
pub fn register_item(
    title: impl Into<String>,
    loanable: bool,
    condition: ItemCondition,
    registered_at: DateTime<Utc>,
) -> Item {
    Item {
        item_id: ItemId::new(),
        title: title.into(),
        loanable,
        condition,
        current_loan: None,
        version: 0,
        created_at: registered_at,
        updated_at: registered_at,
    }
}

/// 純粋関数：資料を貸出先に割り当てる
///
/// 既に貸出中なら`None`。
pub(crate) fn assign(item: &Item, current: CurrentLoan, at: DateTime<Utc>) -> Option<Item> {
    if item.is_currently_on_loan() {
        return None;
    }
    Some(Item {
        current_loan: Some(current),
        updated_at: at,
        ..item.clone()
    })
}

/// 純粋関数：割り当てを解除する
pub(crate) fn release(item: &Item, at: DateTime<Utc>) -> Item {
    Item {
        current_loan: None,
        updated_at: at,
        ..item.clone()
    }
}

/// 純粋関数：タイムラインに影響する変更を記録する（版のみ進める）
pub(crate) fn touch(item: &Item, at: DateTime<Utc>) -> Item {
    Item {
        updated_at: at,
        ..item.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_item_is_not_on_loan() {
        let item = register_item("Dune", true, ItemCondition::Good, Utc::now());
        assert!(!item.is_currently_on_loan());
        assert_eq!(item.current_member(), None);
        assert_eq!(item.version, 0);
    }

    #[test]
    fn test_assign_and_release() {
        let now = Utc::now();
        let item = register_item("Dune", true, ItemCondition::Good, now);
        let current = CurrentLoan {
            loan_id: LoanId::new(),
            member_id: MemberId::new(),
        };

        let assigned = assign(&item, current, now).unwrap();
        assert!(assigned.is_currently_on_loan());
        assert_eq!(assigned.current_member(), Some(current.member_id));

        let other = CurrentLoan {
            loan_id: LoanId::new(),
            member_id: MemberId::new(),
        };
        assert!(assign(&assigned, other, now).is_none());

        let released = release(&assigned, now);
        assert!(!released.is_currently_on_loan());
    }
}
