use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{MemberId, Money, PaymentError, fine::Fine};

/// Member集約
///
/// 未払い額は保持しない。有効な罰金の合計から支払い済み額を引いて導出する。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Member {
    pub member_id: MemberId,
    pub name: String,
    pub payments: Money,
    pub version: u64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// 純粋関数：会員を登録する
pub fn register_member(name: impl Into<String>, registered_at: DateTime<Utc>) -> Member {
    Member {
        member_id: MemberId::new(),
        name: name.into(),
        payments: Money::ZERO,
        version: 0,
        created_at: registered_at,
        updated_at: registered_at,
    }
}

/// 純粋関数：未払い額 = 有効な罰金の合計 − 支払い済み額
///
/// 他の会員の罰金は無視する。
pub fn owed_total(member: &Member, fines: &[Fine]) -> Money {
    let fined: Money = fines
        .iter()
        .filter(|fine| fine.member_id == member.member_id && fine.is_active())
        .map(|fine| fine.amount)
        .sum();
    fined - member.payments
}

/// 純粋関数：支払いを記録する
pub fn record_payment(
    member: &Member,
    amount: Money,
    fines: &[Fine],
    paid_at: DateTime<Utc>,
) -> Result<Member, PaymentError> {
    if !amount.is_positive() {
        return Err(PaymentError::NonPositiveAmount);
    }
    if amount > owed_total(member, fines) {
        return Err(PaymentError::ExceedsOwed);
    }

    Ok(Member {
        payments: member.payments + amount,
        updated_at: paid_at,
        ..member.clone()
    })
}

/// 未払い額に影響する変更を記録する（版のみ進める）
pub(crate) fn touch(member: &Member, at: DateTime<Utc>) -> Member {
    Member {
        updated_at: at,
        ..member.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{FineId, FineStatus, ItemId, LoanId};

    fn fine_for(member: &Member, minor: i64, status: FineStatus) -> Fine {
        let now = Utc::now();
        Fine {
            fine_id: FineId::new(),
            loan_id: LoanId::new(),
            item_id: ItemId::new(),
            member_id: member.member_id,
            days_late: 1,
            daily_rate: Money::from_minor(minor),
            amount: Money::from_minor(minor),
            status,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_owed_total_counts_active_fines_only() {
        let member = register_member("Ada", Utc::now());
        let fines = vec![
            fine_for(&member, 600, FineStatus::Active),
            fine_for(&member, 150, FineStatus::Cancelled),
            fine_for(&member, 40, FineStatus::Active),
        ];
        assert_eq!(owed_total(&member, &fines), Money::from_minor(640));
    }

    #[test]
    fn test_owed_total_ignores_other_members() {
        let member = register_member("Ada", Utc::now());
        let other = register_member("Grace", Utc::now());
        let fines = vec![fine_for(&other, 600, FineStatus::Active)];
        assert_eq!(owed_total(&member, &fines), Money::ZERO);
    }

    #[test]
    fn test_record_payment_reduces_owed() {
        let member = register_member("Ada", Utc::now());
        let fines = vec![fine_for(&member, 600, FineStatus::Active)];

        let paid = record_payment(&member, Money::from_minor(250), &fines, Utc::now()).unwrap();
        assert_eq!(paid.payments, Money::from_minor(250));
        assert_eq!(owed_total(&paid, &fines), Money::from_minor(350));
    }

    #[test]
    fn test_record_payment_rejects_overpayment() {
        let member = register_member("Ada", Utc::now());
        let fines = vec![fine_for(&member, 600, FineStatus::Active)];

        assert_eq!(
            record_payment(&member, Money::from_minor(601), &fines, Utc::now()),
            Err(PaymentError::ExceedsOwed)
        );
        assert_eq!(
            record_payment(&member, Money::ZERO, &fines, Utc::now()),
            Err(PaymentError::NonPositiveAmount)
        );
    }
}
