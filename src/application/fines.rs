use serde::Serialize;

use crate::domain::{
    DomainEvent, MemberId, Money,
    commands::{CancelFine, RecordPayment},
    fine::{self, Fine},
    member,
};

use super::{Result, ServiceDependencies, lookup};

/// 罰金を取り消す
///
/// 会員のversionも進める。取消と支払いが同時に行われた場合に
/// 未払い額を超える支払いが記録されないようにするため。
pub async fn cancel_fine(deps: &ServiceDependencies, cmd: CancelFine) -> Result<Fine> {
    let current = lookup::fine(deps, cmd.fine_id).await?;
    let member = lookup::member(deps, current.member_id).await?;

    let (cancelled, event) = fine::cancel_fine(&current, cmd.cancelled_at)?;

    deps.members
        .update(member::touch(&member, cmd.cancelled_at))
        .await?;
    deps.fines.save(cancelled.clone()).await?;
    deps.event_store
        .append(cancelled.loan_id, vec![DomainEvent::FineCancelled(event)])
        .await?;

    tracing::info!(fine_id = %cmd.fine_id, amount = %cancelled.amount, "fine cancelled");
    Ok(cancelled)
}

/// 支払いを記録する
///
/// ビジネスルール：
/// - 金額が正であること
/// - 未払い額を超えないこと
///
/// 戻り値は支払い後の未払い額。
pub async fn record_payment(deps: &ServiceDependencies, cmd: RecordPayment) -> Result<Money> {
    let member = lookup::member(deps, cmd.member_id).await?;
    let fines = deps.fines.fines_for_member(cmd.member_id).await?;

    let paid = member::record_payment(&member, cmd.amount, &fines, cmd.paid_at)?;
    let saved = deps.members.update(paid).await?;
    let owed = member::owed_total(&saved, &fines);

    tracing::info!(member_id = %cmd.member_id, amount = %cmd.amount, %owed, "payment recorded");
    Ok(owed)
}

/// 会員の残高
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MemberBalance {
    pub member_id: MemberId,
    pub name: String,
    pub owed: Money,
    pub payments: Money,
    pub fines: Vec<Fine>,
}

/// 会員の未払い額と罰金一覧を取得する
pub async fn member_balance(
    deps: &ServiceDependencies,
    member_id: MemberId,
) -> Result<MemberBalance> {
    let member = lookup::member(deps, member_id).await?;
    let fines = deps.fines.fines_for_member(member_id).await?;

    Ok(MemberBalance {
        owed: member::owed_total(&member, &fines),
        member_id: member.member_id,
        name: member.name,
        payments: member.payments,
        fines,
    })
}
