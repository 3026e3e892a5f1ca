use chrono::Utc;

use crate::domain::{
    self, DateRange, DomainEvent, LoanId, ScheduleLoanError,
    commands::{GiveItem, LoanItem, RenewLoan, ReturnItem, ScheduleLoan},
    fine::Fine,
    item,
    loan::{ActiveLoan, Loan, ReturnedLoan},
};

use crate::application::{LibraryError, Result, ServiceDependencies, lookup};

/// 貸出を予約する
///
/// ビジネスルール：
/// - 会員と資料が存在すること
/// - 資料が貸出可能であること
/// - 期間が資料の他の貸出（過去・現在・予約）と重ならず、接しもしないこと
///
/// # 一貫性保証
///
/// 資料のversionを先に進めてから貸出を保存する。
/// 同じ資料への予約が同時に行われた場合、後から保存した側が
/// `ConcurrentModification`で失敗するため、重なった区間は保存されない。
pub async fn schedule_loan(deps: &ServiceDependencies, cmd: ScheduleLoan) -> Result<LoanId> {
    let period = DateRange::new(cmd.start, cmd.end).map_err(ScheduleLoanError::from)?;
    lookup::member(deps, cmd.member_id).await?;

    let item = lookup::item(deps, cmd.item_id).await?;
    let timeline = lookup::timeline(deps, cmd.item_id).await?;
    let now = Utc::now();

    let (scheduled, event) =
        domain::loan::schedule_loan(&item, cmd.member_id, period, &timeline, now)?;
    let loan_id = scheduled.loan_id;

    deps.items.update(item::touch(&item, now)).await?;
    deps.loans.save(Loan::Scheduled(scheduled)).await?;
    deps.event_store
        .append(loan_id, vec![DomainEvent::LoanScheduled(event)])
        .await?;

    tracing::info!(
        %loan_id,
        item_id = %cmd.item_id,
        start = %cmd.start,
        end = %cmd.end,
        "loan scheduled"
    );
    Ok(loan_id)
}

/// 資料をその場で貸し出す
///
/// `[loaned_at, end]`で予約し、同時に資料を渡す。
/// `end`省略時は設定の貸出日数から返却期限を決める。
pub async fn loan_item(deps: &ServiceDependencies, cmd: LoanItem) -> Result<ActiveLoan> {
    let end = match cmd.end {
        Some(end) => end,
        None => deps
            .settings
            .loan_length()
            .and_then(|length| cmd.loaned_at.checked_add_signed(length))
            .ok_or(LibraryError::InvalidPeriod)?,
    };
    let period = DateRange::new(cmd.loaned_at, end).map_err(ScheduleLoanError::from)?;
    lookup::member(deps, cmd.member_id).await?;

    let item = lookup::item(deps, cmd.item_id).await?;
    let timeline = lookup::timeline(deps, cmd.item_id).await?;

    let (scheduled, scheduled_event) =
        domain::loan::schedule_loan(&item, cmd.member_id, period, &timeline, cmd.loaned_at)?;
    let (active, item, given_event) = domain::loan::give_item(scheduled, &item, cmd.loaned_at)?;
    let loan_id = active.loan_id;

    deps.items.update(item).await?;
    deps.loans.save(Loan::OnLoan(active.clone())).await?;
    deps.event_store
        .append(
            loan_id,
            vec![
                DomainEvent::LoanScheduled(scheduled_event),
                DomainEvent::ItemGiven(given_event),
            ],
        )
        .await?;

    tracing::info!(
        %loan_id,
        item_id = %cmd.item_id,
        due_date = %active.due_date(),
        "item loaned"
    );
    Ok(active)
}

/// 予約済みの資料を会員に渡す
///
/// ビジネスルール：
/// - 貸出がScheduled状態であること
/// - 受け渡し日時が予約期間内であること
/// - 資料が他の貸出で貸出中でないこと
pub async fn give_item(deps: &ServiceDependencies, cmd: GiveItem) -> Result<ActiveLoan> {
    let scheduled = match lookup::loan(deps, cmd.loan_id).await? {
        Loan::Scheduled(scheduled) => scheduled,
        _ => return Err(LibraryError::LoanNotScheduled),
    };

    let item = lookup::item(deps, scheduled.item_id).await?;
    let (active, item, event) = domain::loan::give_item(scheduled, &item, cmd.given_at)?;

    deps.items.update(item).await?;
    deps.loans.save(Loan::OnLoan(active.clone())).await?;
    deps.event_store
        .append(cmd.loan_id, vec![DomainEvent::ItemGiven(event)])
        .await?;

    tracing::info!(loan_id = %cmd.loan_id, given_at = %cmd.given_at, "item given");
    Ok(active)
}

/// 返却処理の結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReturnReceipt {
    pub loan: ReturnedLoan,
    pub fine: Option<Fine>,
}

/// 資料を返却する
///
/// ビジネスルール：
/// - 貸出がOnLoan状態であること
/// - 延滞している場合は`fine_decision`が必須
/// - 罰金を課す場合、金額は延滞日数 × 設定の日額
pub async fn return_item(deps: &ServiceDependencies, cmd: ReturnItem) -> Result<ReturnReceipt> {
    let active = match lookup::loan(deps, cmd.loan_id).await? {
        Loan::OnLoan(active) => active,
        _ => return Err(LibraryError::LoanNotOnLoan),
    };

    let item = lookup::item(deps, active.item_id).await?;
    let result = domain::loan::return_item(
        active,
        &item,
        cmd.returned_at,
        cmd.fine_decision,
        deps.settings.fine_rate_per_day,
    )?;

    deps.items.update(result.item).await?;
    if let Some(fine) = &result.fine {
        deps.fines.save(fine.clone()).await?;
    }
    deps.loans.save(Loan::Returned(result.loan.clone())).await?;
    deps.event_store
        .append(cmd.loan_id, vec![DomainEvent::ItemReturned(result.event)])
        .await?;

    tracing::info!(
        loan_id = %cmd.loan_id,
        days_late = result.loan.outcome.days_late(),
        fined = result.fine.is_some(),
        "item returned"
    );
    Ok(ReturnReceipt {
        loan: result.loan,
        fine: result.fine,
    })
}

/// 貸出を更新する（返却期限を延ばす）
///
/// ビジネスルール：
/// - 貸出がOnLoan状態であること
/// - 更新回数が設定の上限に達していないこと（0は無制限）
/// - 新しい返却期限が現在の期限より後で、延長後の期間が他の貸出と重ならないこと
pub async fn renew_loan(deps: &ServiceDependencies, cmd: RenewLoan) -> Result<ActiveLoan> {
    let loan = lookup::loan(deps, cmd.loan_id).await?;
    domain::loan::check_renewable(&loan, deps.settings.renewal_limit)?;
    let Loan::OnLoan(active) = loan else {
        return Err(LibraryError::LoanNotOnLoan);
    };

    let item = lookup::item(deps, active.item_id).await?;
    let timeline = lookup::timeline(deps, active.item_id).await?;

    let (renewed, event) = domain::loan::renew_loan(
        active,
        cmd.new_due_date,
        &timeline,
        deps.settings.renewal_limit,
        cmd.renewed_at,
    )?;

    deps.items.update(item::touch(&item, cmd.renewed_at)).await?;
    deps.loans.save(Loan::OnLoan(renewed.clone())).await?;
    deps.event_store
        .append(cmd.loan_id, vec![DomainEvent::LoanRenewed(event)])
        .await?;

    tracing::info!(
        loan_id = %cmd.loan_id,
        new_due_date = %cmd.new_due_date,
        renewal_count = renewed.renewal_count.value(),
        "loan renewed"
    );
    Ok(renewed)
}

/// 貸出の履歴（イベント）を追加順に取得する
pub async fn loan_history(
    deps: &ServiceDependencies,
    loan_id: LoanId,
) -> Result<Vec<DomainEvent>> {
    lookup::loan(deps, loan_id).await?;
    Ok(deps.event_store.load(loan_id).await?)
}
