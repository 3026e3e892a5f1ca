use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::domain::{
    FineId, ItemId, LoanId, LoanStatus, MemberId, Money, commands::Command, fine::Fine,
    loan::Loan,
};

use super::{Result, ServiceDependencies, fines, loan, registry};

/// コマンドの実行結果
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum CommandOutcome {
    ItemRegistered {
        item_id: ItemId,
    },
    MemberRegistered {
        member_id: MemberId,
    },
    LoanScheduled {
        loan_id: LoanId,
    },
    ItemLoaned {
        loan_id: LoanId,
        due_date: DateTime<Utc>,
    },
    ItemGiven {
        loan_id: LoanId,
        due_date: DateTime<Utc>,
    },
    ItemReturned {
        loan_id: LoanId,
        status: LoanStatus,
        days_late: i64,
        fine: Option<Fine>,
    },
    LoanRenewed {
        loan_id: LoanId,
        due_date: DateTime<Utc>,
        renewal_count: u32,
    },
    FineCancelled {
        fine_id: FineId,
    },
    PaymentRecorded {
        member_id: MemberId,
        owed: Money,
    },
}

/// コマンドを対応するユースケースに振り分ける
///
/// 拒否されたコマンドは`warn`、永続化の障害は`error`でログに残す。
pub async fn dispatch(deps: &ServiceDependencies, command: Command) -> Result<CommandOutcome> {
    let action = command.action();
    tracing::debug!(action, "dispatching command");

    let result = execute(deps, command).await;
    if let Err(err) = &result {
        if err.is_internal() {
            tracing::error!(action, code = err.code(), error = ?err, "command failed");
        } else {
            tracing::warn!(action, code = err.code(), %err, "command rejected");
        }
    }
    result
}

async fn execute(deps: &ServiceDependencies, command: Command) -> Result<CommandOutcome> {
    match command {
        Command::RegisterItem(cmd) => {
            let item_id = registry::register_item(deps, cmd).await?;
            Ok(CommandOutcome::ItemRegistered { item_id })
        }
        Command::RegisterMember(cmd) => {
            let member_id = registry::register_member(deps, cmd).await?;
            Ok(CommandOutcome::MemberRegistered { member_id })
        }
        Command::ScheduleLoan(cmd) => {
            let loan_id = loan::schedule_loan(deps, cmd).await?;
            Ok(CommandOutcome::LoanScheduled { loan_id })
        }
        Command::LoanItem(cmd) => {
            let active = loan::loan_item(deps, cmd).await?;
            Ok(CommandOutcome::ItemLoaned {
                loan_id: active.loan_id,
                due_date: active.due_date(),
            })
        }
        Command::GiveItem(cmd) => {
            let active = loan::give_item(deps, cmd).await?;
            Ok(CommandOutcome::ItemGiven {
                loan_id: active.loan_id,
                due_date: active.due_date(),
            })
        }
        Command::ReturnItem(cmd) => {
            let receipt = loan::return_item(deps, cmd).await?;
            let days_late = receipt.loan.outcome.days_late();
            let returned = Loan::Returned(receipt.loan);
            Ok(CommandOutcome::ItemReturned {
                loan_id: returned.loan_id(),
                status: returned.status(),
                days_late,
                fine: receipt.fine,
            })
        }
        Command::RenewLoan(cmd) => {
            let renewed = loan::renew_loan(deps, cmd).await?;
            Ok(CommandOutcome::LoanRenewed {
                loan_id: renewed.loan_id,
                due_date: renewed.due_date(),
                renewal_count: renewed.renewal_count.value(),
            })
        }
        Command::CancelFine(cmd) => {
            let cancelled = fines::cancel_fine(deps, cmd).await?;
            Ok(CommandOutcome::FineCancelled {
                fine_id: cancelled.fine_id,
            })
        }
        Command::RecordPayment(cmd) => {
            let member_id = cmd.member_id;
            let owed = fines::record_payment(deps, cmd).await?;
            Ok(CommandOutcome::PaymentRecorded { member_id, owed })
        }
    }
}

impl CommandOutcome {
    /// 新しいエンティティを作成したか（HTTPステータスの判定用）
    pub fn is_creation(&self) -> bool {
        matches!(
            self,
            CommandOutcome::ItemRegistered { .. }
                | CommandOutcome::MemberRegistered { .. }
                | CommandOutcome::LoanScheduled { .. }
                | CommandOutcome::ItemLoaned { .. }
        )
    }
}
