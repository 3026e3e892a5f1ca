use crate::domain::{
    loan::{ActiveLoan, Loan, LoanCore, ReturnOutcome, ReturnedLoan, ScheduledLoan},
    value_objects::{
        DateRange, FineId, ItemId, LoanId, LoanStatus, MemberId, RenewalCount,
    },
};
use crate::ports::Result;
use crate::ports::loan_repository::LoanRepository as LoanRepositoryTrait;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Row, postgres::PgRow};
use uuid::Uuid;

use super::invalid_data;

const SELECT_LOANS: &str = r#"
    SELECT
        loan_id,
        item_id,
        member_id,
        status,
        start_at,
        end_at,
        given_at,
        returned_at,
        days_late,
        fine_id,
        renewal_count,
        created_at,
        updated_at
    FROM loans
"#;

/// PostgreSQLの行データをLoanに変換する
///
/// statusの数値コードから型安全な状態を復元する。
/// 状態に必要な列（given_at, returned_atなど）が欠けている行はエラーとする。
fn map_row_to_loan(row: &PgRow) -> Result<Loan> {
    let loan_id = LoanId::from_uuid(row.get("loan_id"));

    let status_code: i16 = row.get("status");
    let status = u8::try_from(status_code)
        .map_err(|_| format!("status out of range: {}", status_code))
        .and_then(LoanStatus::try_from)
        .map_err(invalid_data)?;

    let period = DateRange::new(row.get("start_at"), row.get("end_at"))
        .map_err(|_| invalid_data(format!("loan {} has end_at <= start_at", loan_id)))?;

    let renewal_count: i32 = row.get("renewal_count");
    let renewal_count = u32::try_from(renewal_count)
        .map_err(|_| invalid_data(format!("renewal_count out of range: {}", renewal_count)))?;

    let core = LoanCore {
        loan_id,
        item_id: ItemId::from_uuid(row.get("item_id")),
        member_id: MemberId::from_uuid(row.get("member_id")),
        period,
        renewal_count: RenewalCount::from_value(renewal_count),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    };

    let given_at: Option<DateTime<Utc>> = row.get("given_at");
    let returned_at: Option<DateTime<Utc>> = row.get("returned_at");
    let days_late: Option<i64> = row.get("days_late");
    let fine_id: Option<Uuid> = row.get("fine_id");

    let missing = |column: &str| invalid_data(format!("loan {} is missing {}", loan_id, column));

    let loan = match status {
        LoanStatus::Scheduled => Loan::Scheduled(ScheduledLoan { core }),
        LoanStatus::OnLoan => Loan::OnLoan(ActiveLoan {
            core,
            given_at: given_at.ok_or_else(|| missing("given_at"))?,
        }),
        LoanStatus::Returned | LoanStatus::ReturnedLate | LoanStatus::ReturnedLateFined => {
            let outcome = match status {
                LoanStatus::ReturnedLate => ReturnOutcome::Late {
                    days_late: days_late.ok_or_else(|| missing("days_late"))?,
                },
                LoanStatus::ReturnedLateFined => ReturnOutcome::LateFined {
                    days_late: days_late.ok_or_else(|| missing("days_late"))?,
                    fine_id: FineId::from_uuid(fine_id.ok_or_else(|| missing("fine_id"))?),
                },
                _ => ReturnOutcome::OnTime,
            };
            Loan::Returned(ReturnedLoan {
                core,
                given_at: given_at.ok_or_else(|| missing("given_at"))?,
                returned_at: returned_at.ok_or_else(|| missing("returned_at"))?,
                outcome,
            })
        }
    };

    Ok(loan)
}

/// LoanRepositoryのPostgreSQL実装
pub struct LoanRepository {
    pool: PgPool,
}

impl LoanRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl LoanRepositoryTrait for LoanRepository {
    async fn get(&self, loan_id: LoanId) -> Result<Option<Loan>> {
        let row = sqlx::query(&format!("{} WHERE loan_id = $1", SELECT_LOANS))
            .bind(loan_id.value())
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(map_row_to_loan).transpose()
    }

    /// 貸出をupsertする
    ///
    /// 状態遷移ごとに行全体を書き換える。
    async fn save(&self, loan: Loan) -> Result<()> {
        let (given_at, returned_at, days_late, fine_id) = match &loan {
            Loan::Scheduled(_) => (None, None, None, None),
            Loan::OnLoan(active) => (Some(active.given_at), None, None, None),
            Loan::Returned(returned) => {
                let (days_late, fine_id) = match returned.outcome {
                    ReturnOutcome::OnTime => (None, None),
                    ReturnOutcome::Late { days_late } => (Some(days_late), None),
                    ReturnOutcome::LateFined { days_late, fine_id } => {
                        (Some(days_late), Some(fine_id.value()))
                    }
                };
                (
                    Some(returned.given_at),
                    Some(returned.returned_at),
                    days_late,
                    fine_id,
                )
            }
        };
        let core = loan.core();

        sqlx::query(
            r#"
            INSERT INTO loans (
                loan_id,
                item_id,
                member_id,
                status,
                start_at,
                end_at,
                given_at,
                returned_at,
                days_late,
                fine_id,
                renewal_count,
                created_at,
                updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            ON CONFLICT (loan_id)
            DO UPDATE SET
                status = EXCLUDED.status,
                start_at = EXCLUDED.start_at,
                end_at = EXCLUDED.end_at,
                given_at = EXCLUDED.given_at,
                returned_at = EXCLUDED.returned_at,
                days_late = EXCLUDED.days_late,
                fine_id = EXCLUDED.fine_id,
                renewal_count = EXCLUDED.renewal_count,
                updated_at = EXCLUDED.updated_at
            "#,
        )
        .bind(core.loan_id.value())
        .bind(core.item_id.value())
        .bind(core.member_id.value())
        .bind(loan.status().code() as i16)
        .bind(core.period.start())
        .bind(core.period.end())
        .bind(given_at)
        .bind(returned_at)
        .bind(days_late)
        .bind(fine_id)
        .bind(core.renewal_count.value() as i32)
        .bind(core.created_at)
        .bind(core.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// (item_id, start_at)のインデックスを使用する
    async fn loans_for_item(&self, item_id: ItemId) -> Result<Vec<Loan>> {
        let rows = sqlx::query(&format!(
            "{} WHERE item_id = $1 ORDER BY start_at ASC",
            SELECT_LOANS
        ))
        .bind(item_id.value())
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(map_row_to_loan).collect()
    }

    async fn loans_for_member(&self, member_id: MemberId) -> Result<Vec<Loan>> {
        let rows = sqlx::query(&format!(
            "{} WHERE member_id = $1 ORDER BY start_at ASC",
            SELECT_LOANS
        ))
        .bind(member_id.value())
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(map_row_to_loan).collect()
    }

    /// 貸出中（status = 1）かつ返却期限切れの貸出
    async fn find_late_candidates(&self, cutoff: DateTime<Utc>) -> Result<Vec<Loan>> {
        let rows = sqlx::query(&format!(
            "{} WHERE status = $1 AND end_at < $2 ORDER BY end_at ASC",
            SELECT_LOANS
        ))
        .bind(LoanStatus::OnLoan.code() as i16)
        .bind(cutoff)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(map_row_to_loan).collect()
    }
}
