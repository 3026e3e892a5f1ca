use crate::domain::{
    fine::Fine,
    value_objects::{FineId, FineStatus, ItemId, LoanId, MemberId, Money},
};
use crate::ports::Result;
use crate::ports::fine_repository::FineRepository as FineRepositoryTrait;
use async_trait::async_trait;
use sqlx::{PgPool, Row, postgres::PgRow};
use std::str::FromStr;

use super::invalid_data;

fn map_row_to_fine(row: &PgRow) -> Result<Fine> {
    let status_str: &str = row.get("status");
    let status = FineStatus::from_str(status_str).map_err(invalid_data)?;

    Ok(Fine {
        fine_id: FineId::from_uuid(row.get("fine_id")),
        loan_id: LoanId::from_uuid(row.get("loan_id")),
        item_id: ItemId::from_uuid(row.get("item_id")),
        member_id: MemberId::from_uuid(row.get("member_id")),
        days_late: row.get("days_late"),
        daily_rate: Money::from_minor(row.get("daily_rate_minor")),
        amount: Money::from_minor(row.get("amount_minor")),
        status,
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    })
}

/// FineRepositoryのPostgreSQL実装
pub struct FineRepository {
    pool: PgPool,
}

impl FineRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl FineRepositoryTrait for FineRepository {
    async fn get(&self, fine_id: FineId) -> Result<Option<Fine>> {
        let row = sqlx::query(
            r#"
            SELECT
                fine_id, loan_id, item_id, member_id, days_late,
                daily_rate_minor, amount_minor, status, created_at, updated_at
            FROM fines
            WHERE fine_id = $1
            "#,
        )
        .bind(fine_id.value())
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(map_row_to_fine).transpose()
    }

    async fn save(&self, fine: Fine) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO fines (
                fine_id, loan_id, item_id, member_id, days_late,
                daily_rate_minor, amount_minor, status, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            ON CONFLICT (fine_id)
            DO UPDATE SET
                status = EXCLUDED.status,
                updated_at = EXCLUDED.updated_at
            "#,
        )
        .bind(fine.fine_id.value())
        .bind(fine.loan_id.value())
        .bind(fine.item_id.value())
        .bind(fine.member_id.value())
        .bind(fine.days_late)
        .bind(fine.daily_rate.minor())
        .bind(fine.amount.minor())
        .bind(fine.status.as_str())
        .bind(fine.created_at)
        .bind(fine.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn fines_for_member(&self, member_id: MemberId) -> Result<Vec<Fine>> {
        let rows = sqlx::query(
            r#"
            SELECT
                fine_id, loan_id, item_id, member_id, days_late,
                daily_rate_minor, amount_minor, status, created_at, updated_at
            FROM fines
            WHERE member_id = $1
            ORDER BY created_at ASC
            "#,
        )
        .bind(member_id.value())
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(map_row_to_fine).collect()
    }
}
