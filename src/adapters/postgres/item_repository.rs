use crate::domain::{
    item::{CurrentLoan, Item},
    value_objects::{ItemCondition, ItemId, LoanId, MemberId},
};
use crate::ports::item_repository::ItemRepository as ItemRepositoryTrait;
use crate::ports::{RepositoryError, Result};
use async_trait::async_trait;
use sqlx::{PgPool, Row, postgres::PgRow};
use std::str::FromStr;
use uuid::Uuid;

use super::invalid_data;

/// PostgreSQLの行データをItemに変換する
fn map_row_to_item(row: &PgRow) -> Result<Item> {
    let condition_str: &str = row.get("condition");
    let condition = ItemCondition::from_str(condition_str).map_err(invalid_data)?;

    let current_loan_id: Option<Uuid> = row.get("current_loan_id");
    let current_member_id: Option<Uuid> = row.get("current_member_id");
    let current_loan = match (current_loan_id, current_member_id) {
        (Some(loan_id), Some(member_id)) => Some(CurrentLoan {
            loan_id: LoanId::from_uuid(loan_id),
            member_id: MemberId::from_uuid(member_id),
        }),
        (None, None) => None,
        _ => return Err(invalid_data("current_loan_id and current_member_id must be set together")),
    };

    let version: i64 = row.get("version");

    Ok(Item {
        item_id: ItemId::from_uuid(row.get("item_id")),
        title: row.get("title"),
        loanable: row.get("loanable"),
        condition,
        current_loan,
        version: u64::try_from(version)
            .map_err(|_| invalid_data(format!("version out of range: {}", version)))?,
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    })
}

/// ItemRepositoryのPostgreSQL実装
pub struct ItemRepository {
    pool: PgPool,
}

impl ItemRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ItemRepositoryTrait for ItemRepository {
    async fn get(&self, item_id: ItemId) -> Result<Option<Item>> {
        let row = sqlx::query(
            r#"
            SELECT
                item_id,
                title,
                loanable,
                condition,
                current_loan_id,
                current_member_id,
                version,
                created_at,
                updated_at
            FROM items
            WHERE item_id = $1
            "#,
        )
        .bind(item_id.value())
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(map_row_to_item).transpose()
    }

    async fn insert(&self, item: Item) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO items (
                item_id,
                title,
                loanable,
                condition,
                current_loan_id,
                current_member_id,
                version,
                created_at,
                updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, 0, $7, $8)
            "#,
        )
        .bind(item.item_id.value())
        .bind(&item.title)
        .bind(item.loanable)
        .bind(item.condition.as_str())
        .bind(item.current_loan.map(|c| c.loan_id.value()))
        .bind(item.current_loan.map(|c| c.member_id.value()))
        .bind(item.created_at)
        .bind(item.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// versionが一致する場合のみ更新する（楽観的排他制御）
    async fn update(&self, item: Item) -> Result<Item> {
        let expected = i64::try_from(item.version)
            .map_err(|_| invalid_data(format!("version out of range: {}", item.version)))?;

        let result = sqlx::query(
            r#"
            UPDATE items SET
                title = $3,
                loanable = $4,
                condition = $5,
                current_loan_id = $6,
                current_member_id = $7,
                updated_at = $8,
                version = version + 1
            WHERE item_id = $1 AND version = $2
            "#,
        )
        .bind(item.item_id.value())
        .bind(expected)
        .bind(&item.title)
        .bind(item.loanable)
        .bind(item.condition.as_str())
        .bind(item.current_loan.map(|c| c.loan_id.value()))
        .bind(item.current_loan.map(|c| c.member_id.value()))
        .bind(item.updated_at)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::VersionConflict {
                entity: "item",
                id: item.item_id.value(),
                expected: item.version,
            });
        }

        Ok(Item {
            version: item.version + 1,
            ..item
        })
    }
}
