use crate::domain::{
    member::Member,
    value_objects::{MemberId, Money},
};
use crate::ports::member_repository::MemberRepository as MemberRepositoryTrait;
use crate::ports::{RepositoryError, Result};
use async_trait::async_trait;
use sqlx::{PgPool, Row, postgres::PgRow};

use super::invalid_data;

fn map_row_to_member(row: &PgRow) -> Result<Member> {
    let version: i64 = row.get("version");

    Ok(Member {
        member_id: MemberId::from_uuid(row.get("member_id")),
        name: row.get("name"),
        payments: Money::from_minor(row.get("payments_minor")),
        version: u64::try_from(version)
            .map_err(|_| invalid_data(format!("version out of range: {}", version)))?,
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    })
}

/// MemberRepositoryのPostgreSQL実装
pub struct MemberRepository {
    pool: PgPool,
}

impl MemberRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl MemberRepositoryTrait for MemberRepository {
    async fn get(&self, member_id: MemberId) -> Result<Option<Member>> {
        let row = sqlx::query(
            r#"
            SELECT member_id, name, payments_minor, version, created_at, updated_at
            FROM members
            WHERE member_id = $1
            "#,
        )
        .bind(member_id.value())
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(map_row_to_member).transpose()
    }

    async fn insert(&self, member: Member) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO members (member_id, name, payments_minor, version, created_at, updated_at)
            VALUES ($1, $2, $3, 0, $4, $5)
            "#,
        )
        .bind(member.member_id.value())
        .bind(&member.name)
        .bind(member.payments.minor())
        .bind(member.created_at)
        .bind(member.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn update(&self, member: Member) -> Result<Member> {
        let expected = i64::try_from(member.version)
            .map_err(|_| invalid_data(format!("version out of range: {}", member.version)))?;

        let result = sqlx::query(
            r#"
            UPDATE members SET
                name = $3,
                payments_minor = $4,
                updated_at = $5,
                version = version + 1
            WHERE member_id = $1 AND version = $2
            "#,
        )
        .bind(member.member_id.value())
        .bind(expected)
        .bind(&member.name)
        .bind(member.payments.minor())
        .bind(member.updated_at)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::VersionConflict {
                entity: "member",
                id: member.member_id.value(),
                expected: member.version,
            });
        }

        Ok(Member {
            version: member.version + 1,
            ..member
        })
    }
}
