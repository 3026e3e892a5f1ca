use crate::domain::{events::DomainEvent, value_objects::LoanId};
use crate::ports::Result;
use crate::ports::event_store::EventStore as EventStoreTrait;
use async_trait::async_trait;
use sqlx::{PgPool, Row};

/// PostgreSQL implementation of EventStore
///
/// Stores loan history in an append-only log.
/// Events are serialized as JSONB for flexible schema evolution.
pub struct EventStore {
    pool: PgPool,
}

impl EventStore {
    /// Create a new EventStore with a PostgreSQL connection pool
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl EventStoreTrait for EventStore {
    /// Append events to the loan's history
    ///
    /// All events of one call are stored atomically within a transaction,
    /// numbered after the current highest sequence of the loan.
    /// Uses batch INSERT with UNNEST.
    async fn append(&self, loan_id: LoanId, events: Vec<DomainEvent>) -> Result<()> {
        if events.is_empty() {
            return Ok(());
        }

        let mut tx = self.pool.begin().await?;

        // COALESCE handles NULL when no events exist for this loan
        let current_sequence: i32 = sqlx::query_scalar(
            r#"
            SELECT COALESCE(MAX(sequence), 0)
            FROM loan_events
            WHERE loan_id = $1
            "#,
        )
        .bind(loan_id.value())
        .fetch_one(&mut *tx)
        .await?;

        let mut sequences = Vec::with_capacity(events.len());
        let mut event_types = Vec::with_capacity(events.len());
        let mut event_data_list = Vec::with_capacity(events.len());
        let mut occurred_at_list = Vec::with_capacity(events.len());

        for (i, event) in events.iter().enumerate() {
            sequences.push(current_sequence + (i as i32) + 1);
            event_types.push(event.event_type());
            event_data_list.push(serde_json::to_value(event)?);
            occurred_at_list.push(event.occurred_at());
        }

        sqlx::query(
            r#"
            INSERT INTO loan_events (
                loan_id,
                sequence,
                event_type,
                event_data,
                occurred_at
            )
            SELECT $1, * FROM UNNEST($2::int[], $3::varchar[], $4::jsonb[], $5::timestamptz[])
            "#,
        )
        .bind(loan_id.value())
        .bind(&sequences)
        .bind(&event_types)
        .bind(&event_data_list)
        .bind(&occurred_at_list)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(())
    }

    /// Load the loan's history in append order
    async fn load(&self, loan_id: LoanId) -> Result<Vec<DomainEvent>> {
        let rows = sqlx::query(
            r#"
            SELECT event_data
            FROM loan_events
            WHERE loan_id = $1
            ORDER BY sequence ASC
            "#,
        )
        .bind(loan_id.value())
        .fetch_all(&self.pool)
        .await?;

        let mut events = Vec::with_capacity(rows.len());
        for row in rows {
            let event_data: serde_json::Value = row.get("event_data");
            events.push(serde_json::from_value(event_data)?);
        }

        Ok(events)
    }
}
