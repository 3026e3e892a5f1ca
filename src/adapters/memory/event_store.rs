use crate::domain::{events::DomainEvent, value_objects::LoanId};
use crate::ports::event_store::EventStore as EventStoreTrait;
use crate::ports::Result;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;

use super::lock;

/// In-memory implementation of EventStore
#[derive(Default)]
pub struct EventStore {
    events: Mutex<HashMap<LoanId, Vec<DomainEvent>>>,
}

impl EventStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl EventStoreTrait for EventStore {
    async fn append(&self, loan_id: LoanId, events: Vec<DomainEvent>) -> Result<()> {
        lock(&self.events)?.entry(loan_id).or_default().extend(events);
        Ok(())
    }

    async fn load(&self, loan_id: LoanId) -> Result<Vec<DomainEvent>> {
        Ok(lock(&self.events)?
            .get(&loan_id)
            .cloned()
            .unwrap_or_default())
    }
}
