use crate::domain::{
    fine::Fine,
    value_objects::{FineId, MemberId},
};
use crate::ports::Result;
use crate::ports::fine_repository::FineRepository as FineRepositoryTrait;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;

use super::lock;

/// In-memory implementation of FineRepository
#[derive(Default)]
pub struct FineRepository {
    fines: Mutex<HashMap<FineId, Fine>>,
}

impl FineRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl FineRepositoryTrait for FineRepository {
    async fn get(&self, fine_id: FineId) -> Result<Option<Fine>> {
        Ok(lock(&self.fines)?.get(&fine_id).cloned())
    }

    async fn save(&self, fine: Fine) -> Result<()> {
        lock(&self.fines)?.insert(fine.fine_id, fine);
        Ok(())
    }

    async fn fines_for_member(&self, member_id: MemberId) -> Result<Vec<Fine>> {
        let mut fines: Vec<Fine> = lock(&self.fines)?
            .values()
            .filter(|fine| fine.member_id == member_id)
            .cloned()
            .collect();
        fines.sort_by_key(|fine| fine.created_at);
        Ok(fines)
    }
}
