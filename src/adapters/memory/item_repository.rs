use crate::domain::{item::Item, value_objects::ItemId};
use crate::ports::item_repository::ItemRepository as ItemRepositoryTrait;
use crate::ports::{RepositoryError, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;

use super::lock;

/// In-memory implementation of ItemRepository
///
/// `update` performs the same compare-and-swap on `version` as the
/// PostgreSQL adapter.
#[derive(Default)]
pub struct ItemRepository {
    items: Mutex<HashMap<ItemId, Item>>,
}

impl ItemRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ItemRepositoryTrait for ItemRepository {
    async fn get(&self, item_id: ItemId) -> Result<Option<Item>> {
        Ok(lock(&self.items)?.get(&item_id).cloned())
    }

    async fn insert(&self, item: Item) -> Result<()> {
        lock(&self.items)?.insert(item.item_id, Item { version: 0, ..item });
        Ok(())
    }

    async fn update(&self, item: Item) -> Result<Item> {
        let mut items = lock(&self.items)?;
        let stored_version = items.get(&item.item_id).map(|stored| stored.version);
        if stored_version != Some(item.version) {
            return Err(RepositoryError::VersionConflict {
                entity: "item",
                id: item.item_id.value(),
                expected: item.version,
            });
        }

        let saved = Item {
            version: item.version + 1,
            ..item
        };
        items.insert(saved.item_id, saved.clone());
        Ok(saved)
    }
}
