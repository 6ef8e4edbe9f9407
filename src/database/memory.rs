use async_trait::async_trait;
use std::collections::BTreeMap;
use tokio::sync::RwLock;

use super::models::{Drink, DrinkChanges, NewDrink};
use super::store::{DrinkStore, StoreError};

#[derive(Default)]
struct Table {
    next_id: i32,
    rows: BTreeMap<i32, Drink>,
}

impl Table {
    fn title_taken(&self, title: &str, except: Option<i32>) -> bool {
        self.rows
            .values()
            .any(|d| d.title == title && Some(d.id) != except)
    }
}

/// Process-local drink store with the same contract as the Postgres one
#[derive(Default)]
pub struct MemoryDrinkStore {
    table: RwLock<Table>,
}

impl MemoryDrinkStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DrinkStore for MemoryDrinkStore {
    async fn list_all(&self) -> Result<Vec<Drink>, StoreError> {
        Ok(self.table.read().await.rows.values().cloned().collect())
    }

    async fn get_by_id(&self, id: i32) -> Result<Option<Drink>, StoreError> {
        Ok(self.table.read().await.rows.get(&id).cloned())
    }

    async fn insert(&self, drink: NewDrink) -> Result<Drink, StoreError> {
        let mut table = self.table.write().await;
        if table.title_taken(&drink.title, None) {
            return Err(StoreError::DuplicateTitle(drink.title));
        }

        table.next_id += 1;
        let stored = Drink {
            id: table.next_id,
            title: drink.title,
            recipe: drink.recipe,
        };
        table.rows.insert(stored.id, stored.clone());
        Ok(stored)
    }

    async fn update(&self, drink: &Drink, changes: DrinkChanges) -> Result<Drink, StoreError> {
        let mut table = self.table.write().await;
        if !table.rows.contains_key(&drink.id) {
            return Err(StoreError::NotFound(drink.id));
        }

        let updated = drink.with_changes(changes);
        if table.title_taken(&updated.title, Some(updated.id)) {
            return Err(StoreError::DuplicateTitle(updated.title));
        }
        table.rows.insert(updated.id, updated.clone());
        Ok(updated)
    }

    async fn delete(&self, id: i32) -> Result<(), StoreError> {
        self.table
            .write()
            .await
            .rows
            .remove(&id)
            .map(|_| ())
            .ok_or(StoreError::NotFound(id))
    }

    async fn reset(&self) -> Result<(), StoreError> {
        *self.table.write().await = Table::default();
        Ok(())
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}
