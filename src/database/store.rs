use async_trait::async_trait;
use thiserror::Error;

use super::models::{Drink, DrinkChanges, NewDrink};

/// Errors from any drink store backend
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("A drink titled '{0}' already exists")]
    DuplicateTitle(String),

    #[error("Drink {0} not found")]
    NotFound(i32),

    #[error("Stored recipe for drink {id} is unreadable: {source}")]
    Encoding {
        id: i32,
        #[source]
        source: serde_json::Error,
    },

    #[error("Recipe could not be encoded: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("Invalid database URL")]
    InvalidDatabaseUrl,

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

/// Persistence seam for the drink catalog.
///
/// Title uniqueness is the backend's job; a violation surfaces as
/// [`StoreError::DuplicateTitle`].
#[async_trait]
pub trait DrinkStore: Send + Sync {
    /// Every drink, in ascending id order
    async fn list_all(&self) -> Result<Vec<Drink>, StoreError>;

    async fn get_by_id(&self, id: i32) -> Result<Option<Drink>, StoreError>;

    async fn insert(&self, drink: NewDrink) -> Result<Drink, StoreError>;

    /// Writes `changes` over `drink` and returns the stored result
    async fn update(&self, drink: &Drink, changes: DrinkChanges) -> Result<Drink, StoreError>;

    async fn delete(&self, id: i32) -> Result<(), StoreError>;

    /// Drops every drink and recreates empty storage. Destroys all data.
    async fn reset(&self) -> Result<(), StoreError>;

    /// Cheap liveness check
    async fn ping(&self) -> Result<(), StoreError>;
}
