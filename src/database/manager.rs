use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

use super::memory::MemoryDrinkStore;
use super::models::{Ingredient, NewDrink, Recipe};
use super::repository::PgDrinkStore;
use super::store::{DrinkStore, StoreError};
use crate::config::DatabaseConfig;

/// Builds the configured drink store and makes sure its schema exists
pub async fn open_store(config: &DatabaseConfig) -> Result<Arc<dyn DrinkStore>, StoreError> {
    let Some(database_url) = config.url.as_deref() else {
        warn!("DATABASE_URL not set; drinks are kept in memory and lost on exit");
        return Ok(Arc::new(MemoryDrinkStore::new()));
    };

    let host = url::Url::parse(database_url)
        .map_err(|_| StoreError::InvalidDatabaseUrl)?
        .host_str()
        .unwrap_or("localhost")
        .to_string();

    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .acquire_timeout(Duration::from_secs(config.connection_timeout))
        .connect(database_url)
        .await?;

    let store = PgDrinkStore::new(pool);
    store.ensure_schema().await?;
    info!("Connected drink store to postgres at {}", host);

    Ok(Arc::new(store))
}

/// The drink present after a fresh reset
pub fn seed_drink() -> NewDrink {
    NewDrink {
        title: "water".to_string(),
        recipe: Recipe::Many(vec![Ingredient {
            name: "water".to_string(),
            color: "blue".to_string(),
            parts: 1,
        }]),
    }
}

/// Wipes the drink table and inserts the seed drink.
///
/// Destroys every stored drink. Only reachable through the explicit
/// `reset-database` command or the reset-on-boot switch.
pub async fn reset_and_seed(store: &dyn DrinkStore) -> Result<(), StoreError> {
    warn!("Dropping and recreating the drink table");
    store.reset().await?;
    let seeded = store.insert(seed_drink()).await?;
    info!("Seeded drink {} ({})", seeded.id, seeded.title);
    Ok(())
}
