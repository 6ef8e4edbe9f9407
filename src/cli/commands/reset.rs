use crate::config::{AppConfig, ConfigError, Environment};
use crate::database::{open_store, reset_and_seed};

pub async fn handle(config: AppConfig) -> anyhow::Result<()> {
    if config.environment == Environment::Production {
        return Err(ConfigError::ResetForbidden(config.environment).into());
    }
    if config.database.url.is_none() {
        anyhow::bail!("DATABASE_URL must be set to reset a persistent drink table");
    }

    let store = open_store(&config.database).await?;
    reset_and_seed(store.as_ref()).await?;
    println!("Drink table reset and seeded");
    Ok(())
}
