use async_trait::async_trait;
use sqlx::{FromRow, PgPool};
use tracing::debug;

use super::models::{Drink, DrinkChanges, NewDrink, Recipe};
use super::store::{DrinkStore, StoreError};

const CREATE_TABLE: &str = r#"
    CREATE TABLE IF NOT EXISTS drink (
        id SERIAL PRIMARY KEY,
        title VARCHAR(80) NOT NULL UNIQUE,
        recipe TEXT NOT NULL
    )
"#;

#[derive(Debug, FromRow)]
struct DrinkRow {
    id: i32,
    title: String,
    recipe: String,
}

impl TryFrom<DrinkRow> for Drink {
    type Error = StoreError;

    fn try_from(row: DrinkRow) -> Result<Self, Self::Error> {
        let recipe = Recipe::decode(&row.recipe)
            .map_err(|source| StoreError::Encoding { id: row.id, source })?;
        Ok(Drink {
            id: row.id,
            title: row.title,
            recipe,
        })
    }
}

/// Drink store backed by the `drink` table in Postgres
pub struct PgDrinkStore {
    pool: PgPool,
}

impl PgDrinkStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Creates the table when missing. Never touches existing rows.
    pub async fn ensure_schema(&self) -> Result<(), StoreError> {
        sqlx::query(CREATE_TABLE).execute(&self.pool).await?;
        Ok(())
    }
}

/// Unique violations on `title` become conflicts; everything else stays a database error
fn write_error(err: sqlx::Error, title: &str) -> StoreError {
    match &err {
        sqlx::Error::Database(db) if db.is_unique_violation() => {
            StoreError::DuplicateTitle(title.to_string())
        }
        _ => StoreError::Sqlx(err),
    }
}

#[async_trait]
impl DrinkStore for PgDrinkStore {
    async fn list_all(&self) -> Result<Vec<Drink>, StoreError> {
        sqlx::query_as::<_, DrinkRow>("SELECT id, title, recipe FROM drink ORDER BY id")
            .fetch_all(&self.pool)
            .await?
            .into_iter()
            .map(Drink::try_from)
            .collect()
    }

    async fn get_by_id(&self, id: i32) -> Result<Option<Drink>, StoreError> {
        sqlx::query_as::<_, DrinkRow>("SELECT id, title, recipe FROM drink WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .map(Drink::try_from)
            .transpose()
    }

    async fn insert(&self, drink: NewDrink) -> Result<Drink, StoreError> {
        let recipe = drink.recipe.encode()?;
        let row = sqlx::query_as::<_, DrinkRow>(
            "INSERT INTO drink (title, recipe) VALUES ($1, $2) RETURNING id, title, recipe",
        )
        .bind(&drink.title)
        .bind(&recipe)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| write_error(e, &drink.title))?;

        debug!("Inserted drink {} ({})", row.id, row.title);
        Drink::try_from(row)
    }

    async fn update(&self, drink: &Drink, changes: DrinkChanges) -> Result<Drink, StoreError> {
        let updated = drink.with_changes(changes);
        let recipe = updated.recipe.encode()?;
        let row = sqlx::query_as::<_, DrinkRow>(
            "UPDATE drink SET title = $2, recipe = $3 WHERE id = $1 RETURNING id, title, recipe",
        )
        .bind(updated.id)
        .bind(&updated.title)
        .bind(&recipe)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| write_error(e, &updated.title))?
        .ok_or(StoreError::NotFound(updated.id))?;

        Drink::try_from(row)
    }

    async fn delete(&self, id: i32) -> Result<(), StoreError> {
        let result = sqlx::query("DELETE FROM drink WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound(id));
        }
        Ok(())
    }

    async fn reset(&self) -> Result<(), StoreError> {
        let mut tx = self.pool.begin().await?;
        sqlx::query("DROP TABLE IF EXISTS drink")
            .execute(&mut *tx)
            .await?;
        sqlx::query(CREATE_TABLE).execute(&mut *tx).await?;
        tx.commit().await?;
        Ok(())
    }

    async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
