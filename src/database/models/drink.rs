use serde::{Deserialize, Serialize};

/// One component of a recipe
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ingredient {
    pub name: String,
    pub color: String,
    /// Relative proportion within the drink
    pub parts: i64,
}

/// A recipe arrives either as a single ingredient or as an ordered list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Recipe {
    Many(Vec<Ingredient>),
    One(Ingredient),
}

impl Recipe {
    pub fn is_empty(&self) -> bool {
        matches!(self, Recipe::Many(list) if list.is_empty())
    }

    /// Text form kept in the `recipe` column
    pub fn encode(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    pub fn decode(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(raw)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Drink {
    pub id: i32,
    pub title: String,
    pub recipe: Recipe,
}

/// Fields required to create a drink
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewDrink {
    pub title: String,
    pub recipe: Recipe,
}

/// Partial update; `None` keeps the stored value
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DrinkChanges {
    pub title: Option<String>,
    pub recipe: Option<Recipe>,
}

impl DrinkChanges {
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.recipe.is_none()
    }
}

/// Public listing shape: no recipe
#[derive(Debug, Serialize)]
pub struct ShortDrink<'a> {
    pub id: i32,
    pub title: &'a str,
}

/// Authorized detail shape
#[derive(Debug, Serialize)]
pub struct LongDrink<'a> {
    pub id: i32,
    pub title: &'a str,
    pub recipe: &'a Recipe,
}

impl Drink {
    pub fn short(&self) -> ShortDrink<'_> {
        ShortDrink {
            id: self.id,
            title: &self.title,
        }
    }

    pub fn long(&self) -> LongDrink<'_> {
        LongDrink {
            id: self.id,
            title: &self.title,
            recipe: &self.recipe,
        }
    }

    /// Returns a copy with `changes` applied over the current fields
    pub fn with_changes(&self, changes: DrinkChanges) -> Drink {
        Drink {
            id: self.id,
            title: changes.title.unwrap_or_else(|| self.title.clone()),
            recipe: changes.recipe.unwrap_or_else(|| self.recipe.clone()),
        }
    }
}
