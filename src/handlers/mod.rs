pub mod protected;
pub mod public;

use serde::Deserialize;

use crate::database::models::{DrinkChanges, NewDrink, Recipe};
use crate::error::ApiError;

/// Longest title the drink table accepts
pub const MAX_TITLE_LEN: usize = 80;

/// Body of `POST /drinks` and `PATCH /drinks/:id`
#[derive(Debug, Default, Deserialize)]
pub struct DrinkPayload {
    pub title: Option<String>,
    pub recipe: Option<Recipe>,
}

impl DrinkPayload {
    /// Both fields must be present and non-empty
    pub fn into_new_drink(self) -> Result<NewDrink, ApiError> {
        match (self.title, self.recipe) {
            (Some(title), Some(recipe)) => {
                check_title(&title)?;
                check_recipe(&recipe)?;
                Ok(NewDrink { title, recipe })
            }
            _ => Err(ApiError::bad_request("title and recipe are required")),
        }
    }

    /// Either field may be omitted; present fields must still be valid
    pub fn into_changes(self) -> Result<DrinkChanges, ApiError> {
        if let Some(title) = &self.title {
            check_title(title)?;
        }
        if let Some(recipe) = &self.recipe {
            check_recipe(recipe)?;
        }
        Ok(DrinkChanges {
            title: self.title,
            recipe: self.recipe,
        })
    }
}

fn check_title(title: &str) -> Result<(), ApiError> {
    if title.trim().is_empty() {
        return Err(ApiError::bad_request("title must not be empty"));
    }
    if title.chars().count() > MAX_TITLE_LEN {
        return Err(ApiError::bad_request(format!(
            "title must be at most {} characters",
            MAX_TITLE_LEN
        )));
    }
    Ok(())
}

fn check_recipe(recipe: &Recipe) -> Result<(), ApiError> {
    if recipe.is_empty() {
        return Err(ApiError::bad_request("recipe must contain at least one ingredient"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn payload(value: serde_json::Value) -> DrinkPayload {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_new_drink_requires_both_fields() {
        let missing_recipe = payload(json!({"title": "Water"}));
        assert_eq!(missing_recipe.into_new_drink().unwrap_err().status_code(), 400);

        let missing_title = payload(json!({"recipe": {"name": "water", "color": "blue", "parts": 1}}));
        assert_eq!(missing_title.into_new_drink().unwrap_err().status_code(), 400);

        let ok = payload(json!({"title": "Water", "recipe": {"name": "water", "color": "blue", "parts": 1}}));
        assert_eq!(ok.into_new_drink().unwrap().title, "Water");
    }

    #[test]
    fn test_blank_values_count_as_missing() {
        let blank = payload(json!({"title": "  ", "recipe": {"name": "water", "color": "blue", "parts": 1}}));
        assert!(blank.into_new_drink().is_err());

        let empty_recipe = payload(json!({"title": "Water", "recipe": []}));
        assert!(empty_recipe.into_new_drink().is_err());

        let null_recipe = payload(json!({"title": "Water", "recipe": null}));
        assert!(null_recipe.into_new_drink().is_err());
    }

    #[test]
    fn test_changes_allow_omission() {
        let changes = payload(json!({"title": "Flat White"})).into_changes().unwrap();
        assert_eq!(changes.title.as_deref(), Some("Flat White"));
        assert!(changes.recipe.is_none());

        assert!(payload(json!({})).into_changes().unwrap().is_empty());
        assert!(payload(json!({"title": ""})).into_changes().is_err());
    }

    #[test]
    fn test_title_length_limit() {
        let long = "x".repeat(MAX_TITLE_LEN + 1);
        assert!(payload(json!({ "title": long })).into_changes().is_err());
    }
}
