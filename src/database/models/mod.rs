pub mod drink;

pub use drink::{Drink, DrinkChanges, Ingredient, LongDrink, NewDrink, Recipe, ShortDrink};
