pub mod manager;
pub mod memory;
pub mod models;
pub mod repository;
pub mod store;

pub use manager::{open_store, reset_and_seed, seed_drink};
pub use memory::MemoryDrinkStore;
pub use repository::PgDrinkStore;
pub use store::{DrinkStore, StoreError};
