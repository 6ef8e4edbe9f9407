use std::sync::Arc;

use crate::auth::TokenValidator;
use crate::database::DrinkStore;

/// Everything a request handler needs, built once at startup
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn DrinkStore>,
    pub validator: Arc<TokenValidator>,
}

impl AppState {
    pub fn new(store: Arc<dyn DrinkStore>, validator: TokenValidator) -> Self {
        Self {
            store,
            validator: Arc::new(validator),
        }
    }
}
