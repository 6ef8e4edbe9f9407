pub mod drinks;
pub mod health;

use crate::error::ApiError;

pub use drinks::list as drinks_list;
pub use health::health;

/// Any path no route claims
pub async fn not_found() -> ApiError {
    ApiError::not_found()
}
