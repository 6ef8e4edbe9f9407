use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, State,
    },
    Extension, Json,
};
use serde_json::{json, Value};
use tracing::info;

use crate::auth::AuthContext;
use crate::database::models::Drink;
use crate::error::ApiError;
use crate::handlers::DrinkPayload;
use crate::middleware::{ApiResponse, ApiResult};
use crate::state::AppState;

/// Loads the drink addressed by the path, or 404.
///
/// A path segment that is not an integer id cannot name a drink either.
async fn existing_drink(
    state: &AppState,
    id: Result<Path<i32>, PathRejection>,
) -> Result<Drink, ApiError> {
    let Ok(Path(id)) = id else {
        return Err(ApiError::not_found());
    };
    state.store.get_by_id(id).await?.ok_or_else(ApiError::not_found)
}

/// GET /drinks-detail - full menu including recipes
pub async fn detail(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Value> {
    let drinks = state.store.list_all().await?;
    tracing::debug!("{} listed {} drink details", auth.subject(), drinks.len());
    let long: Vec<_> = drinks.iter().map(Drink::long).collect();

    Ok(ApiResponse::success(json!({ "drinks": long })))
}

/// POST /drinks - create a drink from `{title, recipe}`
pub async fn create(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    payload: Result<Json<DrinkPayload>, JsonRejection>,
) -> ApiResult<Value> {
    let Json(payload) = payload?;
    let new_drink = payload.into_new_drink()?;

    let drink = state.store.insert(new_drink).await?;
    info!("{} created drink {} ({})", auth.subject(), drink.id, drink.title);

    Ok(ApiResponse::success(json!({ "drinks": [drink.long()] })))
}

/// PATCH /drinks/:id - apply whichever of `title`/`recipe` is present
pub async fn update(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    id: Result<Path<i32>, PathRejection>,
    payload: Result<Json<DrinkPayload>, JsonRejection>,
) -> ApiResult<Value> {
    let drink = existing_drink(&state, id).await?;

    let Json(payload) = payload?;
    let changes = payload.into_changes()?;
    if changes.is_empty() {
        return Ok(ApiResponse::success(json!({ "drinks": [drink.long()] })));
    }

    let drink = state.store.update(&drink, changes).await?;
    info!("{} updated drink {} ({})", auth.subject(), drink.id, drink.title);

    Ok(ApiResponse::success(json!({ "drinks": [drink.long()] })))
}

/// DELETE /drinks/:id
pub async fn delete(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    id: Result<Path<i32>, PathRejection>,
) -> ApiResult<Value> {
    let drink = existing_drink(&state, id).await?;

    state.store.delete(drink.id).await?;
    info!("{} deleted drink {} ({})", auth.subject(), drink.id, drink.title);

    Ok(ApiResponse::success(json!({ "delete": drink.id })))
}
