use axum::{
    http::{header, HeaderValue, Method, StatusCode},
    middleware,
    response::{IntoResponse, Response},
    routing::{delete, get, patch, post},
    Router,
};
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};

use crate::config::SecurityConfig;
use crate::error::ApiError;
use crate::handlers::{protected, public};
use crate::middleware::guarded;
use crate::state::AppState;

pub fn app(state: AppState, security: &SecurityConfig) -> Router {
    Router::new()
        // Public
        .route("/health", get(public::health))
        .merge(drink_routes(&state))
        .fallback(public::not_found)
        // Global middleware
        .layer(middleware::map_response(method_not_allowed_envelope))
        .layer(cors_layer(security))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn drink_routes(state: &AppState) -> Router<AppState> {
    let validator = &state.validator;

    Router::new()
        .route(
            "/drinks",
            get(public::drinks_list).merge(guarded(
                post(protected::drinks_create),
                validator,
                "post:drinks",
            )),
        )
        .route(
            "/drinks-detail",
            guarded(get(protected::drinks_detail), validator, "get:drinks-detail"),
        )
        .route(
            "/drinks/:id",
            guarded(patch(protected::drinks_update), validator, "patch:drinks").merge(guarded(
                delete(protected::drinks_delete),
                validator,
                "delete:drinks",
            )),
        )
}

/// Credentialed CORS for browser clients sending `Authorization`
pub fn cors_layer(security: &SecurityConfig) -> CorsLayer {
    let origins: Vec<HeaderValue> = security
        .cors_origins
        .iter()
        .filter_map(|o| HeaderValue::from_str(o).ok())
        .collect();

    // Credentials rule out the `*` origin, so echo the caller when no list is configured
    let allow_origin = if origins.is_empty() {
        AllowOrigin::mirror_request()
    } else {
        AllowOrigin::list(origins)
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_credentials(true)
}

/// Axum answers unmatched methods with an empty 405; give it the JSON envelope
async fn method_not_allowed_envelope(response: Response) -> Response {
    if response.status() == StatusCode::METHOD_NOT_ALLOWED {
        return ApiError::method_not_allowed().into_response();
    }
    response
}
