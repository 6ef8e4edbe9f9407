use axum::{
    extract::{Request, State},
    middleware::{self, Next},
    response::Response,
    routing::MethodRouter,
};
use std::sync::Arc;

use crate::auth::{extract_bearer_token, AuthContext, AuthError, TokenValidator};
use crate::error::ApiError;
use crate::state::AppState;

/// Per-route guard state: who verifies tokens and which permission is needed
#[derive(Clone)]
pub struct PermissionGuard {
    validator: Arc<TokenValidator>,
    required: &'static str,
}

impl PermissionGuard {
    pub fn new(validator: Arc<TokenValidator>, required: &'static str) -> Self {
        Self { validator, required }
    }

    /// Header → token → claims → permission check
    pub fn authorize(&self, request: &Request) -> Result<AuthContext, AuthError> {
        let token = extract_bearer_token(request.headers())?;
        let claims = self.validator.validate(token)?;
        AuthContext::authorize(claims, self.required)
    }
}

/// Rejects the request unless its bearer token grants the guard's permission.
///
/// On success the [`AuthContext`] is inserted into request extensions for the
/// handler. Handler errors pass through untouched.
pub async fn require_permission(
    State(guard): State<PermissionGuard>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let context = guard.authorize(&request).map_err(|err| {
        tracing::warn!(
            "Rejected {} {}: {} ({})",
            request.method(),
            request.uri().path(),
            err.code(),
            guard.required
        );
        ApiError::from(err)
    })?;

    tracing::debug!("Authorized '{}' for {}", guard.required, context.subject());
    request.extensions_mut().insert(context);

    Ok(next.run(request).await)
}

/// Wraps every handler on `route` with a [`require_permission`] guard
pub fn guarded(
    route: MethodRouter<AppState>,
    validator: &Arc<TokenValidator>,
    permission: &'static str,
) -> MethodRouter<AppState> {
    route.route_layer(middleware::from_fn_with_state(
        PermissionGuard::new(validator.clone(), permission),
        require_permission,
    ))
}
