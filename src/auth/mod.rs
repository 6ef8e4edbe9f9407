pub mod permissions;
pub mod token;

use serde_json::{Map, Value};
use std::collections::BTreeSet;
use std::fmt;
use thiserror::Error;

pub use permissions::{check_permissions, permissions_of};
pub use token::{extract_bearer_token, load_key_set, TokenValidator};

/// Decoded token payload: claim name to claim value
pub type Claims = Map<String, Value>;

/// Which part of the `Authorization` header was wrong
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeaderFault {
    Missing,
    NotBearer,
    TokenMissing,
    TooManyParts,
    Unreadable,
}

impl fmt::Display for HeaderFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            HeaderFault::Missing => "Authorization header is expected.",
            HeaderFault::NotBearer => "Authorization header must start with \"Bearer\".",
            HeaderFault::TokenMissing => "Token not found.",
            HeaderFault::TooManyParts => "Authorization header must be bearer token.",
            HeaderFault::Unreadable => "Authorization header is not valid text.",
        };
        f.write_str(msg)
    }
}

/// Every way a protected request can be turned away before its handler runs
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    #[error("{0}")]
    AuthHeaderMalformed(HeaderFault),

    #[error("Unable to find the appropriate key.")]
    InvalidKeyId,

    #[error("Token expired.")]
    TokenExpired,

    #[error("Incorrect claims. Please, check the audience and issuer.")]
    InvalidClaims,

    #[error("Unable to parse authentication token.")]
    InvalidToken,

    #[error("Permissions not included in JWT.")]
    PermissionsClaimMissing,

    #[error("Permission not found.")]
    PermissionDenied,
}

impl AuthError {
    /// All authorization failures share one status
    pub fn status_code(&self) -> u16 {
        401
    }

    /// Machine-readable code for clients
    pub fn code(&self) -> &'static str {
        match self {
            AuthError::AuthHeaderMalformed(HeaderFault::Missing) => "authorization_header_missing",
            AuthError::AuthHeaderMalformed(_) => "invalid_header",
            AuthError::InvalidKeyId => "invalid_header",
            AuthError::TokenExpired => "token_expired",
            AuthError::InvalidClaims => "invalid_claims",
            AuthError::InvalidToken => "invalid_header",
            AuthError::PermissionsClaimMissing => "invalid_claims",
            AuthError::PermissionDenied => "unauthorized",
        }
    }
}

/// Request-scoped authorization result handed to guarded handlers
#[derive(Clone, Debug)]
pub struct AuthContext {
    pub claims: Claims,
    pub permissions: BTreeSet<String>,
}

impl AuthContext {
    /// Checks `required` against the claim set and keeps the decoded permissions
    pub fn authorize(claims: Claims, required: &str) -> Result<Self, AuthError> {
        let permissions = permissions_of(&claims)?;
        if !permissions.contains(required) {
            return Err(AuthError::PermissionDenied);
        }
        Ok(Self { claims, permissions })
    }

    pub fn subject(&self) -> &str {
        self.claims
            .get("sub")
            .and_then(Value::as_str)
            .unwrap_or("unknown")
    }
}
