use axum::http::{header::AUTHORIZATION, HeaderMap};
use jsonwebtoken::{
    decode, decode_header,
    errors::{Error as JwtError, ErrorKind},
    jwk::JwkSet,
    Algorithm, DecodingKey, Validation,
};
use tracing::{debug, info, warn};

use super::{AuthError, Claims, HeaderFault};
use crate::config::{ConfigError, SecurityConfig};

/// Only asymmetric signatures from the identity provider are accepted
const SIGNING_ALGORITHM: Algorithm = Algorithm::RS256;

/// Pulls the raw token out of `Authorization: Bearer <token>`
pub fn extract_bearer_token(headers: &HeaderMap) -> Result<&str, AuthError> {
    let value = headers
        .get(AUTHORIZATION)
        .ok_or(AuthError::AuthHeaderMalformed(HeaderFault::Missing))?
        .to_str()
        .map_err(|_| AuthError::AuthHeaderMalformed(HeaderFault::Unreadable))?;

    let parts: Vec<&str> = value.split_whitespace().collect();
    match parts.as_slice() {
        [] => Err(AuthError::AuthHeaderMalformed(HeaderFault::Missing)),
        [scheme, ..] if !scheme.eq_ignore_ascii_case("bearer") => {
            Err(AuthError::AuthHeaderMalformed(HeaderFault::NotBearer))
        }
        [_] => Err(AuthError::AuthHeaderMalformed(HeaderFault::TokenMissing)),
        [_, token] => Ok(*token),
        _ => Err(AuthError::AuthHeaderMalformed(HeaderFault::TooManyParts)),
    }
}

/// Verifies bearer tokens against a fixed signing-key set
pub struct TokenValidator {
    keys: JwkSet,
    validation: Validation,
}

impl TokenValidator {
    pub fn new(keys: JwkSet, issuer: impl Into<String>, audience: impl Into<String>) -> Self {
        let issuer = issuer.into();
        let audience = audience.into();

        let mut validation = Validation::new(SIGNING_ALGORITHM);
        validation.set_issuer(&[issuer.as_str()]);
        validation.set_audience(&[audience.as_str()]);
        validation.set_required_spec_claims(&["exp", "iss", "aud"]);
        // An elapsed `exp` is rejected immediately unless skew is configured
        validation.leeway = 0;

        Self { keys, validation }
    }

    /// Tolerates `secs` of clock skew on `exp`
    pub fn with_leeway(mut self, secs: u64) -> Self {
        self.validation.leeway = secs;
        self
    }

    pub fn from_config(security: &SecurityConfig, keys: JwkSet) -> Result<Self, ConfigError> {
        Ok(Self::new(keys, security.issuer()?, security.api_audience.clone())
            .with_leeway(security.leeway_secs))
    }

    /// Decodes and verifies `token`, returning its claim set
    pub fn validate(&self, token: &str) -> Result<Claims, AuthError> {
        let header = decode_header(token).map_err(|e| {
            debug!("Unreadable token header: {}", e);
            AuthError::InvalidToken
        })?;

        let kid = header.kid.as_deref().ok_or(AuthError::InvalidKeyId)?;
        let jwk = self.keys.find(kid).ok_or(AuthError::InvalidKeyId)?;
        let key = DecodingKey::from_jwk(jwk).map_err(|e| {
            warn!("Signing key '{}' is unusable: {}", kid, e);
            AuthError::InvalidKeyId
        })?;

        decode::<Claims>(token, &key, &self.validation)
            .map(|data| data.claims)
            .map_err(classify)
    }
}

fn classify(err: JwtError) -> AuthError {
    match err.kind() {
        ErrorKind::ExpiredSignature => AuthError::TokenExpired,
        ErrorKind::InvalidAudience | ErrorKind::InvalidIssuer => AuthError::InvalidClaims,
        ErrorKind::MissingRequiredClaim(claim) if claim == "aud" || claim == "iss" => {
            AuthError::InvalidClaims
        }
        _ => {
            debug!("Token rejected: {}", err);
            AuthError::InvalidToken
        }
    }
}

/// Resolves the signing-key set once at startup.
///
/// Inline JSON wins over a file path; with neither configured the set is
/// downloaded from the identity provider's well-known endpoint.
pub async fn load_key_set(security: &SecurityConfig) -> Result<JwkSet, ConfigError> {
    if let Some(raw) = &security.jwks_json {
        return parse_key_set(raw);
    }

    if let Some(path) = &security.jwks_path {
        let raw = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| ConfigError::InvalidKeySet(format!("{}: {}", path.display(), e)))?;
        return parse_key_set(&raw);
    }

    let url = security.jwks_url()?;
    info!("Fetching signing keys from {}", url);
    let keys = reqwest::get(&url)
        .await
        .and_then(|res| res.error_for_status())
        .map_err(|e| ConfigError::InvalidKeySet(format!("{}: {}", url, e)))?
        .json::<JwkSet>()
        .await
        .map_err(|e| ConfigError::InvalidKeySet(format!("{}: {}", url, e)))?;
    non_empty(keys)
}

fn parse_key_set(raw: &str) -> Result<JwkSet, ConfigError> {
    let keys = serde_json::from_str::<JwkSet>(raw)
        .map_err(|e| ConfigError::InvalidKeySet(e.to_string()))?;
    non_empty(keys)
}

fn non_empty(keys: JwkSet) -> Result<JwkSet, ConfigError> {
    if keys.keys.is_empty() {
        return Err(ConfigError::InvalidKeySet("key set contains no keys".to_string()));
    }
    Ok(keys)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;
    use chrono::Utc;
    use jsonwebtoken::{encode, EncodingKey, Header};
    use serde_json::{json, Value};

    const JWKS: &str = include_str!("../../tests/fixtures/jwks.json");
    const SIGNING_KEY: &[u8] = include_bytes!("../../tests/fixtures/test_private_key.pem");
    const ROGUE_KEY: &[u8] = include_bytes!("../../tests/fixtures/rogue_private_key.pem");
    const KID: &str = "drinks-test-key";
    const ISSUER: &str = "https://coffee.test/";
    const AUDIENCE: &str = "drinks";

    fn validator() -> TokenValidator {
        TokenValidator::new(parse_key_set(JWKS).unwrap(), ISSUER, AUDIENCE)
    }

    fn sign(claims: Value, kid: Option<&str>, pem: &[u8]) -> String {
        let mut header = Header::new(Algorithm::RS256);
        header.kid = kid.map(str::to_string);
        encode(&header, &claims, &EncodingKey::from_rsa_pem(pem).unwrap()).unwrap()
    }

    fn claims_with(overrides: Value) -> Value {
        let mut claims = json!({
            "iss": ISSUER,
            "aud": AUDIENCE,
            "sub": "auth0|manager",
            "exp": Utc::now().timestamp() + 3600,
            "permissions": ["post:drinks"],
        });
        if let (Some(base), Some(extra)) = (claims.as_object_mut(), overrides.as_object()) {
            for (k, v) in extra {
                base.insert(k.clone(), v.clone());
            }
        }
        claims
    }

    fn headers(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn test_extract_bearer_token() {
        assert_eq!(extract_bearer_token(&headers("Bearer abc.def.ghi")), Ok("abc.def.ghi"));
        assert_eq!(extract_bearer_token(&headers("bearer abc")), Ok("abc"));
    }

    #[test]
    fn test_extract_rejects_bad_shapes() {
        let fault = |h: &HeaderMap| match extract_bearer_token(h) {
            Err(AuthError::AuthHeaderMalformed(f)) => f,
            other => panic!("unexpected {:?}", other),
        };
        assert_eq!(fault(&HeaderMap::new()), HeaderFault::Missing);
        assert_eq!(fault(&headers("Basic dXNlcjpwYXNz")), HeaderFault::NotBearer);
        assert_eq!(fault(&headers("Bearer")), HeaderFault::TokenMissing);
        assert_eq!(fault(&headers("Bearer a b")), HeaderFault::TooManyParts);
    }

    #[test]
    fn test_valid_token_yields_claims() {
        let token = sign(claims_with(json!({})), Some(KID), SIGNING_KEY);
        let claims = validator().validate(&token).unwrap();
        assert_eq!(claims.get("sub"), Some(&json!("auth0|manager")));
        assert_eq!(claims.get("permissions"), Some(&json!(["post:drinks"])));
    }

    #[test]
    fn test_unknown_or_absent_kid() {
        let token = sign(claims_with(json!({})), Some("rotated-away"), SIGNING_KEY);
        assert_eq!(validator().validate(&token), Err(AuthError::InvalidKeyId));

        let token = sign(claims_with(json!({})), None, SIGNING_KEY);
        assert_eq!(validator().validate(&token), Err(AuthError::InvalidKeyId));
    }

    #[test]
    fn test_expired_token() {
        let token = sign(
            claims_with(json!({"exp": Utc::now().timestamp() - 3600})),
            Some(KID),
            SIGNING_KEY,
        );
        assert_eq!(validator().validate(&token), Err(AuthError::TokenExpired));
    }

    #[test]
    fn test_just_expired_token() {
        let token = sign(
            claims_with(json!({"exp": Utc::now().timestamp() - 5})),
            Some(KID),
            SIGNING_KEY,
        );
        assert_eq!(validator().validate(&token), Err(AuthError::TokenExpired));
    }

    #[test]
    fn test_configured_leeway_allows_skew() {
        let token = sign(
            claims_with(json!({"exp": Utc::now().timestamp() - 5})),
            Some(KID),
            SIGNING_KEY,
        );
        let lenient = validator().with_leeway(60);
        assert!(lenient.validate(&token).is_ok());
    }

    #[test]
    fn test_wrong_audience_or_issuer() {
        let token = sign(claims_with(json!({"aud": "someone-else"})), Some(KID), SIGNING_KEY);
        assert_eq!(validator().validate(&token), Err(AuthError::InvalidClaims));

        let token = sign(claims_with(json!({"iss": "https://evil.test/"})), Some(KID), SIGNING_KEY);
        assert_eq!(validator().validate(&token), Err(AuthError::InvalidClaims));
    }

    #[test]
    fn test_forged_signature_and_garbage() {
        let token = sign(claims_with(json!({})), Some(KID), ROGUE_KEY);
        assert_eq!(validator().validate(&token), Err(AuthError::InvalidToken));

        assert_eq!(validator().validate("not-a-jwt"), Err(AuthError::InvalidToken));
    }

    #[test]
    fn test_empty_key_set_rejected() {
        assert!(matches!(
            parse_key_set(r#"{"keys": []}"#),
            Err(ConfigError::InvalidKeySet(_))
        ));
    }
}
