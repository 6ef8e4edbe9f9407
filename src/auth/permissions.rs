use serde_json::Value;
use std::collections::BTreeSet;

use super::{AuthError, Claims};

const PERMISSIONS_CLAIM: &str = "permissions";

/// Reads the `permissions` claim as a set of strings.
///
/// A token without the claim, or with a claim that is not a list of strings,
/// does not satisfy this service's token contract.
pub fn permissions_of(claims: &Claims) -> Result<BTreeSet<String>, AuthError> {
    let list = claims
        .get(PERMISSIONS_CLAIM)
        .and_then(Value::as_array)
        .ok_or(AuthError::PermissionsClaimMissing)?;

    list.iter()
        .map(|p| p.as_str().map(str::to_string))
        .collect::<Option<BTreeSet<_>>>()
        .ok_or(AuthError::PermissionsClaimMissing)
}

/// Fails unless `required` is one of the token's permissions
pub fn check_permissions(required: &str, claims: &Claims) -> Result<(), AuthError> {
    if permissions_of(claims)?.contains(required) {
        Ok(())
    } else {
        Err(AuthError::PermissionDenied)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn claims(value: Value) -> Claims {
        value.as_object().cloned().expect("object")
    }

    #[test]
    fn test_granted_permission_passes() {
        let c = claims(json!({"permissions": ["post:drinks", "patch:drinks"]}));
        assert!(check_permissions("post:drinks", &c).is_ok());
        assert!(check_permissions("patch:drinks", &c).is_ok());
    }

    #[test]
    fn test_absent_claim_is_missing_regardless_of_required() {
        let c = claims(json!({"sub": "someone"}));
        for required in ["get:drinks-detail", "post:drinks", "delete:drinks"] {
            assert_eq!(check_permissions(required, &c), Err(AuthError::PermissionsClaimMissing));
        }
    }

    #[test]
    fn test_non_list_claim_is_missing() {
        let c = claims(json!({"permissions": "post:drinks"}));
        assert_eq!(check_permissions("post:drinks", &c), Err(AuthError::PermissionsClaimMissing));

        let c = claims(json!({"permissions": ["post:drinks", 7]}));
        assert_eq!(permissions_of(&c), Err(AuthError::PermissionsClaimMissing));
    }

    #[test]
    fn test_other_permission_is_denied() {
        let c = claims(json!({"permissions": ["get:drinks-detail"]}));
        assert_eq!(check_permissions("delete:drinks", &c), Err(AuthError::PermissionDenied));
    }

    #[test]
    fn test_empty_list_denies_everything() {
        let c = claims(json!({"permissions": []}));
        assert!(permissions_of(&c).unwrap().is_empty());
        assert_eq!(check_permissions("post:drinks", &c), Err(AuthError::PermissionDenied));
    }
}
