//! Validation of gated genesis documents
//!
//! A gated ledger evaluates every append against the authorization section of
//! the previous node, starting with genesis, so genesis must carry a
//! well-formed section from the start.

use crate::errors::AuthorizationError;
use crate::profile::AuthorizationState;
use serde_json::Value;

const ALLOWED_SECTIONS: [&str; 2] = ["profiles", "rules"];

/// Check that `genesis` can seed a gated ledger
pub fn validate_genesis(genesis: &Value) -> Result<(), AuthorizationError> {
    if genesis.get("publicKey").is_none() {
        return Err(AuthorizationError::MissingProperty("publicKey".into()));
    }

    let Some(section) = genesis.get("authorization") else {
        return Err(AuthorizationError::MissingProperty("authorization".into()));
    };
    let Value::Object(entries) = section else {
        return Err(AuthorizationError::Malformed(
            "`authorization` must be an object".into(),
        ));
    };

    if let Some(unexpected) = entries
        .keys()
        .find(|key| !ALLOWED_SECTIONS.contains(&key.as_str()))
    {
        return Err(AuthorizationError::UnexpectedProperty(unexpected.clone()));
    }
    for required in ALLOWED_SECTIONS {
        if !entries.contains_key(required) {
            return Err(AuthorizationError::MissingProperty(format!(
                "authorization.{required}"
            )));
        }
    }

    serde_json::from_value::<AuthorizationState>(section.clone())
        .map(|_| ())
        .map_err(|e| AuthorizationError::Malformed(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use serde_json::json;

    #[test]
    fn test_valid_genesis() {
        let genesis = json!({
            "publicKey": [],
            "authorization": {"profiles": [], "rules": []}
        });
        assert_eq!(validate_genesis(&genesis), Ok(()));
    }

    #[test]
    fn test_missing_properties() {
        assert_matches!(
            validate_genesis(&json!({"authorization": {"profiles": [], "rules": []}})),
            Err(AuthorizationError::MissingProperty(p)) if p == "publicKey"
        );
        assert_matches!(
            validate_genesis(&json!({"publicKey": []})),
            Err(AuthorizationError::MissingProperty(p)) if p == "authorization"
        );
        assert_matches!(
            validate_genesis(&json!({"publicKey": [], "authorization": {"profiles": []}})),
            Err(AuthorizationError::MissingProperty(p)) if p == "authorization.rules"
        );
    }

    #[test]
    fn test_unexpected_and_malformed_sections() {
        assert_matches!(
            validate_genesis(&json!({
                "publicKey": [],
                "authorization": {"profiles": [], "rules": [], "admins": []}
            })),
            Err(AuthorizationError::UnexpectedProperty(p)) if p == "admins"
        );
        assert_matches!(
            validate_genesis(&json!({"publicKey": [], "authorization": []})),
            Err(AuthorizationError::Malformed(_))
        );
        assert_matches!(
            validate_genesis(&json!({
                "publicKey": [],
                "authorization": {"profiles": [{"roles": []}], "rules": []}
            })),
            Err(AuthorizationError::Malformed(_))
        );
    }
}
