//! Profiles, rules and grant resolution

use crate::predicate::GrantPredicate;
use crate::protection::GrantSet;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Signer identity with assigned roles
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    /// Key id of the signer (`#` plus the truncated encoded public key)
    pub key: String,
    /// Key id of the caller, filled in during resolution
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Roles assigned to the signer
    #[serde(default)]
    pub roles: Vec<String>,
    /// Any further attributes conditions may refer to
    #[serde(flatten)]
    pub attributes: Map<String, Value>,
}

impl Profile {
    /// Create a profile for `key` with `roles`
    pub fn new(key: impl Into<String>, roles: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            key: key.into(),
            id: None,
            roles: roles.into_iter().map(Into::into).collect(),
            attributes: Map::new(),
        }
    }

    /// Attribute value by name, as seen by conditions
    pub fn attribute(&self, name: &str) -> Option<Value> {
        match name {
            "key" => Some(Value::String(self.key.clone())),
            "id" => self.id.clone().map(Value::String),
            "roles" => Some(Value::Array(
                self.roles.iter().cloned().map(Value::String).collect(),
            )),
            other => self.attributes.get(other).cloned(),
        }
    }
}

/// Condition-to-grant mapping
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rule {
    /// Capability tokens conferred when `when` holds
    pub grant: Vec<String>,
    /// Condition over a profile
    #[serde(default)]
    pub when: Value,
}

/// Authorization section embedded in a ledger document
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AuthorizationState {
    /// Known signer profiles
    #[serde(default)]
    pub profiles: Vec<Profile>,
    /// Grant rules
    #[serde(default)]
    pub rules: Vec<Rule>,
}

impl AuthorizationState {
    /// Extract the `authorization` section of a document
    ///
    /// Returns `None` when the section is absent or malformed; callers treat
    /// that as "nobody holds any grant".
    pub fn from_document(document: &Value) -> Option<Self> {
        let section = document.get("authorization")?;
        match serde_json::from_value(section.clone()) {
            Ok(state) => Some(state),
            Err(e) => {
                tracing::warn!(error = %e, "ignoring malformed authorization section");
                None
            }
        }
    }

    /// Profile registered for `key_id`
    pub fn profile(&self, key_id: &str) -> Option<&Profile> {
        self.profiles.iter().find(|profile| profile.key == key_id)
    }
}

/// Grants held by the signer identified by `key_id`
///
/// An unknown signer resolves to the empty set.
pub fn resolve_grants(
    state: &AuthorizationState,
    key_id: &str,
    predicate: &dyn GrantPredicate,
) -> GrantSet {
    let Some(profile) = state.profile(key_id) else {
        tracing::debug!(key_id, "no authorization profile for signer");
        return GrantSet::default();
    };

    let mut profile = profile.clone();
    profile.id = Some(key_id.to_string());

    state
        .rules
        .iter()
        .filter(|rule| predicate.satisfies(&profile, rule))
        .flat_map(|rule| rule.grant.iter().cloned())
        .collect()
}
