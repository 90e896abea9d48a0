//! Path protections and grant sets

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Binds a document path prefix to a required grant
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathProtection {
    /// Path prefix (JSON pointer)
    pub path: String,
    /// Grant required to touch any path under `path`
    pub grant: String,
}

impl PathProtection {
    /// Create a protection
    pub fn new(path: impl Into<String>, grant: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            grant: grant.into(),
        }
    }

    /// Whether `path` falls under this protection (plain prefix match)
    pub fn covers(&self, path: &str) -> bool {
        path.starts_with(&self.path)
    }
}

/// Capability tokens held by a signer
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GrantSet(BTreeSet<String>);

impl GrantSet {
    /// Whether `grant` is held
    pub fn contains(&self, grant: &str) -> bool {
        self.0.contains(grant)
    }

    /// Whether no grant is held
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Held grants in sorted order
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}

impl FromIterator<String> for GrantSet {
    fn from_iter<I: IntoIterator<Item = String>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// A protected path touched without the required grant
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    /// Patch path that was touched
    pub path: String,
    /// Grant the protection requires
    pub grant: String,
}

/// First patch path that a protection covers but `grants` does not allow
///
/// `None` means every touched protected path is allowed, which includes the
/// case where no protected path is touched at all.
pub fn first_violation<'a>(
    protections: &[PathProtection],
    paths: impl IntoIterator<Item = &'a str>,
    grants: &GrantSet,
) -> Option<Violation> {
    paths.into_iter().find_map(|path| {
        protections
            .iter()
            .find(|protection| protection.covers(path) && !grants.contains(&protection.grant))
            .map(|protection| Violation {
                path: path.to_string(),
                grant: protection.grant.clone(),
            })
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grants(tokens: &[&str]) -> GrantSet {
        tokens.iter().map(|t| t.to_string()).collect()
    }

    #[test]
    fn test_unprotected_paths_pass() {
        let protections = vec![PathProtection::new("/docs", "write")];
        assert_eq!(
            first_violation(&protections, ["/notes/a", "/count"], &GrantSet::default()),
            None
        );
        assert_eq!(first_violation(&protections, [] as [&str; 0], &GrantSet::default()), None);
    }

    #[test]
    fn test_protected_path_requires_grant() {
        let protections = vec![
            PathProtection::new("/docs", "write"),
            PathProtection::new("/authorization/rules", "rule_admin"),
        ];
        assert_eq!(
            first_violation(&protections, ["/docs/x"], &grants(&["write"])),
            None
        );
        assert_eq!(
            first_violation(
                &protections,
                ["/docs/x", "/authorization/rules/3"],
                &grants(&["write"])
            ),
            Some(Violation {
                path: "/authorization/rules/3".into(),
                grant: "rule_admin".into(),
            })
        );
    }

    #[test]
    fn test_prefix_match_is_textual() {
        let protection = PathProtection::new("/docs", "write");
        assert!(protection.covers("/docs"));
        assert!(protection.covers("/docs/x"));
        assert!(protection.covers("/docsets"));
        assert!(!protection.covers("/doc"));
    }
}
