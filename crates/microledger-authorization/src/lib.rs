//! Path-based grant authorization
//!
//! A ledger document may embed an `authorization` section:
//!
//! ```json
//! {
//!   "authorization": {
//!     "profiles": [{ "key": "#AbCdEfG", "roles": ["edge"] }],
//!     "rules": [{ "grant": ["write"], "when": { "roles": "edge" } }]
//!   }
//! }
//! ```
//!
//! A signer's grants are the union of every rule whose `when` condition its
//! profile satisfies. Path protections then require a grant for any patch
//! path they cover.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

/// Authorization error types
pub mod errors;
/// Validation of gated genesis documents
pub mod genesis;
/// Grant predicate and condition language
pub mod predicate;
/// Profiles, rules and grant resolution
pub mod profile;
/// Path protections and grant sets
pub mod protection;

pub use errors::AuthorizationError;
pub use genesis::validate_genesis;
pub use predicate::{ConditionPredicate, GrantPredicate};
pub use profile::{resolve_grants, AuthorizationState, Profile, Rule};
pub use protection::{first_violation, GrantSet, PathProtection, Violation};
