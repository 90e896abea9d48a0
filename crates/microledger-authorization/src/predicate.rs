//! Grant predicate and the condition language
//!
//! A rule's `when` is a JSON object whose entries must all hold:
//!
//! - `"any": [cond, ...]`: at least one sub-condition holds
//! - `"all": [cond, ...]`: every sub-condition holds
//! - `"not": cond`: the sub-condition does not hold
//! - `"<attribute>": expected`: the profile attribute matches `expected`
//!
//! An attribute matches when it equals `expected`, when it is an array
//! containing `expected`, or, if `expected` is itself an array, when any
//! listed value matches. An empty or non-object condition matches nothing.

use crate::profile::{Profile, Rule};
use serde_json::Value;

/// Decides whether a profile satisfies a rule's condition
pub trait GrantPredicate: Send + Sync {
    /// Whether `profile` satisfies `rule.when`
    fn satisfies(&self, profile: &Profile, rule: &Rule) -> bool;
}

/// Default predicate implementing the condition language above
#[derive(Debug, Clone, Copy, Default)]
pub struct ConditionPredicate;

impl GrantPredicate for ConditionPredicate {
    fn satisfies(&self, profile: &Profile, rule: &Rule) -> bool {
        evaluate(profile, &rule.when)
    }
}

fn evaluate(profile: &Profile, condition: &Value) -> bool {
    let Value::Object(entries) = condition else {
        return false;
    };
    if entries.is_empty() {
        return false;
    }

    entries.iter().all(|(name, expected)| match name.as_str() {
        "any" => sub_conditions(expected).any(|c| evaluate(profile, c)),
        "all" => {
            let mut conditions = sub_conditions(expected).peekable();
            conditions.peek().is_some() && conditions.all(|c| evaluate(profile, c))
        }
        "not" => !evaluate(profile, expected),
        attribute => profile
            .attribute(attribute)
            .is_some_and(|actual| matches(&actual, expected)),
    })
}

fn sub_conditions(value: &Value) -> impl Iterator<Item = &Value> {
    value.as_array().into_iter().flatten()
}

fn matches(actual: &Value, expected: &Value) -> bool {
    match expected {
        Value::Array(options) => options.iter().any(|option| matches_one(actual, option)),
        single => matches_one(actual, single),
    }
}

fn matches_one(actual: &Value, expected: &Value) -> bool {
    match actual {
        Value::Array(values) => values.contains(expected),
        scalar => scalar == expected,
    }
}
