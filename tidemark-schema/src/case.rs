//! Identifier case handling.
//!
//! Two separate concerns live here:
//! - [`CaseRule`] decides whether two names refer to the same column.
//! - [`CaseConversion`] rewrites names, for sinks that fold identifier case.

use std::borrow::Cow;

use serde::{Deserialize, Serialize};
use smol_str::SmolStr;

/// How field names are compared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CaseRule {
    /// `Id` and `id` are different columns.
    #[default]
    Sensitive,
    /// `Id` and `id` are the same column.
    Insensitive,
}

impl CaseRule {
    /// Build the rule from an `ignore_case` flag.
    pub fn from_ignore_case(ignore_case: bool) -> Self {
        if ignore_case {
            CaseRule::Insensitive
        } else {
            CaseRule::Sensitive
        }
    }

    /// Whether case is ignored.
    pub fn ignores_case(&self) -> bool {
        matches!(self, CaseRule::Insensitive)
    }

    /// Normalize a name into its comparison key.
    pub fn key<'a>(&self, name: &'a str) -> Cow<'a, str> {
        match self {
            CaseRule::Sensitive => Cow::Borrowed(name),
            CaseRule::Insensitive => Cow::Owned(name.to_lowercase()),
        }
    }

    /// Normalize a name into an owned comparison key.
    pub fn owned_key(&self, name: &str) -> SmolStr {
        SmolStr::new(self.key(name))
    }

    /// Compare two names under this rule.
    pub fn same_name(&self, a: &str, b: &str) -> bool {
        match self {
            CaseRule::Sensitive => a == b,
            CaseRule::Insensitive => a.to_lowercase() == b.to_lowercase(),
        }
    }
}

/// A rewrite applied to every identifier of a dataset or ingest mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CaseConversion {
    /// Leave names untouched.
    #[default]
    None,
    /// Upper-case every name.
    ToUpper,
    /// Lower-case every name.
    ToLower,
}

impl CaseConversion {
    /// Apply the conversion to a name.
    pub fn apply(&self, name: &str) -> SmolStr {
        match self {
            CaseConversion::None => SmolStr::new(name),
            CaseConversion::ToUpper => SmolStr::new(name.to_uppercase()),
            CaseConversion::ToLower => SmolStr::new(name.to_lowercase()),
        }
    }

    /// Apply the conversion to an optional name.
    pub fn apply_opt(&self, name: Option<&SmolStr>) -> Option<SmolStr> {
        name.map(|n| self.apply(n))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sensitive_rule_keeps_names_distinct() {
        let rule = CaseRule::Sensitive;
        assert!(!rule.same_name("Id", "id"));
        assert_eq!(rule.key("Id"), "Id");
    }

    #[test]
    fn test_insensitive_rule_folds_case() {
        let rule = CaseRule::from_ignore_case(true);
        assert!(rule.ignores_case());
        assert!(rule.same_name("Id", "id"));
        assert_eq!(rule.owned_key("CamelCase"), "camelcase");
    }

    #[test]
    fn test_case_conversion() {
        assert_eq!(CaseConversion::ToUpper.apply("batch_id"), "BATCH_ID");
        assert_eq!(CaseConversion::ToLower.apply("BATCH_ID"), "batch_id");
        assert_eq!(CaseConversion::None.apply("Batch_Id"), "Batch_Id");
        assert_eq!(CaseConversion::ToUpper.apply_opt(None), None);
    }
}
