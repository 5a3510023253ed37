//! Masking policy names and ordered policy lists.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Rejected policy name.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("masking policy name cannot be empty")]
pub struct PolicyNameError;

/// Name of a masking policy (the label provider name).
///
/// The name is kept verbatim: surrounding whitespace is part of the name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PolicyName(String);

impl PolicyName {
    pub fn new(name: impl Into<String>) -> Result<Self, PolicyNameError> {
        let name = name.into();
        if name.is_empty() {
            return Err(PolicyNameError);
        }
        Ok(Self(name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for PolicyName {
    type Error = PolicyNameError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<PolicyName> for String {
    fn from(value: PolicyName) -> Self {
        value.0
    }
}

impl FromStr for PolicyName {
    type Err = PolicyNameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl AsRef<str> for PolicyName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PolicyName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Ordered list of masking policies. Earlier entries win during resolution.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyList(Vec<PolicyName>);

impl PolicyList {
    /// Split a comma-separated setting into policy names.
    ///
    /// No quoting, escaping or trimming is applied. Empty segments cannot
    /// name a policy and are dropped; `skipped` reports how many were.
    pub fn parse(raw: &str) -> ParsedPolicyList {
        let mut names = Vec::new();
        let mut skipped = 0;
        for segment in raw.split(',') {
            match PolicyName::new(segment) {
                Ok(name) => names.push(name),
                Err(PolicyNameError) => skipped += 1,
            }
        }
        ParsedPolicyList {
            policies: PolicyList(names),
            skipped,
        }
    }

    pub fn iter(&self) -> std::slice::Iter<'_, PolicyName> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.iter().any(|p| p.as_str() == name)
    }
}

impl FromIterator<PolicyName> for PolicyList {
    fn from_iter<T: IntoIterator<Item = PolicyName>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a PolicyList {
    type Item = &'a PolicyName;
    type IntoIter = std::slice::Iter<'a, PolicyName>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Result of [`PolicyList::parse`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedPolicyList {
    pub policies: PolicyList,
    pub skipped: usize,
}
