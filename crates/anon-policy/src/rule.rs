//! Reading stored labels back.
//!
//! The grammar only checks label prefixes at write time. These helpers parse a
//! stored label into its meaning, tolerating extra whitespace and line breaks.

use regex::Regex;
use std::sync::LazyLock;

static MASKED_WITH_FUNCTION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)^\s*MASKED\s+WITH\s+FUNCTION\s+(.*\S)\s*$")
        .expect("masked-with-function pattern is valid")
});

static MASKED_WITH_VALUE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)^\s*MASKED\s+WITH\s+VALUE\s+(.*\S)\s*$")
        .expect("masked-with-value pattern is valid")
});

static INDIRECT_IDENTIFIER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)^\s*(QUASI|INDIRECT)\s+IDENTIFIER\s*$")
        .expect("indirect-identifier pattern is valid")
});

static TABLESAMPLE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)^\s*TABLESAMPLE\s+(.*\S)\s*$").expect("tablesample pattern is valid")
});

static TRUSTED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)^\s*TRUSTED\s*$").expect("trusted pattern is valid"));

/// Meaning of a column label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColumnRule {
    /// `MASKED WITH FUNCTION <call>`
    MaskedWithFunction(String),
    /// `MASKED WITH VALUE <expr>`
    MaskedWithValue(String),
    /// `QUASI IDENTIFIER` or `INDIRECT IDENTIFIER`
    IndirectIdentifier,
}

impl ColumnRule {
    /// Parse a column label. `None` when the label has no recognised shape.
    pub fn parse(label: &str) -> Option<Self> {
        if let Some(call) = capture_first(&MASKED_WITH_FUNCTION, label) {
            return Some(ColumnRule::MaskedWithFunction(call));
        }
        if let Some(value) = capture_first(&MASKED_WITH_VALUE, label) {
            return Some(ColumnRule::MaskedWithValue(value));
        }
        if INDIRECT_IDENTIFIER.is_match(label) {
            return Some(ColumnRule::IndirectIdentifier);
        }
        None
    }

    /// The masking function call, for `MASKED WITH FUNCTION` rules.
    pub fn function_call(&self) -> Option<&str> {
        match self {
            ColumnRule::MaskedWithFunction(call) => Some(call),
            _ => None,
        }
    }
}

/// The sampling clause of a `TABLESAMPLE` label, e.g. `SYSTEM(10)`.
pub fn tablesample_clause(label: &str) -> Option<String> {
    capture_first(&TABLESAMPLE, label)
}

/// True for a `TRUSTED` schema label.
pub fn is_trusted(label: &str) -> bool {
    TRUSTED.is_match(label)
}

fn capture_first(re: &Regex, haystack: &str) -> Option<String> {
    re.captures(haystack)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn masked_with_function() {
        assert_eq!(
            ColumnRule::parse("MASKED WITH FUNCTION public.foo()"),
            Some(ColumnRule::MaskedWithFunction("public.foo()".to_string()))
        );
        assert_eq!(
            ColumnRule::parse(" masked  WITH funCTION bar(0,\n  $$y$$) ")
                .as_ref()
                .and_then(ColumnRule::function_call),
            Some("bar(0,\n  $$y$$)")
        );
        assert_eq!(ColumnRule::parse("MASKED WITH FUNCTION"), None);
        assert_eq!(ColumnRule::parse("MASKED WITH public.foo()"), None);
    }

    #[test]
    fn masked_with_value() {
        assert_eq!(
            ColumnRule::parse(" masked  WITH vaLue  NULL "),
            Some(ColumnRule::MaskedWithValue("NULL".to_string()))
        );
        assert_eq!(ColumnRule::parse("MASKED WITH VALUE"), None);
        assert_eq!(ColumnRule::parse("MASKED WITH 0"), None);
    }

    #[test]
    fn identifiers() {
        assert_eq!(
            ColumnRule::parse(" QuAsI    idenTIFIER  "),
            Some(ColumnRule::IndirectIdentifier)
        );
        assert_eq!(
            ColumnRule::parse("INDIRECT IDENTIFIER"),
            Some(ColumnRule::IndirectIdentifier)
        );
        assert_eq!(ColumnRule::parse("quasi-identifier"), None);
        assert_eq!(ColumnRule::parse("IDENTIFIER"), None);
    }

    #[test]
    fn not_masked_is_not_a_column_rule() {
        assert_eq!(ColumnRule::parse("NOT MASKED"), None);
    }

    #[test]
    fn tablesample_and_trusted() {
        assert_eq!(
            tablesample_clause(" tablesample  sySTEM(10)").as_deref(),
            Some("sySTEM(10)")
        );
        assert_eq!(tablesample_clause("TABLESAMPLE"), None);
        assert!(is_trusted("     trusted "));
        assert!(!is_trusted("TRUSTTED"));
    }
}
