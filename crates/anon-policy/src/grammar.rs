//! Security label grammar.
//!
//! The accepted labels are kept in one closed table, `RULES`, keyed by
//! [`LabelTarget`]. Validation picks the rule for the object, checks the
//! privilege requirement, then the keywords and the semicolon guard.
//!
//! Keywords are matched with ASCII case folding. A prefix keyword only looks
//! at the first `keyword.len()` bytes, so `TABLESAMPLE SYSTEM(10)` is accepted
//! as is: the clause body is not validated here.

use anon_core::{ObjectKind, ObjectRef, Principal};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::LabelError;

/// How column labels are checked.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GrammarMode {
    /// Column labels may contain `;`.
    #[default]
    Compatible,
    /// Column labels are rejected when they contain `;`, like table labels.
    Strict,
}

/// The grammar rule set a label is checked against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LabelTarget {
    Database,
    Table,
    Column,
    Role,
    Schema,
}

impl LabelTarget {
    /// Rule set for an object, or `None` when the kind cannot be labelled.
    ///
    /// A `Column` without a column number has no rule set.
    pub fn of(object: &ObjectRef) -> Option<Self> {
        match object.kind {
            ObjectKind::Database => Some(LabelTarget::Database),
            ObjectKind::Table if object.has_sub_object() => Some(LabelTarget::Column),
            ObjectKind::Table => Some(LabelTarget::Table),
            ObjectKind::Column if object.has_sub_object() => Some(LabelTarget::Column),
            ObjectKind::Column => None,
            ObjectKind::Role => Some(LabelTarget::Role),
            ObjectKind::Schema => Some(LabelTarget::Schema),
            ObjectKind::Other => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            LabelTarget::Database => "database",
            LabelTarget::Table => "table",
            LabelTarget::Column => "column",
            LabelTarget::Role => "role",
            LabelTarget::Schema => "schema",
        }
    }
}

impl fmt::Display for LabelTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy)]
enum Keyword {
    Prefix(&'static str),
    Exact(&'static str),
}

impl Keyword {
    fn matches(&self, label: &str) -> bool {
        match self {
            Keyword::Prefix(keyword) => {
                label.len() >= keyword.len()
                    && label.as_bytes()[..keyword.len()].eq_ignore_ascii_case(keyword.as_bytes())
            }
            Keyword::Exact(keyword) => label.eq_ignore_ascii_case(keyword),
        }
    }
}

#[derive(Debug)]
struct LabelRule {
    target: LabelTarget,
    keywords: &'static [Keyword],
    rejects_semicolon: bool,
    superuser_only: bool,
}

const TABLESAMPLE: &[Keyword] = &[Keyword::Prefix("TABLESAMPLE")];

const COLUMN_KEYWORDS: &[Keyword] = &[
    Keyword::Prefix("MASKED WITH FUNCTION"),
    Keyword::Prefix("MASKED WITH VALUE"),
    Keyword::Prefix("QUASI IDENTIFIER"),
    Keyword::Prefix("INDIRECT IDENTIFIER"),
];

/// Every accepted label shape, one row per target, in [`LabelTarget`] order.
const RULES: [LabelRule; 5] = [
    // SECURITY LABEL FOR anon ON DATABASE d IS 'TABLESAMPLE SYSTEM(10)'
    LabelRule {
        target: LabelTarget::Database,
        keywords: TABLESAMPLE,
        rejects_semicolon: true,
        superuser_only: false,
    },
    // SECURITY LABEL FOR anon ON TABLE t IS 'TABLESAMPLE BERNOULLI(5)'
    LabelRule {
        target: LabelTarget::Table,
        keywords: TABLESAMPLE,
        rejects_semicolon: true,
        superuser_only: false,
    },
    // SECURITY LABEL FOR anon ON COLUMN t.c IS 'MASKED WITH VALUE $$x$$'
    LabelRule {
        target: LabelTarget::Column,
        keywords: COLUMN_KEYWORDS,
        rejects_semicolon: false,
        superuser_only: false,
    },
    // SECURITY LABEL FOR anon ON ROLE r IS 'MASKED'
    LabelRule {
        target: LabelTarget::Role,
        keywords: &[Keyword::Exact("MASKED")],
        rejects_semicolon: false,
        superuser_only: false,
    },
    // SECURITY LABEL FOR anon ON SCHEMA s IS 'TRUSTED'
    LabelRule {
        target: LabelTarget::Schema,
        keywords: &[Keyword::Exact("TRUSTED")],
        rejects_semicolon: false,
        superuser_only: true,
    },
];

fn rule_for(target: LabelTarget) -> &'static LabelRule {
    &RULES[target as usize]
}

/// A label check installed for a policy.
pub trait LabelValidator: Send + Sync {
    /// Accept or reject `label` for `object`. `None` removes a label.
    fn validate(
        &self,
        object: &ObjectRef,
        label: Option<&str>,
        principal: &Principal,
    ) -> Result<(), LabelError>;
}

/// The anon label grammar. Stateless apart from its mode.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LabelGrammar {
    mode: GrammarMode,
}

impl LabelGrammar {
    pub fn new(mode: GrammarMode) -> Self {
        Self { mode }
    }

    pub fn strict() -> Self {
        Self::new(GrammarMode::Strict)
    }

    pub fn mode(&self) -> GrammarMode {
        self.mode
    }

    /// Validate a label for an object on behalf of `principal`.
    pub fn validate(
        &self,
        object: &ObjectRef,
        label: Option<&str>,
        principal: &Principal,
    ) -> Result<(), LabelError> {
        // SECURITY LABEL FOR anon ON ... IS NULL
        let Some(label) = label else {
            return Ok(());
        };

        let Some(target) = LabelTarget::of(object) else {
            if object.kind == ObjectKind::Column {
                return Err(LabelError::MissingColumnNumber {
                    object_id: object.object_id,
                });
            }
            return Err(LabelError::UnsupportedObjectKind { kind: object.kind });
        };
        let rule = rule_for(target);

        if rule.superuser_only && !principal.superuser {
            return Err(LabelError::InsufficientPrivilege);
        }

        // the label ends up inside generated SQL
        let rejects_semicolon = rule.rejects_semicolon
            || (self.mode == GrammarMode::Strict && rule.target == LabelTarget::Column);
        let has_semicolon = label.contains(';');

        let accepted = rule.keywords.iter().any(|keyword| keyword.matches(label))
            && !(rejects_semicolon && has_semicolon);

        if !accepted {
            tracing::debug!(%object, target = %rule.target, label, "security label rejected");
            return Err(LabelError::InvalidLabelSyntax {
                target: rule.target,
                label: label.to_string(),
            });
        }

        tracing::debug!(%object, target = %rule.target, "security label accepted");
        Ok(())
    }
}

impl LabelValidator for LabelGrammar {
    fn validate(
        &self,
        object: &ObjectRef,
        label: Option<&str>,
        principal: &Principal,
    ) -> Result<(), LabelError> {
        LabelGrammar::validate(self, object, label, principal)
    }
}
