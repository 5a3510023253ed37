//! `anon check-label` command implementation.

use anon_core::{ObjectRef, Principal};
use anon_policy::{ColumnRule, GrammarMode, LabelError, LabelGrammar, LabelTarget, rule};
use anyhow::{Result, bail};

use super::principal;

/// Validate `label` for `object` without storing it.
pub fn check(
    object: &ObjectRef,
    label: Option<&str>,
    principal: &Principal,
    mode: GrammarMode,
) -> Result<(), LabelError> {
    LabelGrammar::new(mode).validate(object, label, principal)
}

/// How the label reads once stored, for display.
pub fn describe(object: &ObjectRef, label: &str) -> Option<String> {
    match LabelTarget::of(object)? {
        LabelTarget::Column => ColumnRule::parse(label).map(|rule| format!("{rule:?}")),
        LabelTarget::Database | LabelTarget::Table => {
            rule::tablesample_clause(label).map(|clause| format!("TABLESAMPLE {clause}"))
        }
        LabelTarget::Role | LabelTarget::Schema => None,
    }
}

pub fn run(object: ObjectRef, label: Option<&str>, superuser: bool, strict: bool) -> Result<()> {
    let mode = if strict {
        GrammarMode::Strict
    } else {
        GrammarMode::Compatible
    };

    if let Err(e) = check(&object, label, &principal(superuser), mode) {
        bail!("{} (SQLSTATE {})", e, e.sqlstate());
    }

    match label {
        Some(label) => {
            println!("✔ '{}' is a valid label for {}", label, object);
            if let Some(meaning) = describe(&object, label) {
                println!("  {}", meaning);
            }
        }
        None => println!("✔ label on {} can be removed", object),
    }
    Ok(())
}
