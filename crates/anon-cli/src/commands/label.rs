//! `anon label` command implementation.
//!
//! Runs `SECURITY LABEL FOR <policy> ON <object> IS <label>` against a label
//! file and writes the file back when the label is accepted.

use anon_core::{ObjectRef, PolicyName};
use anon_policy::SecurityLabelCommand;
use anyhow::{Context, Result, anyhow};
use std::path::Path;

use super::labels::LabelFile;
use super::{load_config, principal};

pub fn run(
    labels: &Path,
    config: Option<&Path>,
    policy: &str,
    object: ObjectRef,
    label: Option<&str>,
    superuser: bool,
) -> Result<()> {
    let config = load_config(config)?;
    let file = LabelFile::load_or_default(labels)?;
    let (extension, store) = file.extension(config);

    let policy = PolicyName::new(policy).context("Invalid policy name")?;
    let command = SecurityLabelCommand::new(policy, object, label);
    extension
        .security_label(&command, &principal(superuser))
        .map_err(|e| anyhow!("{} (SQLSTATE {})", e, e.sqlstate()))?;

    let updated = LabelFile {
        schemas: file.schemas,
        labels: store.entries(),
    };
    updated.save(labels)?;

    match label {
        Some(label) => println!(
            "✔ SECURITY LABEL FOR {} ON {} IS '{}'",
            command.policy, object, label
        ),
        None => println!("✔ SECURITY LABEL FOR {} ON {} IS NULL", command.policy, object),
    }
    Ok(())
}
