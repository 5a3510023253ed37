//! `anon init` command implementation.
//!
//! Trusts the `anon` schema under every configured policy, then writes the
//! label file back.

use anyhow::{Result, anyhow};
use std::path::Path;

use super::labels::LabelFile;
use super::{load_config, principal};

pub fn run(labels: &Path, config: Option<&Path>, superuser: bool) -> Result<()> {
    let config = load_config(config)?;
    let file = LabelFile::load_or_default(labels)?;
    let (extension, store) = file.extension(config);

    extension
        .init_masking_policies(&principal(superuser))
        .map_err(|e| anyhow!("{} (SQLSTATE {})", e, e.sqlstate()))?;

    let updated = LabelFile {
        schemas: file.schemas,
        labels: store.entries(),
    };
    updated.save(labels)?;

    for policy in extension.list_masking_policies() {
        println!("✔ SECURITY LABEL FOR {} ON SCHEMA anon IS 'TRUSTED'", policy);
    }
    Ok(())
}
