//! `anon masking-policy` command implementation.

use anon_core::{Principal, RoleId};
use anon_runtime::Session;
use anyhow::Result;
use std::path::Path;

use super::labels::LabelFile;
use super::load_config;

/// The policy masking `role`, if any.
pub fn resolve(labels: &Path, config: Option<&Path>, role: u32) -> Result<Option<String>> {
    let config = load_config(config)?;
    let (extension, _store) = LabelFile::load(labels)?.extension(config);
    let session = Session::new(Principal::new(RoleId(role)));
    Ok(extension.get_masking_policy(None, &session))
}

pub fn run(labels: &Path, config: Option<&Path>, role: u32) -> Result<()> {
    match resolve(labels, config, role)? {
        Some(policy) => println!("role {} is masked by policy '{}'", role, policy),
        None => println!("role {} is not masked", role),
    }
    Ok(())
}
