//! `anon config show` and `anon policies` command implementations.

use anon_core::ConfigKey;
use anyhow::{Context, Result};
use std::path::Path;

use super::{load_config, principal};

/// `name = value` lines for the requested settings.
///
/// Privileged settings are hidden from non-superusers when listing every
/// setting, and rejected when asked for by name.
pub fn show_lines(config: Option<&Path>, key: Option<&str>, superuser: bool) -> Result<Vec<String>> {
    let config = load_config(config)?;
    let principal = principal(superuser);

    let Some(key) = key else {
        return Ok(ConfigKey::ALL
            .iter()
            .map(|key| match config.show(*key, &principal) {
                Ok(value) => format!("{} = {}", key, value),
                Err(_) => format!("{} = (superuser only)", key),
            })
            .collect());
    };

    let key: ConfigKey = key.parse().context("Unknown setting")?;
    let value = config.show(key, &principal)?;
    Ok(vec![format!("{} = {}", key, value)])
}

pub fn show(config: Option<&Path>, key: Option<&str>, superuser: bool) -> Result<()> {
    for line in show_lines(config, key, superuser)? {
        println!("{}", line);
    }
    Ok(())
}

pub fn policies(config: Option<&Path>) -> Result<()> {
    let config = load_config(config)?;
    let parsed = config.parsed_policies();
    if parsed.skipped > 0 {
        tracing::warn!(skipped = parsed.skipped, "Empty masking policy names are ignored");
    }
    for policy in anon_policy::list_masking_policies(&config) {
        println!("{}", policy);
    }
    Ok(())
}
