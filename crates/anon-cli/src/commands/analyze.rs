//! `anon analyze` command implementation.

use anon_core::{Principal, RoleId};
use anon_runtime::{AnalyzedQuery, Session};
use anyhow::{Result, anyhow};
use std::path::Path;

use super::labels::LabelFile;
use super::load_config;

/// Run the query hooks over `sql` as `role`.
pub fn analyze(
    labels: &Path,
    config: Option<&Path>,
    role: u32,
    sql: &str,
) -> Result<Vec<AnalyzedQuery>> {
    let config = load_config(config)?;
    let (extension, _store) = LabelFile::load(labels)?.extension(config);
    let session = Session::new(Principal::new(RoleId(role)));
    extension
        .analyze(&session, sql)
        .map_err(|e| anyhow!("{} (SQLSTATE {})", e, e.sqlstate()))
}

pub fn run(labels: &Path, config: Option<&Path>, role: u32, sql: &str) -> Result<()> {
    for query in analyze(labels, config, role, sql)? {
        println!("✔ {}: {}", query.command, query.sql);
    }
    Ok(())
}
