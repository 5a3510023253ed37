//! CLI command implementations for the anon label authority.

pub mod analyze;
pub mod check_label;
pub mod config;
pub mod function_schema;
pub mod init;
pub mod label;
pub mod labels;
pub mod masking_policy;

use anon_core::{AnonConfig, ObjectKind, ObjectRef, Principal, RoleId};
use anyhow::{Context, Result};
use std::path::Path;

/// Role the CLI acts as. Only its privilege level matters to the grammar.
const CLI_ROLE: RoleId = RoleId(10);

/// Build an object reference from command line arguments.
///
/// A column number turns a table (or column) into a column of that table.
pub fn object_ref(kind: &str, object_id: u32, column: Option<i32>) -> ObjectRef {
    let kind = kind.parse::<ObjectKind>().unwrap_or(ObjectKind::Other);
    match (kind, column) {
        (ObjectKind::Table | ObjectKind::Column, Some(attnum)) => ObjectRef::column(object_id, attnum),
        (kind, _) => ObjectRef::new(kind, object_id, 0),
    }
}

/// Load settings from `path`, or the defaults when no file is given.
pub fn load_config(path: Option<&Path>) -> Result<AnonConfig> {
    match path {
        Some(path) => AnonConfig::from_file(path)
            .with_context(|| format!("Failed to load settings from {}", path.display())),
        None => Ok(AnonConfig::default()),
    }
}

pub fn principal(superuser: bool) -> Principal {
    if superuser {
        Principal::superuser(CLI_ROLE)
    } else {
        Principal::new(CLI_ROLE)
    }
}
