//! `anon function-schema` command implementation.

use anyhow::{Result, bail};

pub fn run(call: Option<&str>) -> Result<()> {
    match anon_runtime::functions::get_function_schema(call) {
        Ok(Some(schema)) if schema.is_empty() => println!("(unqualified)"),
        Ok(Some(schema)) => println!("{}", schema),
        Ok(None) => println!("(null)"),
        Err(e) => bail!("{} (SQLSTATE {})", e, e.sqlstate()),
    }
    Ok(())
}
